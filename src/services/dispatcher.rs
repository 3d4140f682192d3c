// src/services/dispatcher.rs

//! Notification formatting and channel routing.
//!
//! Every item goes to the board's main channel. Items whose category has
//! a configured sub-channel get a second, category-labelled copy there.
//! The two sends are independent: either may fail without affecting the
//! other.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, Category, NoticeItem, NotifyConfig};
use crate::utils::text::truncate_with_ellipsis;

/// Discord rejects embed titles longer than this.
const MAX_TITLE_CHARS: usize = 256;

/// Resolved destination for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Webhook endpoint
    Webhook(String),
    /// No secret configured; the message is only logged
    Console(String),
}

impl Channel {
    /// Resolve a channel reference.
    ///
    /// References starting with `http://` or `https://` are used as-is;
    /// anything else names an environment variable holding the URL.
    pub fn resolve(reference: &str) -> Self {
        let reference = reference.trim();
        if reference.starts_with("https://") || reference.starts_with("http://") {
            return Self::Webhook(reference.to_string());
        }
        match std::env::var(reference) {
            Ok(url) if !url.trim().is_empty() => Self::Webhook(url.trim().to_string()),
            _ => Self::Console(reference.to_string()),
        }
    }

    /// Label for logs; never includes the webhook secret.
    pub fn label(&self) -> String {
        match self {
            Self::Webhook(url) => match url::Url::parse(url) {
                Ok(u) => format!("webhook@{}", u.host_str().unwrap_or("?")),
                Err(_) => "webhook".to_string(),
            },
            Self::Console(name) => format!("console({name})"),
        }
    }
}

/// Main and category channels of one board.
#[derive(Debug, Clone)]
pub struct BoardChannels {
    pub main: Channel,
    pub categories: BTreeMap<String, Channel>,
}

impl BoardChannels {
    pub fn resolve(board: &BoardConfig) -> Self {
        let main = Channel::resolve(&board.main_channel);
        if let Channel::Console(name) = &main {
            log::warn!(
                "Board '{}': {} is not set, notifications will only be logged",
                board.key,
                name
            );
        }

        // A sub-channel without a secret is simply not configured.
        let categories = board
            .category_channels
            .iter()
            .filter_map(|(key, reference)| match Channel::resolve(reference) {
                channel @ Channel::Webhook(_) => Some((key.clone(), channel)),
                Channel::Console(_) => None,
            })
            .collect();

        Self { main, categories }
    }

    /// Sub-channel for a category, matched by tag then by label.
    pub fn for_category(&self, category: &Category) -> Option<&Channel> {
        self.categories
            .get(&category.tag)
            .or_else(|| self.categories.get(&category.label))
    }
}

/// A formatted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub url: String,
    pub description: String,
    pub footer: String,
    pub color: u32,
}

impl Message {
    /// Plain-text rendering for console channels.
    pub fn to_plain_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n({})",
            self.title, self.description, self.url, self.footer
        )
    }

    /// Discord-compatible webhook payload.
    pub fn to_webhook_payload(&self, username: Option<&str>) -> Value {
        let mut payload = json!({
            "embeds": [{
                "title": self.title,
                "url": self.url,
                "description": self.description,
                "color": self.color,
                "footer": { "text": self.footer },
            }]
        });
        if let Some(name) = username {
            payload["username"] = json!(name);
        }
        payload
    }
}

/// Outbound transport for formatted messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, channel: &Channel, message: &Message) -> Result<()>;
}

/// Sends webhook channels over HTTP and logs console channels.
pub struct WebhookSink {
    client: Client,
    username: Option<String>,
}

impl WebhookSink {
    pub fn new(client: Client, username: Option<String>) -> Self {
        Self { client, username }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, channel: &Channel, message: &Message) -> Result<()> {
        match channel {
            Channel::Webhook(url) => {
                let response = self
                    .client
                    .post(url)
                    .json(&message.to_webhook_payload(self.username.as_deref()))
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(AppError::notify(
                        channel.label(),
                        format!("status {}", response.status()),
                    ));
                }
                Ok(())
            }
            Channel::Console(_) => {
                log::info!("[{}]\n{}", channel.label(), message.to_plain_text());
                Ok(())
            }
        }
    }
}

/// Result of dispatching one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Main channel accepted the message
    pub main: bool,
    /// Sub-channel outcome, `None` when no sub-channel applied
    pub sub: Option<bool>,
}

impl DispatchReport {
    pub fn any_delivered(&self) -> bool {
        self.main || self.sub == Some(true)
    }
}

/// Formats items and routes them to channels.
pub struct NotificationDispatcher {
    sink: Box<dyn NotificationSink>,
    config: NotifyConfig,
}

impl NotificationDispatcher {
    pub fn new(sink: Box<dyn NotificationSink>, config: NotifyConfig) -> Self {
        Self { sink, config }
    }

    /// Format an item, optionally as a category copy.
    pub fn format(
        &self,
        board: &BoardConfig,
        item: &NoticeItem,
        category_copy: Option<&Category>,
    ) -> Message {
        let title = match category_copy {
            Some(category) if !item.title.starts_with(&format!("[{}]", category.label)) => {
                format!("📢 [{}] {}", category.label, item.title)
            }
            _ => format!("📢 {}", item.title),
        };

        let (body, provenance) = match (&item.summary, &item.content) {
            (Some(summary), _) => (summary.text.as_str(), summary.provenance.label()),
            (None, Some(content)) => (content.as_str(), None),
            (None, None) => ("", None),
        };

        let mut footer = format!("{} ({})", board.display_name, board.key);
        if let Some(label) = provenance {
            footer.push_str(" · ");
            footer.push_str(label);
        }
        if let Some(category) = category_copy {
            footer.push_str(&format!(" · 분류: {}", category.label));
        }

        Message {
            title: truncate_with_ellipsis(&title, MAX_TITLE_CHARS),
            url: item.url.clone(),
            description: truncate_with_ellipsis(body, self.config.max_body_chars),
            footer,
            color: self.config.embed_color,
        }
    }

    /// Send an item to the main channel and, if routed, its sub-channel.
    pub async fn dispatch(
        &self,
        board: &BoardConfig,
        channels: &BoardChannels,
        item: &NoticeItem,
    ) -> DispatchReport {
        let main_message = self.format(board, item, None);
        let main = self.send_logged(&channels.main, &main_message, item).await;

        let sub = match item
            .category
            .as_ref()
            .and_then(|c| channels.for_category(c).map(|ch| (c, ch)))
        {
            Some((category, channel)) => {
                let message = self.format(board, item, Some(category));
                Some(self.send_logged(channel, &message, item).await)
            }
            None => None,
        };

        DispatchReport { main, sub }
    }

    async fn send_logged(&self, channel: &Channel, message: &Message, item: &NoticeItem) -> bool {
        match self.sink.send(channel, message).await {
            Ok(()) => {
                log::debug!("Sent {} to {}", item.id, channel.label());
                true
            }
            Err(e) => {
                log::error!("Failed to send {} to {}: {}", item.id, channel.label(), e);
                false
            }
        }
    }
}
