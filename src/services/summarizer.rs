// src/services/summarizer.rs

//! Best-effort content summarization.
//!
//! `Summarizer` owns the policy (length thresholds, truncation and the
//! preview fallback); the remote model sits behind `SummaryBackend`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Content, Provenance, Summary, SummaryConfig};
use crate::utils::text::{grapheme_len, truncate};

/// External text condensation capability.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// OpenAI-compatible chat-completions backend.
pub struct ChatCompletionBackend {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    user_prompt: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatCompletionBackend {
    pub fn new(client: Client, config: &SummaryConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            user_prompt: config.user_prompt.clone(),
        }
    }

    /// Build from config, reading the key from the configured environment
    /// variable. Returns `None` when no key is set.
    pub fn from_env(client: Client, config: &SummaryConfig) -> Option<Self> {
        let key = std::env::var(&config.api_key_env).ok()?;
        let key = key.trim();
        (!key.is_empty()).then(|| Self::new(client, config, key))
    }
}

#[async_trait]
impl SummaryBackend for ChatCompletionBackend {
    async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = format!("{}\n{}", self.user_prompt, text);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::summary(format!("backend returned {status}: {body}")));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::summary("response carried no summary text"))
    }
}

/// Summarization policy around an optional backend.
pub struct Summarizer {
    backend: Option<Box<dyn SummaryBackend>>,
    min_chars: usize,
    max_input_chars: usize,
    fallback_chars: usize,
}

impl Summarizer {
    pub fn new(config: &SummaryConfig, backend: Option<Box<dyn SummaryBackend>>) -> Self {
        let backend = if config.enabled { backend } else { None };
        Self {
            backend,
            min_chars: config.min_chars,
            max_input_chars: config.max_input_chars,
            fallback_chars: config.fallback_chars,
        }
    }

    /// Summarizer that always falls back to previews.
    pub fn disabled(config: &SummaryConfig) -> Self {
        Self::new(config, None)
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Summarize extracted content. Never fails.
    ///
    /// Sentinel content is passed through untouched so the notification
    /// still says why there is no body.
    pub async fn summarize(&self, content: &Content) -> Summary {
        let Some(text) = content.text() else {
            return Summary::new(content.as_str(), Provenance::Unavailable);
        };

        if grapheme_len(text) < self.min_chars {
            return Summary::new(text, Provenance::Original);
        }

        let Some(backend) = &self.backend else {
            return self.preview(text);
        };

        match backend.summarize(truncate(text, self.max_input_chars)).await {
            Ok(summary) => Summary::new(summary, Provenance::Summary),
            Err(e) => {
                log::warn!("Summarization failed, sending preview: {}", e);
                self.preview(text)
            }
        }
    }

    fn preview(&self, text: &str) -> Summary {
        Summary::new(truncate(text, self.fallback_chars), Provenance::Preview)
    }
}
