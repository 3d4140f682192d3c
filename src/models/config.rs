//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, IdStrategy};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and pacing settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Detail-page extraction thresholds
    #[serde(default)]
    pub content: ContentConfig,

    /// Summarization backend settings
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Notification formatting
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Title keyword vocabulary for category routing
    #[serde(default = "defaults::categories")]
    pub categories: Vec<CategoryKeyword>,

    /// Monitored boards
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if the file cannot be read.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config not found at {:?}. Using defaults.", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.summary.fallback_chars == 0 {
            return Err(AppError::validation("summary.fallback_chars must be > 0"));
        }
        if self.summary.max_input_chars < self.summary.min_chars {
            return Err(AppError::validation(
                "summary.max_input_chars must be >= summary.min_chars",
            ));
        }
        if self.notify.max_body_chars == 0 {
            return Err(AppError::validation("notify.max_body_chars must be > 0"));
        }
        parse_selector(&self.content.block_selector)?;

        if self.boards.is_empty() {
            return Err(AppError::validation("No boards defined"));
        }

        let mut keys = HashSet::new();
        for board in &self.boards {
            if !keys.insert(board.key.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate board key '{}'",
                    board.key
                )));
            }
            Self::validate_board(board)?;
        }
        Ok(())
    }

    fn validate_board(board: &BoardConfig) -> Result<()> {
        let context = |msg: &str| AppError::validation(format!("board '{}': {}", board.key, msg));

        if board.key.trim().is_empty() {
            return Err(AppError::validation("board key is empty"));
        }
        if board.main_channel.trim().is_empty() {
            return Err(context("main_channel is empty"));
        }
        url::Url::parse(&board.list_url)
            .map_err(|e| context(&format!("list_url is invalid: {e}")))?;
        if let Some(template) = &board.detail_url_template {
            if !template.contains("{id}") {
                return Err(context("detail_url_template has no {id} placeholder"));
            }
        }
        if !strategy_is_usable(&board.id_strategy) {
            return Err(context("id_strategy has no usable rule"));
        }
        for selector in board.selector_strings() {
            parse_selector(selector)?;
        }
        Ok(())
    }

    /// Look up a board by key.
    pub fn board(&self, key: &str) -> Option<&BoardConfig> {
        self.boards.iter().find(|b| b.key == key)
    }
}

fn strategy_is_usable(strategy: &IdStrategy) -> bool {
    match strategy {
        IdStrategy::QueryParams { params } => !params.is_empty(),
        IdStrategy::DigitRun { min_digits, .. } => *min_digits > 0,
        IdStrategy::Fallback { rules } => rules.iter().any(strategy_is_usable),
    }
}

/// Parse a CSS selector, mapping the error into `AppError`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            content: ContentConfig::default(),
            summary: SummaryConfig::default(),
            notify: NotifyConfig::default(),
            categories: defaults::categories(),
            boards: defaults::boards(),
        }
    }
}

/// What to do with a board that has no stored watermark yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstRun {
    /// Record the current listing as seen without dispatching
    Initialize,
    /// Treat ordinary rows as new, up to `first_run_limit` of the newest
    #[default]
    DispatchAll,
}

/// HTTP client and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between dispatched items in milliseconds
    #[serde(default = "defaults::item_delay")]
    pub item_delay_ms: u64,

    /// Behavior for boards without a watermark
    #[serde(default)]
    pub first_run: FirstRun,

    /// Newest items sent on a board's first run; 0 sends all of them
    #[serde(default = "defaults::first_run_limit")]
    pub first_run_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            item_delay_ms: defaults::item_delay(),
            first_run: FirstRun::default(),
            first_run_limit: defaults::first_run_limit(),
        }
    }
}

/// Detail-page extraction thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Minimum non-whitespace characters for a configured selector to win
    #[serde(default = "defaults::min_selector_chars")]
    pub min_selector_chars: usize,

    /// Minimum non-whitespace characters for the largest-block fallback
    #[serde(default = "defaults::min_block_chars")]
    pub min_block_chars: usize,

    /// Elements considered by the largest-block fallback
    #[serde(default = "defaults::block_selector")]
    pub block_selector: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_selector_chars: defaults::min_selector_chars(),
            min_block_chars: defaults::min_block_chars(),
            block_selector: defaults::block_selector(),
        }
    }
}

/// Summarization backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Disable to always send content previews
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Chat-completions endpoint
    #[serde(default = "defaults::summary_api_url")]
    pub api_url: String,

    #[serde(default = "defaults::summary_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::summary_api_key_env")]
    pub api_key_env: String,

    /// Content shorter than this is sent as-is
    #[serde(default = "defaults::summary_min_chars")]
    pub min_chars: usize,

    /// Content is truncated to this before it is sent to the backend
    #[serde(default = "defaults::summary_max_input_chars")]
    pub max_input_chars: usize,

    /// Length of the raw preview used when summarization fails
    #[serde(default = "defaults::summary_fallback_chars")]
    pub fallback_chars: usize,

    #[serde(default = "defaults::summary_system_prompt")]
    pub system_prompt: String,

    /// Prepended to the content in the user message
    #[serde(default = "defaults::summary_user_prompt")]
    pub user_prompt: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            api_url: defaults::summary_api_url(),
            model: defaults::summary_model(),
            api_key_env: defaults::summary_api_key_env(),
            min_chars: defaults::summary_min_chars(),
            max_input_chars: defaults::summary_max_input_chars(),
            fallback_chars: defaults::summary_fallback_chars(),
            system_prompt: defaults::summary_system_prompt(),
            user_prompt: defaults::summary_user_prompt(),
        }
    }
}

/// Notification formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Maximum characters of summary/preview text per message
    #[serde(default = "defaults::max_body_chars")]
    pub max_body_chars: usize,

    /// Embed accent color
    #[serde(default = "defaults::embed_color")]
    pub embed_color: u32,

    /// Optional webhook username override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_body_chars: defaults::max_body_chars(),
            embed_color: defaults::embed_color(),
            username: None,
        }
    }
}

/// Mapping from a title keyword to a category tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeyword {
    /// Keyword matched at the start of a title or inside a leading bracket
    pub keyword: String,

    /// Tag used for sub-channel routing
    pub tag: String,
}

impl CategoryKeyword {
    pub fn new(keyword: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            tag: tag.into(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    use crate::models::{BoardConfig, CategoryKeyword, DigitPick, IdStrategy, ListingLayout};

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn accept_language() -> String {
        "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn item_delay() -> u64 {
        1000
    }
    pub fn first_run_limit() -> usize {
        5
    }

    // Content defaults
    pub fn min_selector_chars() -> usize {
        20
    }
    pub fn min_block_chars() -> usize {
        100
    }
    pub fn block_selector() -> String {
        "div, td, article, section".into()
    }

    // Summary defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn summary_api_url() -> String {
        "https://api.openai.com/v1/chat/completions".into()
    }
    pub fn summary_model() -> String {
        "gpt-4.1-mini".into()
    }
    pub fn summary_api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }
    pub fn summary_min_chars() -> usize {
        200
    }
    pub fn summary_max_input_chars() -> usize {
        3000
    }
    pub fn summary_fallback_chars() -> usize {
        300
    }
    pub fn summary_system_prompt() -> String {
        "너는 대학교 학사공지를 요약하는 도우미야.".into()
    }
    pub fn summary_user_prompt() -> String {
        "아래 공지를 학생 기준으로 3~5줄로 요약해줘:".into()
    }

    // Notify defaults
    pub fn max_body_chars() -> usize {
        1500
    }
    pub fn embed_color() -> u32 {
        3447003
    }

    // Category defaults
    pub fn categories() -> Vec<CategoryKeyword> {
        vec![
            CategoryKeyword::new("학사", "academic"),
            CategoryKeyword::new("수업", "academic"),
            CategoryKeyword::new("장학", "scholarship"),
            CategoryKeyword::new("취업", "career"),
            CategoryKeyword::new("채용", "career"),
            CategoryKeyword::new("진로", "career"),
            CategoryKeyword::new("국제", "international"),
            CategoryKeyword::new("교환학생", "international"),
            CategoryKeyword::new("행사", "event"),
            CategoryKeyword::new("모집", "recruit"),
        ]
    }

    // Board defaults
    pub fn boards() -> Vec<BoardConfig> {
        vec![BoardConfig {
            key: "knu-academic".into(),
            display_name: "경북대 학사공지".into(),
            list_url: "https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/stdList.action?menu_idx=42"
                .into(),
            detail_url_template: Some(
                "https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/view.action?btin_idx={id}&menu_idx=42"
                    .into(),
            ),
            id_strategy: IdStrategy::Fallback {
                rules: vec![
                    IdStrategy::QueryParams {
                        params: vec!["btin_idx".into(), "nttId".into()],
                    },
                    IdStrategy::DigitRun {
                        pick: DigitPick::Largest,
                        min_digits: 5,
                    },
                ],
            },
            listing: ListingLayout::default(),
            content_selectors: vec![
                "div.board_cont".into(),
                "div.bbs_view_cont".into(),
                "td.content".into(),
                "div.view_content".into(),
            ],
            main_channel: "DISCORD_WEBHOOK".into(),
            category_channels: BTreeMap::from([
                ("career".into(), "DISCORD_WEBHOOK_CAREER".into()),
                ("scholarship".into(), "DISCORD_WEBHOOK_SCHOLARSHIP".into()),
            ]),
        }]
    }
}
