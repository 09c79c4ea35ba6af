//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Source;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by every mirror request
    #[serde(default)]
    pub http: HttpConfig,

    /// Twitter account and Nitter mirrors
    #[serde(default = "defaults::twitter_source")]
    pub twitter: AccountSource,

    /// Instagram account and Bibliogram mirrors
    #[serde(default = "defaults::instagram_source")]
    pub instagram: AccountSource,

    /// Delivery channel credentials
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Caption templates
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Poll loop timing
    #[serde(default)]
    pub poll: PollConfig,

    /// Last-seen state file
    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config.with_default_mirrors())
    }

    /// Replace empty mirror lists with the built-in ones.
    pub fn with_default_mirrors(mut self) -> Self {
        if self.twitter.mirrors.is_empty() {
            self.twitter.mirrors = defaults::nitter_mirrors();
        }
        if self.instagram.mirrors.is_empty() {
            self.instagram.mirrors = defaults::bibliogram_mirrors();
        }
        self
    }

    /// Account settings for a source.
    pub fn source(&self, source: Source) -> &AccountSource {
        match source {
            Source::Twitter => &self.twitter,
            Source::Instagram => &self.instagram,
        }
    }

    /// Apply `NOTIFICATION_BOT_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(username) = get("NOTIFICATION_BOT_TWITTER_USERNAME") {
            self.twitter.username = Some(username);
        }
        if let Some(username) = get("NOTIFICATION_BOT_INSTAGRAM_USERNAME") {
            self.instagram.username = Some(username);
        }
        if let Some(token) = get("NOTIFICATION_BOT_TOKEN") {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = get("NOTIFICATION_BOT_TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(delay) = get("NOTIFICATION_BOT_DELAY") {
            match delay.trim().parse() {
                Ok(secs) => self.poll.delay_secs = secs,
                Err(_) => log::warn!("Ignoring invalid NOTIFICATION_BOT_DELAY: {delay}"),
            }
        }
        if let Some(template) = get("NOTIFICATION_BOT_TWITTER_TEMPLATE") {
            self.templates.twitter = template;
        }
        if let Some(template) = get("NOTIFICATION_BOT_INSTAGRAM_TEMPLATE") {
            self.templates.instagram = template;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.poll.delay_secs == 0 {
            return Err(AppError::config("poll.delay_secs must be > 0"));
        }

        for source in Source::ALL {
            let account = self.source(source);
            if account.is_enabled() && account.mirrors.is_empty() {
                return Err(AppError::config(format!(
                    "{source} is enabled but has no mirrors"
                )));
            }
            for mirror in &account.mirrors {
                let parsed = url::Url::parse(mirror)?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::config(format!(
                        "{source} mirror {mirror} is not an http(s) URL"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate the settings the delivery channel cannot run without.
    pub fn validate_delivery(&self) -> Result<()> {
        if self.telegram.chat_id.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::config("There is no telegram.chat_id"));
        }
        if self.telegram.token.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::config("There is no telegram.token"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            twitter: defaults::twitter_source(),
            instagram: defaults::instagram_source(),
            telegram: TelegramConfig::default(),
            templates: TemplateConfig::default(),
            poll: PollConfig::default(),
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Ceiling for a single mirror attempt, in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// An account to watch and the mirrors to reach it through.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSource {
    /// Account handle; `None` disables the source
    #[serde(default)]
    pub username: Option<String>,

    /// Mirror base URLs, tried in order
    #[serde(default)]
    pub mirrors: Vec<String>,
}

impl AccountSource {
    pub fn is_enabled(&self) -> bool {
        self.handle().is_some()
    }

    /// The configured handle, if non-empty.
    pub fn handle(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|handle| !handle.is_empty())
    }
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,

    /// Destination chat or channel identifier
    #[serde(default)]
    pub chat_id: Option<String>,

    #[serde(default = "defaults::telegram_api")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_base: defaults::telegram_api(),
        }
    }
}

/// Caption templates.
///
/// Tweet placeholders: `{CHAT_ID}`, `{TWITTER_LINK}`, `{NITTER_LINK}`, `{TWEET_DESCRIPTION}`.
/// Post placeholders: `{CHAT_ID}`, `{INSTAGRAM_LINK}`, `{BIBLIOGRAM_LINK}`, `{POST_DESCRIPTION}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "defaults::twitter_template")]
    pub twitter: String,

    #[serde(default = "defaults::instagram_template")]
    pub instagram: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            twitter: defaults::twitter_template(),
            instagram: defaults::instagram_template(),
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between two cycles
    #[serde(default = "defaults::delay")]
    pub delay_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay_secs: defaults::delay(),
        }
    }
}

/// Persisted state settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "defaults::state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: defaults::state_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::AccountSource;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; nfbot/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Mirror defaults
    pub fn nitter_mirrors() -> Vec<String> {
        vec![
            "https://nitter.net".into(),
            "https://nitter.42l.fr".into(),
            "https://nitter.pussthecat.org".into(),
        ]
    }
    pub fn bibliogram_mirrors() -> Vec<String> {
        vec![
            "https://bibliogram.art".into(),
            "https://bibliogram.pussthecat.org".into(),
            "https://bibliogram.froth.zone".into(),
        ]
    }
    pub fn twitter_source() -> AccountSource {
        AccountSource {
            username: None,
            mirrors: nitter_mirrors(),
        }
    }
    pub fn instagram_source() -> AccountSource {
        AccountSource {
            username: None,
            mirrors: bibliogram_mirrors(),
        }
    }

    // Delivery defaults
    pub fn telegram_api() -> String {
        "https://api.telegram.org".into()
    }
    pub fn twitter_template() -> String {
        "{TWEET_DESCRIPTION}\n\n> {TWITTER_LINK}".into()
    }
    pub fn instagram_template() -> String {
        "{POST_DESCRIPTION}\n\n> {INSTAGRAM_LINK}".into()
    }

    // Loop and state defaults
    pub fn delay() -> u64 {
        120
    }
    pub fn state_path() -> PathBuf {
        PathBuf::from("lasts.json")
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
