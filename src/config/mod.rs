use serde::Deserialize;
use std::fmt;

pub const DEFAULT_USERS_URL: &str = "https://users.roblox.com";
pub const DEFAULT_PRESENCE_URL: &str = "https://presence.roblox.com";
pub const DEFAULT_GAMES_URL: &str = "https://games.roblox.com";

/// Complete tracker configuration.
///
/// Read once at startup and shared read-only by every monitor loop.
#[derive(Clone, Deserialize)]
pub struct TrackerConfig {
    /// Discord webhook that receives notifications
    #[serde(default)]
    pub webhook_url: String,

    /// `.ROBLOSECURITY` cookie value, sent with users/presence requests
    #[serde(default)]
    pub roblosecurity: Option<String>,

    /// Account names to monitor
    #[serde(default)]
    pub usernames: Vec<String>,

    /// Seconds between polls of one account
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Base URLs of the presence APIs (overridable for testing)
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_users_url")]
    pub users_url: String,
    #[serde(default = "default_presence_url")]
    pub presence_url: String,
    #[serde(default = "default_games_url")]
    pub games_url: String,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_users_url() -> String {
    DEFAULT_USERS_URL.to_string()
}

fn default_presence_url() -> String {
    DEFAULT_PRESENCE_URL.to_string()
}

fn default_games_url() -> String {
    DEFAULT_GAMES_URL.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            users_url: default_users_url(),
            presence_url: default_presence_url(),
            games_url: default_games_url(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            roblosecurity: None,
            usernames: Vec::new(),
            poll_interval_secs: default_poll_interval(),
            endpoints: EndpointConfig::default(),
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("webhook_url", &redact(&self.webhook_url))
            .field("roblosecurity", &self.roblosecurity.as_ref().map(|_| "<redacted>"))
            .field("usernames", &self.usernames)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    MissingWebhook,
    EmptyRoster,
    InvalidPollInterval(String),
    Unreadable(String),
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingWebhook => {
                write!(f, "webhook URL is required (PRESENCE_WEBHOOK_URL or WEB)")
            }
            ConfigError::EmptyRoster => {
                write!(f, "at least one username is required (PRESENCE_USERNAMES)")
            }
            ConfigError::InvalidPollInterval(v) => {
                write!(f, "poll interval must be a positive number of seconds, got '{}'", v)
            }
            ConfigError::Unreadable(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Malformed(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TrackerConfig {
    /// Load configuration from the process environment.
    ///
    /// If `PRESENCE_CONFIG` names a TOML file it is loaded first; these
    /// variables then override it:
    /// - `PRESENCE_WEBHOOK_URL` (falls back to `WEB`)
    /// - `ROBLOSECURITY`
    /// - `PRESENCE_USERNAMES` (comma separated)
    /// - `PRESENCE_POLL_INTERVAL_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`TrackerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match var("PRESENCE_CONFIG") {
            Some(path) => load_config(&path)?,
            None => TrackerConfig::default(),
        };

        if let Some(url) = var("PRESENCE_WEBHOOK_URL").or_else(|| var("WEB")) {
            config.webhook_url = url;
        }
        if let Some(cookie) = var("ROBLOSECURITY") {
            config.roblosecurity = Some(cookie);
        }
        if let Some(names) = var("PRESENCE_USERNAMES") {
            config.usernames = parse_roster(&names);
        } else {
            config.usernames = normalize_roster(&config.usernames);
        }
        if let Some(raw) = var("PRESENCE_POLL_INTERVAL_SECS") {
            config.poll_interval_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPollInterval(raw.clone()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check required fields. Expects a roster already run through
    /// [`normalize_roster`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::MissingWebhook);
        }
        if self.usernames.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval("0".to_string()));
        }
        Ok(())
    }
}

/// Split a comma separated roster, dropping blanks and duplicates.
pub fn parse_roster(raw: &str) -> Vec<String> {
    dedup_names(raw.split(','))
}

/// Trim every name and drop blanks and case-insensitive duplicates.
///
/// Usernames are case-insensitive, so `alice` and `ALICE` are one account.
/// The first spelling wins.
pub fn normalize_roster(names: &[String]) -> Vec<String> {
    dedup_names(names.iter().map(String::as_str))
}

fn dedup_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names.map(str::trim).filter(|n| !n.is_empty()) {
        if !out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<TrackerConfig, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Malformed(e.to_string()))
}
