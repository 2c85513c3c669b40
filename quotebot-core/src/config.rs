//! Run configuration.
//!
//! Credentials come from the process environment and are passed through as-is:
//! a missing variable becomes an empty string and is only rejected later by the
//! API that needed it. Non-secret run settings come from an optional TOML file
//! with environment overrides on top.

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";

pub const CONFIG_PATH_VAR: &str = "QUOTEBOT_CONFIG";
pub const SUBREDDIT_VAR: &str = "QUOTEBOT_SUBREDDIT";
pub const LIMIT_VAR: &str = "QUOTEBOT_LIMIT";
pub const STORE_PATH_VAR: &str = "QUOTEBOT_STORE_PATH";
pub const SAVE_POLICY_VAR: &str = "QUOTEBOT_SAVE_POLICY";

pub const DEFAULT_CONFIG_FILE: &str = "quotebot.toml";
pub const DEFAULT_SUBREDDIT: &str = "quotes";
pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_STORE_PATH: &str = "sent_quotes.json";

// Reddit listings cap `limit` at 100.
const MAX_LIMIT: u32 = 100;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub telegram_bot_token: String,
    pub telegram_channel_id: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            reddit_client_id: get(REDDIT_CLIENT_ID),
            reddit_client_secret: get(REDDIT_CLIENT_SECRET),
            reddit_user_agent: get(REDDIT_USER_AGENT),
            telegram_bot_token: get(TELEGRAM_BOT_TOKEN),
            telegram_channel_id: get(TELEGRAM_CHANNEL_ID),
        }
    }

    /// Names of the variables that were unset or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (REDDIT_CLIENT_ID, &self.reddit_client_id),
            (REDDIT_CLIENT_SECRET, &self.reddit_client_secret),
            (REDDIT_USER_AGENT, &self.reddit_user_agent),
            (TELEGRAM_BOT_TOKEN, &self.telegram_bot_token),
            (TELEGRAM_CHANNEL_ID, &self.telegram_channel_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"[REDACTED]")
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("telegram_bot_token", &"[REDACTED]")
            .field("telegram_channel_id", &self.telegram_channel_id)
            .finish()
    }
}

/// When the seen-set is written back to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Once, after every quote in the batch was handled. A failed send leaves
    /// the file untouched, so earlier sends of the same run are repeated next run.
    #[default]
    AfterBatch,
    /// After every successful send.
    AfterEachSend,
}

impl FromStr for SavePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "after_batch" => Ok(SavePolicy::AfterBatch),
            "after_each_send" => Ok(SavePolicy::AfterEachSend),
            other => Err(ConfigError::InvalidValue {
                field: "save_policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub subreddit: String,
    pub limit: u32,
    pub store_path: PathBuf,
    pub save_policy: SavePolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            limit: DEFAULT_LIMIT,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            save_policy: SavePolicy::AfterBatch,
        }
    }
}

impl RunSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Reads the settings file named by `QUOTEBOT_CONFIG` (or `quotebot.toml`),
    /// then applies `QUOTEBOT_*` overrides. Only an explicitly named file has to exist.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut settings = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using default run settings", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        if let Some(subreddit) = lookup(SUBREDDIT_VAR) {
            settings.subreddit = subreddit.trim().to_string();
        }
        if let Some(limit) = lookup(LIMIT_VAR) {
            settings.limit = limit.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: LIMIT_VAR.to_string(),
                value: limit.clone(),
            })?;
        }
        if let Some(store_path) = lookup(STORE_PATH_VAR) {
            settings.store_path = PathBuf::from(store_path);
        }
        if let Some(policy) = lookup(SAVE_POLICY_VAR) {
            settings.save_policy = policy.parse()?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("Loaded run settings from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // The name is spliced into the listing path.
        let valid_name = self
            .subreddit
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if self.subreddit.is_empty() || !valid_name {
            return Err(ConfigError::InvalidValue {
                field: "subreddit".to_string(),
                value: self.subreddit.clone(),
            });
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "limit".to_string(),
                value: self.limit.to_string(),
            });
        }
        Ok(())
    }
}
