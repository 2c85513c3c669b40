use crate::error::*;
use std::time::Duration;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::TelegramApi(e) => {
                error!("Telegram API error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Seen-set store error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::TelegramApi(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::RedditApi(e) => e.retry_after(),
            CoreError::TelegramApi(e) => e.retry_after(),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::TelegramApi(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::TelegramApi(_) => "TELEGRAM_API".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } => true,
            RedditApiError::RequestTimeout => true,
            RedditApiError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests to Reddit. Wait {} seconds before the next run.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The subreddit may be private or quarantined.",
                resource
            ),
            RedditApiError::NotFound { resource } => {
                format!("{} not found. The subreddit may not exist or is banned.", resource)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Check your app credentials.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::NotFound { .. } => "REDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for TelegramApiError {
    fn log_error(&self) -> &Self {
        error!("TelegramApiError: {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            TelegramApiError::RateLimitExceeded { .. } => true,
            TelegramApiError::RequestTimeout => true,
            TelegramApiError::Api { error_code, .. } => *error_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            TelegramApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            TelegramApiError::Unauthorized => {
                "Telegram rejected the bot token. Please check TELEGRAM_BOT_TOKEN.".to_string()
            }
            TelegramApiError::BadRequest { description } => format!(
                "Telegram refused the message ({}). Check TELEGRAM_CHANNEL_ID.",
                description
            ),
            TelegramApiError::Forbidden { .. } => {
                "The bot cannot post to this channel. Make sure it is an administrator."
                    .to_string()
            }
            TelegramApiError::RateLimitExceeded { retry_after } => format!(
                "Too many messages sent. Wait {} seconds before the next run.",
                retry_after
            ),
            TelegramApiError::RequestTimeout => {
                "Request to Telegram timed out. Please try again.".to_string()
            }
            _ => "Telegram API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            TelegramApiError::Unauthorized => "TELEGRAM_UNAUTHORIZED".to_string(),
            TelegramApiError::BadRequest { .. } => "TELEGRAM_BAD_REQUEST".to_string(),
            TelegramApiError::Forbidden { .. } => "TELEGRAM_FORBIDDEN".to_string(),
            TelegramApiError::RateLimitExceeded { .. } => "TELEGRAM_RATE_LIMIT".to_string(),
            TelegramApiError::RequestTimeout => "TELEGRAM_TIMEOUT".to_string(),
            TelegramApiError::Api { .. } => "TELEGRAM_API_ERROR".to_string(),
            TelegramApiError::InvalidResponse { .. } => "TELEGRAM_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::Read { path, .. } => {
                format!("Could not read the sent-quotes file at {}.", path)
            }
            StoreError::Write { path, .. } => format!(
                "Could not write the sent-quotes file at {}. Quotes sent in this run may be sent again.",
                path
            ),
            StoreError::Malformed { path, .. } => format!(
                "The sent-quotes file at {} is not a JSON array of strings. Fix or remove it.",
                path
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            StoreError::Read { .. } => "STORE_READ".to_string(),
            StoreError::Write { .. } => "STORE_WRITE".to_string(),
            StoreError::Malformed { .. } => "STORE_MALFORMED".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::Unreadable { path, .. } => {
                format!("Configuration file {} could not be read.", path)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for setting {}.", value, field)
            }
            ConfigError::Parse(_) => {
                "Configuration file is not valid TOML. Please fix the syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::Unreadable { .. } => "CONFIG_UNREADABLE".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failed run: the error chain, its code, and a hint for the operator.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    /// One-line summary such as `[STORE_MALFORMED] The sent-quotes file ...`.
    pub fn summary(&self, error: &CoreError) -> String {
        let code = match error {
            CoreError::RedditApi(e) => e.error_code(),
            CoreError::TelegramApi(e) => e.error_code(),
            CoreError::Store(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            _ => error.error_code(),
        };
        format!("[{}] {}", code, error.user_friendly_message())
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("{}", self.summary(error));
        if let Some(retry_after) = error.retry_after() {
            info!("Transient failure; the next run may succeed after {:?}", retry_after);
        }
    }
}
