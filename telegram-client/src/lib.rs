use async_trait::async_trait;
use quotebot_core::{CoreError, Credentials, MessageSink, TelegramApiError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Turns a raw Bot API answer into the sent message or a typed error.
pub fn parse_send_response(status: u16, body: &str) -> Result<SentMessage, TelegramApiError> {
    let response: TelegramResponse<SentMessage> =
        serde_json::from_str(body).map_err(|e| TelegramApiError::InvalidResponse {
            details: format!("HTTP {}: {}", status, e),
        })?;

    if response.ok {
        return response.result.ok_or_else(|| TelegramApiError::InvalidResponse {
            details: "ok response without result".to_string(),
        });
    }

    let error_code = response.error_code.unwrap_or(status);
    let description = response
        .description
        .unwrap_or_else(|| "no description".to_string());

    Err(match error_code {
        401 => TelegramApiError::Unauthorized,
        400 => TelegramApiError::BadRequest { description },
        403 => TelegramApiError::Forbidden { description },
        429 => TelegramApiError::RateLimitExceeded {
            retry_after: response
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(1),
        },
        _ => TelegramApiError::Api {
            error_code,
            description,
        },
    })
}

pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    bot_token: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Result<Self, CoreError> {
        Self::with_base_url(bot_token, TELEGRAM_API_BASE)
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self, CoreError> {
        Self::new(credentials.telegram_bot_token.clone())
    }

    pub fn with_base_url(bot_token: String, base_url: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<SentMessage, CoreError> {
        let request = SendMessageRequest { chat_id, text };

        debug!("Sending {} characters to chat {}", text.chars().count(), chat_id);
        let response = match self
            .http_client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // The request URL embeds the bot token.
                let e = e.without_url();
                error!("Network error calling sendMessage: {}", e);
                if e.is_timeout() {
                    return Err(CoreError::TelegramApi(TelegramApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| CoreError::Network(e.without_url()))?;

        match parse_send_response(status, &body) {
            Ok(message) => {
                debug!(
                    "Telegram accepted message {} in chat {}",
                    message.message_id, message.chat.id
                );
                Ok(message)
            }
            Err(e) => {
                if let TelegramApiError::RateLimitExceeded { retry_after } = &e {
                    warn!("Telegram flood control, retry after {} seconds", retry_after);
                } else {
                    error!("sendMessage failed with status {}: {}", status, e);
                }
                Err(CoreError::TelegramApi(e))
            }
        }
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), CoreError> {
        let message = TelegramClient::send_message(self, channel_id, text).await?;
        info!("Delivered message {} to {}", message.message_id, channel_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_successful_send() {
        let body = r#"{
            "ok": true,
            "result": {
                "message_id": 42,
                "date": 1700000000,
                "chat": {"id": -1001234567890, "type": "channel", "title": "Daily Quotes", "username": "dailyquotes"},
                "text": "Be one.\n\nMarcus Aurelius"
            }
        }"#;

        let message = parse_send_response(200, body).unwrap();
        assert_eq!(message.message_id, 42);
        assert_eq!(message.chat.id, -1001234567890);
    }

    #[test]
    fn test_parse_error_responses() {
        let unauthorized = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
        assert!(matches!(
            parse_send_response(401, unauthorized),
            Err(TelegramApiError::Unauthorized)
        ));

        let chat_not_found =
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        match parse_send_response(400, chat_not_found) {
            Err(TelegramApiError::BadRequest { description }) => {
                assert_eq!(description, "Bad Request: chat not found")
            }
            other => panic!("Expected BadRequest, got {:?}", other),
        }

        let flood = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 17","parameters":{"retry_after":17}}"#;
        assert!(matches!(
            parse_send_response(429, flood),
            Err(TelegramApiError::RateLimitExceeded { retry_after: 17 })
        ));

        let not_found = r#"{"ok":false,"error_code":404,"description":"Not Found"}"#;
        assert!(matches!(
            parse_send_response(404, not_found),
            Err(TelegramApiError::Api { error_code: 404, .. })
        ));
    }

    #[test]
    fn test_parse_garbage_response() {
        let result = parse_send_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(
            result,
            Err(TelegramApiError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_client_hides_token() {
        let client = TelegramClient::with_base_url(
            "123456:SECRET".to_string(),
            "https://api.telegram.org/",
        )
        .unwrap();

        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123456:SECRET/sendMessage"
        );
        assert!(!format!("{:?}", client).contains("SECRET"));
    }

    #[test]
    fn test_send_message_request_shape() {
        let request = SendMessageRequest {
            chat_id: "@dailyquotes",
            text: "line one\n\nline two",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], "@dailyquotes");
        assert_eq!(json["text"], "line one\n\nline two");
    }
}
