//! Bot API HTTP client.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{BotUser, InlineKeyboardMarkup, Message, TelegramError, Update};
use tugboat_core::config::TelegramConfig;

/// Thin typed client over the Telegram Bot HTTP API.
#[derive(Debug)]
pub struct TelegramClient {
    base: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl TelegramClient {
    /// Creates a client for one bot token.
    pub fn new(token: &str, config: &TelegramConfig) -> Self {
        let poll_timeout_secs = config.poll_timeout.as_secs();
        Self {
            base: format!("{}/bot{token}", config.api_base.trim_end_matches('/')),
            poll_timeout_secs,
            client: reqwest::Client::builder()
                // Long polls hold the connection open for poll_timeout, so the
                // client timeout must sit above it
                .timeout(config.poll_timeout + std::time::Duration::from_secs(10))
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base))
            .json(&payload)
            .send()
            .await
            .map_err(|e| TelegramError::Transport {
                reason: e.to_string(),
            })?;

        let envelope: ApiResponse<T> =
            response
                .json()
                .await
                .map_err(|e| TelegramError::InvalidResponse {
                    reason: format!("{method} response decode failed: {e}"),
                })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::InvalidResponse {
            reason: format!("{method} response missing result"),
        })
    }

    /// Identifies the bot account; doubles as the startup token check.
    ///
    /// # Errors
    /// - `TelegramError::Api` - Token rejected
    /// - `TelegramError::Transport` - Bot API unreachable
    pub async fn get_me(&self) -> Result<BotUser, TelegramError> {
        self.call("getMe", json!({})).await
    }

    /// Long-polls for updates past `offset`.
    ///
    /// # Errors
    /// - `TelegramError::Transport` - Bot API unreachable
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Sends a message, optionally as a reply and with an inline keyboard.
    ///
    /// # Errors
    /// - `TelegramError::Api` - Chat unknown or message rejected
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TelegramError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(message_id) = reply_to {
            payload["reply_to_message_id"] = json!(message_id);
        }
        if let Some(markup) = keyboard {
            payload["reply_markup"] = serde_json::to_value(markup).map_err(|e| {
                TelegramError::InvalidResponse {
                    reason: format!("keyboard serialization failed: {e}"),
                }
            })?;
        }
        self.call("sendMessage", payload).await
    }

    /// Replaces the text of a previously sent message.
    ///
    /// # Errors
    /// - `TelegramError::Api` - Message gone or text identical
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TelegramError> {
        // The result is the edited Message (or `true` for inline messages);
        // callers only care that the edit landed
        self.call::<Value>(
            "editMessageText",
            json!({
                "chat_id": chat_id,
                "message_id": message_id,
                "text": text,
            }),
        )
        .await
        .map(|_| ())
    }

    /// Deletes one message.
    ///
    /// # Errors
    /// - `TelegramError::Api` - Message already gone or not deletable
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        self.call::<bool>(
            "deleteMessage",
            json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }),
        )
        .await
        .map(|_| ())
    }

    /// Acknowledges a callback query so the client stops its spinner.
    ///
    /// # Errors
    /// - `TelegramError::Api` - Query expired
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        self.call::<bool>(
            "answerCallbackQuery",
            json!({
                "callback_query_id": callback_query_id,
            }),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_envelope_decodes_success() {
        let body = r#"{"ok": true, "result": {"id": 42, "username": "tugboat_bot"}}"#;
        let envelope: ApiResponse<BotUser> = serde_json::from_str(body).unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.result.unwrap().id, 42);
    }

    #[test]
    fn test_api_response_envelope_decodes_failure() {
        let body = r#"{"ok": false, "description": "Bad Request: message to edit not found"}"#;
        let envelope: ApiResponse<Value> = serde_json::from_str(body).unwrap();
        assert!(!envelope.ok);
        assert!(envelope.description.unwrap().contains("not found"));
    }

    #[test]
    fn test_client_base_includes_token() {
        let config = TelegramConfig::default();
        let client = TelegramClient::new("123:abc", &config);
        assert!(client.base.ends_with("/bot123:abc"));
    }
}
