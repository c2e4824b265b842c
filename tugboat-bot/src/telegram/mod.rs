//! Telegram Bot API types and client.
//!
//! Only the slice of the Bot API this process uses: long-polled updates,
//! message sends and edits, deletions, and callback-query acknowledgement.

pub mod client;

pub use client::TelegramClient;

use serde::{Deserialize, Serialize};

/// Errors from the Bot API boundary.
///
/// Transport failures and API-level rejections (`ok: false`) stay distinct so
/// callers can tell a dead network from a deleted message.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram transport error: {reason}")]
    Transport { reason: String },

    #[error("Telegram API rejected {method}: {description}")]
    Api { method: String, description: String },

    #[error("invalid Telegram response: {reason}")]
    InvalidResponse { reason: String },
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// Incoming or sent chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Inline keyboard button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// The authenticated bot account, from `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}
