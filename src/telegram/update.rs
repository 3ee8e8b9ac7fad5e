//! Telegram webhook update payload.
//!
//! Only the fields needed to route a command are modelled, everything else in
//! the update is ignored. Two kinds of updates carry a command:
//!
//! - a text message: `{"message": {"text": "/help", "chat": {"id": 123}}}`
//! - an inline keyboard press: `{"callback_query": {"data": "goods", "message": {"chat": {"id": 123}}}}`

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<Message>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
    text: Option<String>,
    chat: Option<Chat>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: ChatId,
}

/// Telegram sends numeric ids, manual triggers often send strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatId {
    Number(i64),
    Text(String),
}

impl ChatId {
    fn into_string(self) -> String {
        match self {
            ChatId::Number(id) => id.to_string(),
            ChatId::Text(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    data: Option<String>,
    message: Option<Message>,
}

/// A command extracted from an update, with the chat to answer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCommand {
    pub text: String,
    pub chat_id: String,
}

/// The webhook body cannot be processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedUpdate {
    #[error("invalid update payload: {0}")]
    InvalidJson(String),
    #[error("message has text but no chat id")]
    MissingChatId,
}

/// Extracts the command carried by a webhook body.
///
/// Returns `Ok(None)` for well formed updates that carry nothing to answer
/// (edited messages, photos, member changes...).
///
/// # Errors
///
/// - [`MalformedUpdate::InvalidJson`] if the body is not a JSON update object
/// - [`MalformedUpdate::MissingChatId`] if a text message has no chat
pub fn parse_update(body: &[u8]) -> Result<Option<IncomingCommand>, MalformedUpdate> {
    let update: Update =
        serde_json::from_slice(body).map_err(|e| MalformedUpdate::InvalidJson(e.to_string()))?;

    if let Some(Message {
        text: Some(text),
        chat,
    }) = update.message
    {
        let chat = chat.ok_or(MalformedUpdate::MissingChatId)?;
        return Ok(Some(IncomingCommand {
            text: text.trim().to_owned(),
            chat_id: chat.id.into_string(),
        }));
    }

    // Keyboard buttons carry the bare command key
    if let Some(CallbackQuery {
        data: Some(data),
        message: Some(Message {
            chat: Some(chat), ..
        }),
    }) = update.callback_query
    {
        return Ok(Some(IncomingCommand {
            text: format!("/{}", data.trim()),
            chat_id: chat.id.into_string(),
        }));
    }

    Ok(None)
}
