//! Telegram Bot API integration.
//!
//! This module holds everything that talks to, or is shaped by, the Telegram
//! Bot API: the outbound message model, the `sendMessage` client and the
//! inbound webhook update payload.
//!
//! # Modules
//!
//! - `client` - [`TelegramClient`] and the [`Delivery`] trait it implements
//! - `request_structs` - JSON bodies sent to the Bot API
//! - `update` - Webhook update payload and command extraction

mod client;
mod request_structs;
mod update;

use serde::Deserialize;
use thiserror::Error;

pub use crate::telegram::client::{Delivery, TelegramClient};
#[cfg(test)]
pub use crate::telegram::client::MockDelivery;
pub use crate::telegram::update::{MalformedUpdate, parse_update};

/// How Telegram renders the text of a message.
///
/// A single mode is configured for the whole process so every message,
/// whatever the link it carries, follows the same escaping rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Text is displayed as is
    Plain,
    /// Telegram HTML subset, catalog text is escaped
    #[default]
    Html,
}

impl ParseMode {
    /// Value of the `parse_mode` field of `sendMessage`, `None` for plain text.
    pub fn as_api_value(&self) -> Option<&'static str> {
        match self {
            ParseMode::Plain => None,
            ParseMode::Html => Some("HTML"),
        }
    }
}

/// A button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    /// Text displayed on the button
    pub label: String,
    /// Command key sent back by Telegram when the button is pressed
    pub action_key: String,
}

/// Ordered rows of inline keyboard buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardLayout {
    pub rows: Vec<Vec<KeyboardButton>>,
}

impl KeyboardLayout {
    /// Total number of buttons across all rows.
    pub fn button_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// A message ready to be sent to Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Rendered text, already escaped for `parse_mode`
    pub text: String,
    /// Target chat, the configured default chat is used when `None`
    pub target_chat_id: Option<String>,
    pub parse_mode: ParseMode,
    pub keyboard: Option<KeyboardLayout>,
}

impl OutboundMessage {
    /// Returns the same message addressed to `chat_id`.
    pub fn to_chat(mut self, chat_id: Option<&str>) -> Self {
        self.target_chat_id = chat_id.map(str::to_owned);
        self
    }
}

/// Reasons a message could not be delivered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// No bot token is configured
    #[error("bot token is not configured")]
    MissingBotToken,
    /// No target chat was given and no default chat is configured
    #[error("no target chat given and no default chat configured")]
    MissingChatId,
    /// The Bot API answered with a non-success status
    #[error("telegram api returned {status}: {body}")]
    Api { status: u16, body: String },
    /// The request did not complete before the configured timeout
    #[error("telegram api request timed out")]
    Timeout,
    /// Transport failure (DNS, connection, TLS...)
    #[error("network error: {0}")]
    Network(String),
}

impl DeliveryError {
    /// Whether the error comes from missing configuration rather than from the network.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DeliveryError::MissingBotToken | DeliveryError::MissingChatId
        )
    }
}

/// Outcome of a dispatch.
///
/// - delivered: `delivered == true`, no reason
/// - ignored: nothing had to be sent, `delivered == false`, no reason
/// - failed: `delivered == false` with the failure reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub delivered: bool,
    pub reason: Option<DeliveryError>,
}

impl DispatchResult {
    pub fn delivered() -> Self {
        DispatchResult {
            delivered: true,
            reason: None,
        }
    }

    pub fn ignored() -> Self {
        DispatchResult {
            delivered: false,
            reason: None,
        }
    }

    pub fn failed(reason: DeliveryError) -> Self {
        DispatchResult {
            delivered: false,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_api_value() {
        assert_eq!(ParseMode::Html.as_api_value(), Some("HTML"));
        assert_eq!(ParseMode::Plain.as_api_value(), None);
    }

    #[test]
    fn test_dispatch_result_shapes() {
        assert_eq!(DispatchResult::delivered().reason, None);
        assert!(DispatchResult::delivered().delivered);

        let ignored = DispatchResult::ignored();
        assert_eq!(ignored.reason, None);
        assert!(!ignored.delivered);

        let failed = DispatchResult::failed(DeliveryError::Timeout);
        assert!(!failed.delivered);
        assert_eq!(failed.reason, Some(DeliveryError::Timeout));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(DeliveryError::MissingBotToken.is_configuration());
        assert!(DeliveryError::MissingChatId.is_configuration());
        assert!(!DeliveryError::Timeout.is_configuration());
        assert!(
            !DeliveryError::Api {
                status: 400,
                body: String::new()
            }
            .is_configuration()
        );
    }

    #[test]
    fn test_to_chat() {
        let message = OutboundMessage {
            text: "hello".to_owned(),
            target_chat_id: None,
            parse_mode: ParseMode::Plain,
            keyboard: None,
        };
        assert_eq!(
            message.clone().to_chat(Some("42")).target_chat_id,
            Some("42".to_owned())
        );
        assert_eq!(message.to_chat(None).target_chat_id, None);
    }
}
