//! Command dispatch.
//!
//! This module provides the [`Dispatcher`] struct, the entry point shared by
//! the webhook and the direct HTTP triggers. It resolves a command, renders
//! the matching message and hands it to the [`Delivery`] implementation.
//!
//! # Flow
//!
//! ```text
//! Chat text → Command::parse() → render() → Delivery::send() → DispatchResult
//! ```
//!
//! The dispatcher holds no mutable state: one call is one message to one chat.

use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    catalog::LinkCatalog,
    commands::{Command, MessageFormatter, UnknownKey},
    telegram::{Delivery, DispatchResult, OutboundMessage},
};

/// Routes commands to their message and delivers it.
///
/// # Command Table
///
/// - `/start` → welcome message
/// - `/help` → help message
/// - `/menu` → help message
/// - `/all` → every link
/// - `/<key>` → the link registered under `key`
///
/// Any other text is ignored without error and without sending anything.
pub struct Dispatcher {
    catalog: Arc<LinkCatalog>,
    formatter: MessageFormatter,
    delivery: Arc<dyn Delivery>,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<LinkCatalog>,
        formatter: MessageFormatter,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Dispatcher {
            catalog,
            formatter,
            delivery,
        }
    }

    pub fn catalog(&self) -> &LinkCatalog {
        &self.catalog
    }

    pub fn delivery(&self) -> &dyn Delivery {
        self.delivery.as_ref()
    }

    /// Handles the text of a chat message.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw message text
    /// * `chat_id` - Chat to answer to, the default chat when `None`
    ///
    /// # Returns
    ///
    /// [`DispatchResult::ignored`] if the text is not a known command,
    /// otherwise the delivery outcome.
    pub async fn dispatch(&self, text: &str, chat_id: Option<&str>) -> DispatchResult {
        match Command::parse(text, &self.catalog) {
            Some(command) => self.execute(&command, chat_id).await,
            None => DispatchResult::ignored(),
        }
    }

    /// Renders and delivers a parsed command.
    pub async fn execute(&self, command: &Command, chat_id: Option<&str>) -> DispatchResult {
        let Some(message) = self.render(command) else {
            return DispatchResult::ignored();
        };

        let target = chat_id.unwrap_or("default chat");
        info!("dispatching {} to {}", command.name(), target);

        let result = self.delivery.send(&message.to_chat(chat_id)).await;
        match &result.reason {
            None => info!("{} delivered to {}", command.name(), target),
            Some(reason) if reason.is_configuration() => warn!(
                "cannot deliver {} to {}: {}",
                command.name(),
                target,
                reason
            ),
            Some(reason) => error!(
                "failed to deliver {} to {}: {}",
                command.name(),
                target,
                reason
            ),
        }

        result
    }

    /// Renders the message of a command.
    ///
    /// Returns `None` for a link whose key is not in the catalog.
    pub fn render(&self, command: &Command) -> Option<OutboundMessage> {
        let message = match command {
            Command::Start => self.formatter.format_welcome(),
            Command::Help | Command::Menu => self.formatter.format_help(),
            Command::All => self.formatter.format_all(),
            Command::Link(key) => self.formatter.format_entry(self.catalog.lookup(key)?),
        };

        Some(message)
    }

    /// Sends the link registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownKey`], listing the valid keys, if `key` is not in the catalog.
    pub async fn send_link(
        &self,
        key: &str,
        chat_id: Option<&str>,
    ) -> Result<DispatchResult, UnknownKey> {
        if self.catalog.lookup(key).is_none() {
            error!("unknown link key {}", key);
            return Err(UnknownKey {
                key: key.to_owned(),
                available: self.catalog.keys().into_iter().map(str::to_owned).collect(),
            });
        }

        Ok(self.execute(&Command::Link(key.to_owned()), chat_id).await)
    }

    pub async fn send_all(&self, chat_id: Option<&str>) -> DispatchResult {
        self.execute(&Command::All, chat_id).await
    }

    pub async fn send_help(&self, chat_id: Option<&str>) -> DispatchResult {
        self.execute(&Command::Help, chat_id).await
    }

    pub async fn send_menu(&self, chat_id: Option<&str>) -> DispatchResult {
        self.execute(&Command::Menu, chat_id).await
    }

    pub async fn send_welcome(&self, chat_id: Option<&str>) -> DispatchResult {
        self.execute(&Command::Start, chat_id).await
    }
}
