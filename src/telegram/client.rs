//! HTTP client for the Telegram Bot API.
//!
//! This module provides the [`TelegramClient`] struct which delivers
//! [`OutboundMessage`]s through the `sendMessage` method, and the [`Delivery`]
//! trait used by the dispatcher so tests can swap the client for a mock.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use mockall::automock;
use reqwest::Client;

use crate::{
    config::Telegram,
    telegram::{DeliveryError, DispatchResult, OutboundMessage, request_structs::SendMessageRequest},
};

/// Sends outbound messages.
///
/// Implementations perform a single attempt per call and never retry.
#[automock]
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Delivers `message` and reports the outcome.
    async fn send(&self, message: &OutboundMessage) -> DispatchResult;
    /// Whether a bot token is configured.
    fn has_bot_token(&self) -> bool;
    /// Whether a default chat is configured.
    fn has_default_chat(&self) -> bool;
}

/// Telegram Bot API client.
///
/// # Examples
///
/// ```no_run
/// let client = TelegramClient::new(&config.telegram);
/// let result = client.send(&message).await;
/// println!("delivered: {}", result.delivered);
/// ```
pub struct TelegramClient {
    /// Bot authorization token, part of the request path
    bot_token: Option<String>,
    /// Chat used when a message has no explicit target
    default_chat_id: Option<String>,
    /// Bot API base url, without trailing slash
    api_url: String,
    /// Upper bound of a `sendMessage` call
    timeout: Duration,
    disable_link_preview: bool,
    /// HTTP client
    client: Client,
}

impl TelegramClient {
    /// Create a new [TelegramClient] from the telegram configuration section.
    ///
    /// Blank token and chat values are treated as missing.
    pub fn new(settings: &Telegram) -> Self {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        TelegramClient {
            bot_token: non_blank(&settings.bot_token),
            default_chat_id: non_blank(&settings.chat_id),
            api_url: settings.api_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(settings.timeout_secs),
            disable_link_preview: settings.disable_link_preview,
            client: Client::new(),
        }
    }

    /// Request `/bot{token}/sendMessage`.
    ///
    /// Configuration is checked before anything goes on the wire: a missing
    /// token or target chat returns immediately.
    async fn send_message(&self, message: &OutboundMessage) -> Result<String, DeliveryError> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or(DeliveryError::MissingBotToken)?;
        let chat_id = message
            .target_chat_id
            .as_deref()
            .or(self.default_chat_id.as_deref())
            .ok_or(DeliveryError::MissingChatId)?
            .to_owned();

        let url = format!("{}/bot{}/sendMessage", &self.api_url, token);
        let body = SendMessageRequest::new(&chat_id, message, self.disable_link_preview);
        debug!(
            "request sendMessage for chat {} ({} keyboard buttons)",
            &chat_id,
            message.keyboard.as_ref().map_or(0, |k| k.button_count())
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(to_delivery_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(chat_id)
    }
}

/// Converts a transport error, dropping the url which embeds the bot token.
fn to_delivery_error(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Network(err.without_url().to_string())
    }
}

#[async_trait]
impl Delivery for TelegramClient {
    async fn send(&self, message: &OutboundMessage) -> DispatchResult {
        match self.send_message(message).await {
            Ok(chat_id) => {
                debug!("sendMessage accepted for chat {}", chat_id);
                DispatchResult::delivered()
            }
            Err(err) => {
                debug!("sendMessage failed: {}", err);
                DispatchResult::failed(err)
            }
        }
    }

    fn has_bot_token(&self) -> bool {
        self.bot_token.is_some()
    }

    fn has_default_chat(&self) -> bool {
        self.default_chat_id.is_some()
    }
}
