//! Bot command parsing, rendering and dispatch.
//!
//! # Overview
//!
//! The commands module turns an incoming chat text, or a direct HTTP trigger,
//! into one message sent to one chat:
//!
//! 1. **Parsing** - [`command::Command::parse`] recognizes `/start`, `/help`,
//!    `/menu`, `/all` and `/<key>` for every catalog key
//! 2. **Rendering** - [`formatter::MessageFormatter`] builds the message text
//!    and the optional inline keyboard
//! 3. **Delivery** - [`Dispatcher`] hands the message to the Telegram client
//!
//! # Architecture
//!
//! ```text
//! Chat text / HTTP trigger
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Dispatcher  │  ← dispatch() / send_link() / send_all() / ...
//! └─────────────┘
//!      │
//!      ├── Command::parse() ──────► Command (or ignored)
//!      │
//!      ├── MessageFormatter ──────► OutboundMessage
//!      │
//!      └── Delivery::send() ──────► DispatchResult
//! ```
//!
//! # Error Handling
//!
//! - Unknown commands are not errors: they produce an ignored result and no message.
//! - Unknown keys on the direct trigger produce [`UnknownKey`].
//! - Delivery failures are reported in the returned
//!   [`DispatchResult`](crate::telegram::DispatchResult).

use thiserror::Error;

mod command;
mod dispatcher;
mod formatter;

pub use crate::commands::command::Command;
pub use crate::commands::dispatcher::Dispatcher;
pub use crate::commands::formatter::MessageFormatter;

/// A direct trigger asked for a key that is not in the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown link key '{key}'")]
pub struct UnknownKey {
    /// The requested key
    pub key: String,
    /// Every valid key, in catalog order
    pub available: Vec<String>,
}
