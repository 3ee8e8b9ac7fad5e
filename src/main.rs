//! Linkbot - A Telegram bot sending a fixed set of links on demand.
//!
//! Linkbot keeps a small catalog of named links (spreadsheets, databases,
//! dashboards...) and posts them to a Telegram chat, either when a chat member
//! sends a command or when an HTTP endpoint is called.
//!
//! # Configuration
//!
//! Everything has a default, the bot only needs a token and a default chat to
//! send anything. They can come from a YAML file:
//!
//! ```yaml
//! telegram:
//!   bot_token: "123456:ABC-DEF"
//!   chat_id: "-1001234567890"
//! ```
//!
//! or from the environment:
//!
//! ```bash
//! export BOT_TOKEN="123456:ABC-DEF"
//! export CHAT_ID="-1001234567890"
//! export PORT=10000
//! # any other value with the LINKBOT_ prefix
//! export LINKBOT_FORMATTER__INTERACTIVE=true
//! ```
//!
//! See [`config`] for the full file format.
//!
//! # Usage
//!
//! ```bash
//! linkbot --config linkbot.yaml --port 8080
//! ```
//!
//! # Bot Commands
//!
//! - `/start` - Welcome message
//! - `/help`, `/menu` - List of commands
//! - `/all` - Every link
//! - `/<key>` - One link, for every key of the catalog
//!
//! # Architecture
//!
//! - [`catalog`] - The immutable link catalog
//! - [`commands`] - Command parsing, message rendering and dispatch
//! - [`config`] - YAML and environment configuration
//! - [`server`] - HTTP routes, including the Telegram webhook
//! - [`telegram`] - Bot API client and webhook payloads
//! - [`utils`] - Text helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use crate::{
    commands::{Dispatcher, MessageFormatter},
    config::Config,
    telegram::{Delivery, TelegramClient},
};

mod catalog;
mod commands;
mod config;
mod server;
mod telegram;
mod utils;

/// Command-line arguments for the link bot.
///
/// # Examples
///
/// ```bash
/// linkbot --config linkbot.yaml
/// BOT_TOKEN=123:abc CHAT_ID=-100200 linkbot --port 8080
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Optional: without it the configuration comes from the environment
    /// and the built-in defaults.
    #[arg(short, long)]
    config: Option<String>,

    /// Listening port, overrides the configuration.
    #[arg(short, long)]
    port: Option<u16>,
}

/// Main entry point for the link bot.
///
/// 1. **Logging Setup**: `info` level by default, `RUST_LOG` overrides it
/// 2. **Configuration Loading**: YAML file, then environment variables
/// 3. **Catalog Validation**: the process stops on an invalid catalog
/// 4. **Server**: serves the HTTP routes until Ctrl-C
///
/// A missing token or default chat is only a warning: the server still
/// starts and every send reports the missing value.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting linkbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }

    let catalog = match config.catalog() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("Invalid link catalog: {}", e);
            return;
        }
    };
    info!("{} links loaded: {}", catalog.len(), catalog.keys().join(", "));

    let client = TelegramClient::new(&config.telegram);
    if !client.has_bot_token() {
        warn!("BOT_TOKEN is not configured, every send will fail");
    }
    if !client.has_default_chat() {
        warn!("CHAT_ID is not configured, only the webhook can answer");
    }

    let formatter = MessageFormatter::new(catalog.clone(), &config.formatter);
    let dispatcher = Arc::new(Dispatcher::new(catalog, formatter, Arc::new(client)));

    if let Err(e) = server::serve(&config.server.host, config.server.port, dispatcher).await {
        error!("Server stopped: {}", e);
    }
}
