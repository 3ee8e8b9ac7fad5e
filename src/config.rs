//! Configuration structures for the link bot.
//!
//! The configuration is layered with `figment`, from lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file
//! 3. `LINKBOT_` prefixed environment variables, sections separated by `__`
//! 4. The historical deployment variables `BOT_TOKEN`, `CHAT_ID` and `PORT`
//!
//! # Configuration File Format
//!
//! ```yaml
//! server:
//!   host: "0.0.0.0"
//!   port: 10000
//!
//! telegram:
//!   # Bot token given by @BotFather
//!   bot_token: "123456:ABC-DEF"
//!   # Chat used by the direct send endpoints
//!   chat_id: "-1001234567890"
//!   api_url: "https://api.telegram.org"
//!   timeout_secs: 10
//!   disable_link_preview: false
//!
//! formatter:
//!   # html | plain
//!   parse_mode: html
//!   # Attach an inline keyboard to every message
//!   interactive: false
//!
//! # Leave empty to use the built-in catalog
//! links:
//!   - key: wiki
//!     name: "📚 Wiki"
//!     description: "Team wiki"
//!     url: "https://wiki.example.com"
//! ```

use std::path::Path;

use anyhow::bail;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer};

use crate::{
    catalog::{CatalogError, LinkCatalog, LinkEntry},
    telegram::ParseMode,
};

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 10000;
/// Upper bound of a Bot API call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Root configuration structure.
///
/// Loaded once at startup and never mutated: the parts the dispatcher and
/// the delivery client need are passed to them explicitly.
#[derive(Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: Server,
    /// Telegram credentials and client settings
    #[serde(default)]
    pub telegram: Telegram,
    /// Message rendering settings
    #[serde(default)]
    pub formatter: Formatter,
    /// Link catalog, in display order
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

/// HTTP server configuration.
#[derive(Deserialize)]
#[serde(default)]
pub struct Server {
    /// Listening address
    pub host: String,
    /// Listening port
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            host: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Telegram Bot API configuration.
#[derive(Deserialize)]
#[serde(default)]
pub struct Telegram {
    /// Bot authorization token, required to send anything
    #[serde(deserialize_with = "lenient_string")]
    pub bot_token: Option<String>,

    /// Default target chat.
    ///
    /// Required unless every caller gives an explicit chat, which is only the
    /// case for the webhook.
    #[serde(deserialize_with = "lenient_string")]
    pub chat_id: Option<String>,

    /// Bot API base url.
    pub api_url: String,

    /// Timeout of a `sendMessage` call, in seconds.
    pub timeout_secs: u64,

    /// Ask Telegram not to render link previews.
    pub disable_link_preview: bool,
}

impl Default for Telegram {
    fn default() -> Self {
        Telegram {
            bot_token: None,
            chat_id: None,
            api_url: DEFAULT_API_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            disable_link_preview: false,
        }
    }
}

/// Message rendering configuration.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Formatter {
    /// Rendering mode applied to every message
    pub parse_mode: ParseMode,
    /// Attach the links keyboard to every message
    pub interactive: bool,
}

impl Config {
    /// Loads the configuration from the optional YAML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is given but missing, or if a value has
    /// the wrong type.
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !Path::new(path).is_file() {
                bail!("config file {} not found", path);
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config = figment
            .merge(Env::prefixed("LINKBOT_").split("__"))
            .merge(
                Env::raw()
                    .only(&["BOT_TOKEN", "CHAT_ID", "PORT"])
                    .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
                        "bot_token" => "telegram.bot_token".into(),
                        "chat_id" => "telegram.chat_id".into(),
                        "port" => "server.port".into(),
                        other => other.to_owned().into(),
                    }),
            )
            .extract()?;

        Ok(config)
    }

    /// Builds the link catalog, falling back to the built-in one when no link is configured.
    pub fn catalog(&self) -> Result<LinkCatalog, CatalogError> {
        if self.links.is_empty() {
            return Ok(LinkCatalog::default());
        }
        LinkCatalog::new(self.links.clone())
    }
}

/// Accepts strings and integers: chat ids coming from the environment look like numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(value) => value,
        Raw::Signed(value) => value.to_string(),
        Raw::Unsigned(value) => value.to_string(),
    }))
}
