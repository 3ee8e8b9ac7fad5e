//! Link catalog.
//!
//! The catalog is the fixed set of links the bot can send. Each [`LinkEntry`]
//! is addressed by a short key which doubles as the chat command (`/<key>`).
//! The catalog is built once at startup and never mutated afterwards.
//!
//! Iteration order is the insertion order of the configuration: it defines
//! the order of the "all links" message, the help text and the keyboard.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

/// Commands handled by the bot itself. Catalog keys cannot shadow them.
pub const RESERVED_KEYS: [&str; 4] = ["start", "help", "all", "menu"];
/// Longest command Telegram accepts.
pub const MAX_KEY_LEN: usize = 32;

/// A single link of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkEntry {
    /// Unique key, also used as the `/<key>` command
    pub key: String,
    /// Display name shown as the message title
    pub name: String,
    /// One line description, also used in the help text
    pub description: String,
    /// Target URL
    pub url: String,
}

impl LinkEntry {
    pub fn new(key: &str, name: &str, description: &str, url: &str) -> Self {
        LinkEntry {
            key: key.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            url: url.to_owned(),
        }
    }
}

/// Errors raised while building a [`LinkCatalog`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The key is not a valid Telegram command name
    #[error("invalid link key '{0}': keys must be 1 to 32 ASCII letters, digits or '_'")]
    InvalidKey(String),
    /// The key collides with a built-in command
    #[error("link key '{0}' is reserved for a built-in command")]
    ReservedKey(String),
    /// The key appears more than once
    #[error("duplicate link key '{0}'")]
    DuplicateKey(String),
}

/// Ordered, read-only collection of [`LinkEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCatalog {
    entries: Vec<LinkEntry>,
}

impl LinkCatalog {
    /// Builds a catalog, validating every key.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on the first empty, malformed, reserved or
    /// duplicated key.
    pub fn new(entries: Vec<LinkEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();

        for entry in &entries {
            let key = entry.key.as_str();
            if !is_command_name(key) {
                return Err(CatalogError::InvalidKey(key.to_owned()));
            }
            if RESERVED_KEYS.contains(&key) {
                return Err(CatalogError::ReservedKey(key.to_owned()));
            }
            if !seen.insert(key) {
                return Err(CatalogError::DuplicateKey(key.to_owned()));
            }
        }

        Ok(LinkCatalog { entries })
    }

    /// Returns the entry registered under `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<&LinkEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Returns every entry in insertion order.
    pub fn all(&self) -> &[LinkEntry] {
        &self.entries
    }

    /// Returns every key in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Telegram commands are made of latin letters, digits and underscores.
fn is_command_name(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Default for LinkCatalog {
    /// The spreadsheets shared by the team, used when the configuration lists no link.
    fn default() -> Self {
        LinkCatalog {
            entries: vec![
                LinkEntry::new(
                    "supplies",
                    "📦 Supplies data",
                    "Consumable supplies data",
                    "https://docs.google.com/spreadsheets/d/1XH-SB5At8kCqez8aRS3iRoPpW0EhcHlswunjieg2j88/edit?gid=1324562956#gid=1324562956",
                ),
                LinkEntry::new(
                    "database",
                    "📊 Contractors and goods",
                    "Contractors and goods database",
                    "https://docs.google.com/spreadsheets/d/1a4kobUwHwEgXX2NztjpyqsG0pfI-bwABMApWHtalBSE/edit?gid=1090155469#gid=1090155469",
                ),
                LinkEntry::new(
                    "goods",
                    "🛒 Operational requests",
                    "Operational requests data",
                    "https://docs.google.com/spreadsheets/d/1KdwehGZScK2xq938UT9JZxceviCxCzJ7xaaICISj6lE/edit?resourcekey=&gid=259871996#gid=259871996",
                ),
                LinkEntry::new(
                    "supports",
                    "🔧 Service providers",
                    "Service providers database",
                    "https://docs.google.com/spreadsheets/d/11F9ZCf-3t6651Ir_X1JZ13U6-TwuJjUaIB4nKPHGsVs/edit?usp=sharing",
                ),
            ],
        }
    }
}
