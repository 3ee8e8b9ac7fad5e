//! Command parsing.
//!
//! This module converts the text of a chat message into a [`Command`]. Only
//! messages whose first word is a known `/command` produce one: every other
//! text is ignored so the bot stays silent on regular conversation.

use log::debug;

use crate::catalog::LinkCatalog;

/// A recognized bot command.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Command {
    /// `/start`: greeting
    Start,
    /// `/help`: list of every command
    Help,
    /// `/all`: every link in one message
    All,
    /// `/menu`: command listing, same content as help
    Menu,
    /// `/<key>`: a single catalog link
    ///
    /// # Fields
    ///
    /// * `String` - Catalog key
    Link(String),
}

impl Command {
    /// Parses a message text into a Command.
    ///
    /// The first whitespace separated word must start with `/`. A trailing
    /// `@botname`, added by Telegram in group chats, is dropped.
    ///
    /// # Returns
    ///
    /// * `Some(Command)` - If the word is a built-in command or a catalog key
    /// * `None` - For any other text, including `/<key>` with an unknown key
    ///
    /// # Examples
    ///
    /// ```
    /// let catalog = LinkCatalog::default();
    /// assert_eq!(Command::parse("/help", &catalog), Some(Command::Help));
    /// assert_eq!(Command::parse("hello", &catalog), None);
    /// ```
    pub fn parse(text: &str, catalog: &LinkCatalog) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or_default();

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "all" => Command::All,
            "menu" => Command::Menu,
            key if catalog.lookup(key).is_some() => Command::Link(key.to_owned()),
            _ => {
                debug!("ignoring unknown command {}", token);
                return None;
            }
        };

        Some(command)
    }

    /// Command name as typed in the chat, used in logs.
    pub fn name(&self) -> String {
        match self {
            Command::Start => "/start".to_owned(),
            Command::Help => "/help".to_owned(),
            Command::All => "/all".to_owned(),
            Command::Menu => "/menu".to_owned(),
            Command::Link(key) => format!("/{}", key),
        }
    }
}
