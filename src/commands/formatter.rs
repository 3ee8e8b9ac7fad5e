//! Message formatters for bot commands.
//!
//! This module renders catalog entries and the static texts into
//! [`OutboundMessage`]s. Every message uses the single configured
//! [`ParseMode`]: in HTML mode all catalog text is escaped, in plain mode it
//! is sent verbatim.

use std::sync::Arc;

use crate::{
    catalog::{LinkCatalog, LinkEntry},
    config::Formatter,
    telegram::{KeyboardButton, KeyboardLayout, OutboundMessage, ParseMode},
    utils::escape_html,
};

const ALL_BANNER: &str = "📋 Available links:";
const HELP_BANNER: &str = "🤖 Links bot";
const HELP_COMMANDS_TITLE: &str = "📋 Commands:";
const HELP_FOOTER: &str = "⚡ Send a command in the chat and the bot replies with the link.";
const ALL_COMMAND_DESCRIPTION: &str = "All links at once";
const HELP_COMMAND_DESCRIPTION: &str = "This help";
const BACK_LABEL: &str = "⬅️ Back";
/// Action of the back button, re-opens the command listing
pub const BACK_ACTION: &str = "menu";
const BUTTONS_PER_ROW: usize = 2;

/// Renders the bot messages.
///
/// # Examples
///
/// ```
/// let formatter = MessageFormatter::new(Arc::new(LinkCatalog::default()), &Formatter::default());
/// let message = formatter.format_all();
/// assert!(message.text.starts_with("📋"));
/// ```
pub struct MessageFormatter {
    catalog: Arc<LinkCatalog>,
    parse_mode: ParseMode,
    /// Attach the links keyboard to every message
    interactive: bool,
}

impl MessageFormatter {
    pub fn new(catalog: Arc<LinkCatalog>, settings: &Formatter) -> Self {
        MessageFormatter {
            catalog,
            parse_mode: settings.parse_mode,
            interactive: settings.interactive,
        }
    }

    /// Formats a single link: title, description and url.
    pub fn format_entry(&self, entry: &LinkEntry) -> OutboundMessage {
        let title = match self.parse_mode {
            ParseMode::Html => format!("<b>{}</b>", escape_html(&entry.name)),
            ParseMode::Plain => entry.name.clone(),
        };

        self.message(format!(
            "{}\n\n{}\n\n🔗 {}",
            title,
            self.escape(&entry.description),
            self.escape(&entry.url)
        ))
    }

    /// Formats every link of the catalog, in catalog order.
    pub fn format_all(&self) -> OutboundMessage {
        if self.catalog.is_empty() {
            return self.message(ALL_BANNER.to_owned());
        }

        let entries = self
            .catalog
            .all()
            .iter()
            .map(|entry| {
                format!(
                    "• {}\n  {}\n  {}",
                    self.escape(&entry.name),
                    self.escape(&entry.description),
                    self.escape(&entry.url)
                )
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        self.message(format!("{}\n\n{}", ALL_BANNER, entries))
    }

    /// Formats the help message.
    ///
    /// One line per catalog entry, then the `/all` and `/help` lines. The
    /// listing follows the catalog so new links show up without editing it.
    pub fn format_help(&self) -> OutboundMessage {
        let commands = self
            .catalog
            .all()
            .iter()
            .map(|entry| (self.escape(&entry.key), self.escape(&entry.description)))
            .chain([
                ("all".to_owned(), ALL_COMMAND_DESCRIPTION.to_owned()),
                ("help".to_owned(), HELP_COMMAND_DESCRIPTION.to_owned()),
            ])
            .map(|(command, description)| format!("• /{} - {}", command, description))
            .collect::<Vec<String>>()
            .join("\n");

        self.message(format!(
            "{}\n\n{}\n{}\n\n{}",
            HELP_BANNER, HELP_COMMANDS_TITLE, commands, HELP_FOOTER
        ))
    }

    /// Formats the greeting sent on `/start`.
    pub fn format_welcome(&self) -> OutboundMessage {
        self.message(
            "👋 Welcome!\n\n\
            🤖 I give you quick access to the team links.\n\n\
            Send /help to see every available command."
                .to_owned(),
        )
    }

    /// Builds the links keyboard: two links per row, then the back button.
    pub fn keyboard(&self) -> KeyboardLayout {
        let mut rows = self
            .catalog
            .all()
            .chunks(BUTTONS_PER_ROW)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|entry| KeyboardButton {
                        label: entry.name.clone(),
                        action_key: entry.key.clone(),
                    })
                    .collect::<Vec<KeyboardButton>>()
            })
            .collect::<Vec<Vec<KeyboardButton>>>();

        rows.push(vec![KeyboardButton {
            label: BACK_LABEL.to_owned(),
            action_key: BACK_ACTION.to_owned(),
        }]);

        KeyboardLayout { rows }
    }

    fn escape(&self, text: &str) -> String {
        match self.parse_mode {
            ParseMode::Html => escape_html(text),
            ParseMode::Plain => text.to_owned(),
        }
    }

    fn message(&self, text: String) -> OutboundMessage {
        OutboundMessage {
            text,
            target_chat_id: None,
            parse_mode: self.parse_mode,
            keyboard: self.interactive.then(|| self.keyboard()),
        }
    }
}
