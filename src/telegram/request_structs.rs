//! JSON bodies sent to the Telegram Bot API.

use serde::Serialize;

use crate::telegram::{KeyboardLayout, OutboundMessage};

/// Body of `sendMessage`.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_id: &'a str, message: &'a OutboundMessage, disable_link_preview: bool) -> Self {
        SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_api_value(),
            disable_web_page_preview: disable_link_preview,
            reply_markup: message.keyboard.as_ref().map(InlineKeyboardMarkup::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup<'a> {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton<'a> {
    pub text: &'a str,
    pub callback_data: &'a str,
}

impl<'a> From<&'a KeyboardLayout> for InlineKeyboardMarkup<'a> {
    fn from(layout: &'a KeyboardLayout) -> Self {
        let inline_keyboard = layout
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: &button.label,
                        callback_data: &button.action_key,
                    })
                    .collect()
            })
            .collect();

        InlineKeyboardMarkup { inline_keyboard }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::telegram::{KeyboardButton, ParseMode};

    #[test]
    fn test_plain_message_omits_optional_fields() {
        let message = OutboundMessage {
            text: "hello".to_owned(),
            target_chat_id: None,
            parse_mode: ParseMode::Plain,
            keyboard: None,
        };
        let body = serde_json::to_value(SendMessageRequest::new("42", &message, false)).unwrap();
        assert_eq!(
            body,
            json!({"chat_id": "42", "text": "hello", "disable_web_page_preview": false})
        );
    }

    #[test]
    fn test_keyboard_is_serialized_as_inline_keyboard() {
        let message = OutboundMessage {
            text: "<b>hi</b>".to_owned(),
            target_chat_id: Some("42".to_owned()),
            parse_mode: ParseMode::Html,
            keyboard: Some(KeyboardLayout {
                rows: vec![
                    vec![
                        KeyboardButton {
                            label: "A".to_owned(),
                            action_key: "a".to_owned(),
                        },
                        KeyboardButton {
                            label: "B".to_owned(),
                            action_key: "b".to_owned(),
                        },
                    ],
                    vec![KeyboardButton {
                        label: "Back".to_owned(),
                        action_key: "menu".to_owned(),
                    }],
                ],
            }),
        };
        let body = serde_json::to_value(SendMessageRequest::new("42", &message, true)).unwrap();
        assert_eq!(body["parse_mode"], "HTML");
        assert_eq!(body["disable_web_page_preview"], true);
        assert_eq!(
            body["reply_markup"],
            json!({"inline_keyboard": [
                [{"text": "A", "callback_data": "a"}, {"text": "B", "callback_data": "b"}],
                [{"text": "Back", "callback_data": "menu"}]
            ]})
        );
    }
}
