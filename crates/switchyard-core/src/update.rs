//! Inbound update model.
//!
//! The transport hands the core an already-parsed [`Update`]. Field names
//! follow the Telegram Bot API so a JSON payload can be deserialized straight
//! into these types; unknown fields are ignored.

use serde::Deserialize;

use crate::channel::{ChatId, MessageId};

/// The user who triggered an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Whether the sender is a bot account.
    #[serde(default)]
    pub is_bot: bool,
    /// First name (always present on the wire, may be empty in tests).
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl User {
    /// Creates a user with only an identifier, mostly useful in tests.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// The chat a message belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    /// `private`, `group`, `supergroup` or `channel`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The message carrying the pressed keyboard, when still available.
    #[serde(default)]
    pub message: Option<Message>,
    /// The callback payload attached to the button.
    #[serde(default)]
    pub data: Option<String>,
}

/// An inline-mode query typed after the bot's username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub query: String,
}

/// One inbound update.
///
/// At most one of the optional payloads is expected to be set, but the
/// classifier does not rely on that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
}

impl Update {
    /// Builds a text-message update, mostly useful in tests.
    pub fn text(
        update_id: i64,
        user: User,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Self {
        Self {
            update_id,
            message: Some(Message {
                message_id,
                from: Some(user),
                chat: Chat {
                    id: chat_id,
                    kind: Some("private".to_string()),
                },
                text: Some(text.to_string()),
            }),
            ..Default::default()
        }
    }

    /// Builds a callback-query update pointing at `message_id`, mostly useful in tests.
    pub fn callback(
        update_id: i64,
        user: User,
        chat_id: ChatId,
        message_id: MessageId,
        data: &str,
    ) -> Self {
        Self {
            update_id,
            callback_query: Some(CallbackQuery {
                id: update_id.to_string(),
                from: user,
                message: Some(Message {
                    message_id,
                    from: None,
                    chat: Chat {
                        id: chat_id,
                        kind: Some("private".to_string()),
                    },
                    text: None,
                }),
                data: Some(data.to_string()),
            }),
            ..Default::default()
        }
    }

    /// Returns `true` if the update carries a text message.
    pub fn is_text_message(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.text.is_some())
    }

    /// Returns `true` if the update is an inline-mode query.
    pub fn is_inline_query(&self) -> bool {
        self.inline_query.is_some()
    }

    /// Resolves the originating user.
    ///
    /// Precedence: message sender, then callback sender, then inline-query sender.
    pub fn user(&self) -> Option<&User> {
        if let Some(user) = self.message.as_ref().and_then(|m| m.from.as_ref()) {
            return Some(user);
        }
        if let Some(callback) = &self.callback_query {
            return Some(&callback.from);
        }
        self.inline_query.as_ref().map(|q| &q.from)
    }

    /// Returns the id of the message this update refers to, if it can be
    /// edited or deleted: the message itself, or the message behind a callback.
    pub fn message_id(&self) -> Option<MessageId> {
        if let Some(message) = &self.message {
            return Some(message.message_id);
        }
        self.callback_query
            .as_ref()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.message_id)
    }

    /// Returns the chat the update originates from, if any.
    pub fn chat_id(&self) -> Option<ChatId> {
        if let Some(message) = &self.message {
            return Some(message.chat.id);
        }
        self.callback_query
            .as_ref()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.chat.id)
    }

    /// Short name of the update shape, for logging.
    pub fn kind_name(&self) -> &'static str {
        if self.message.is_some() {
            "message"
        } else if self.callback_query.is_some() {
            "callback_query"
        } else if self.inline_query.is_some() {
            "inline_query"
        } else {
            "unknown"
        }
    }
}
