//! Request classification.
//!
//! [`Request::classify`] turns a raw [`Update`] into one of three request
//! kinds, each eligible for a different family of routes:
//!
//! | Update shape                              | Kind                        |
//! |-------------------------------------------|-----------------------------|
//! | text message starting with `/`            | [`RequestKind::TextCommand`] |
//! | any other non-blank text message          | [`RequestKind::FreeText`]    |
//! | callback query with a data payload        | [`RequestKind::Callback`]    |
//!
//! Anything else, or an update without an originating user, is
//! [`Unclassifiable`] and gets dropped by the dispatcher.

use std::fmt;

use crate::channel::{ChatId, MessageId};
use crate::update::{Update, User};

/// The kind of request an update represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// A slash command typed as a text message (`/start`, `/mail a b`).
    TextCommand,
    /// A payload attached to an inline keyboard button (`/phone/7`).
    Callback,
    /// Free text that is not a command.
    FreeText,
}

impl RequestKind {
    /// Returns the kind as a static string, for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextCommand => "text_command",
            Self::Callback => "callback",
            Self::FreeText => "free_text",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an update could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unclassifiable {
    /// No text body and no callback payload.
    NoPayload,
    /// A payload was present but no originating user could be resolved.
    NoUser,
}

impl fmt::Display for Unclassifiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPayload => f.write_str("update carries no routable payload"),
            Self::NoUser => f.write_str("update has no originating user"),
        }
    }
}

/// A classified inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub update_id: i64,
    pub kind: RequestKind,
    /// Command text, callback path, or free text, unmodified.
    pub payload: String,
    pub user: User,
    /// Where replies go: the originating chat, or the user's private chat.
    pub chat_id: ChatId,
    /// The message the update refers to, when it can be edited or deleted.
    pub source_message_id: Option<MessageId>,
}

impl Request {
    /// Classifies an update.
    pub fn classify(update: &Update) -> Result<Self, Unclassifiable> {
        let (kind, payload) = Self::payload_of(update).ok_or(Unclassifiable::NoPayload)?;
        let user = update.user().cloned().ok_or(Unclassifiable::NoUser)?;
        let chat_id = update.chat_id().unwrap_or(user.id);

        Ok(Self {
            update_id: update.update_id,
            kind,
            payload: payload.to_string(),
            user,
            chat_id,
            source_message_id: update.message_id(),
        })
    }

    fn payload_of(update: &Update) -> Option<(RequestKind, &str)> {
        if let Some(text) = update.message.as_ref().and_then(|m| m.text.as_deref())
            && !text.trim().is_empty()
        {
            let kind = if text.trim_start().starts_with('/') {
                RequestKind::TextCommand
            } else {
                RequestKind::FreeText
            };
            return Some((kind, text));
        }

        update
            .callback_query
            .as_ref()
            .and_then(|c| c.data.as_deref())
            .map(|data| (RequestKind::Callback, data))
    }
}
