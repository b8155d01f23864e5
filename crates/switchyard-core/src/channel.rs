//! Outbound messaging contract.
//!
//! The core never talks to a transport directly. Everything a reply can do
//! goes through a [`MessagingChannel`], which an adapter implements on top of
//! its HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::ChannelResult;

/// Chat identifier.
pub type ChatId = i64;

/// Message identifier, unique within a chat.
pub type MessageId = i64;

/// A readable byte stream handed to the channel for uploads.
pub type ByteStream = dyn AsyncRead + Send + Unpin;

/// Rich-markup modes understood by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    MarkdownV2,
    Html,
}

/// A single inline keyboard button carrying a callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// An inline keyboard: rows of callback buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Creates a keyboard from pre-arranged rows.
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Appends a row (builder pattern).
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn rows(&self) -> &[Vec<InlineButton>] {
        &self.rows
    }

    /// Total number of buttons across all rows.
    pub fn button_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the keyboard has no buttons at all.
    pub fn is_empty(&self) -> bool {
        self.button_count() == 0
    }
}

/// Markup attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Attach an inline keyboard.
    Inline(InlineKeyboard),
    /// Remove any custom reply keyboard the user currently sees.
    RemoveKeyboard,
}

/// Optional settings for [`MessagingChannel::send_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub markup: Option<ReplyMarkup>,
    pub parse_mode: Option<ParseMode>,
}

/// Reference to a message the channel has sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// An entry of the bot's command menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    /// Command name without the leading slash.
    pub command: String,
    pub description: String,
}

/// The outbound messaging capability consumed by replies and handlers.
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Sends a text message.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChannelResult<MessageRef>;

    /// Replaces the text (and optionally the inline keyboard) of a message.
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> ChannelResult<()>;

    /// Replaces only the inline keyboard of a message.
    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: &InlineKeyboard,
    ) -> ChannelResult<()>;

    /// Deletes a message.
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> ChannelResult<()>;

    /// Uploads a document read from `stream`.
    async fn send_document(
        &self,
        chat_id: ChatId,
        stream: &mut ByteStream,
        filename: &str,
    ) -> ChannelResult<()>;

    /// Uploads a photo read from `stream`.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        stream: &mut ByteStream,
        filename: &str,
        caption: &str,
    ) -> ChannelResult<()>;

    /// Publishes the command menu for a language.
    ///
    /// Channels without menu support can keep the default, which does nothing.
    async fn set_commands(&self, language: &str, commands: &[BotCommand]) -> ChannelResult<()> {
        debug!(
            language,
            count = commands.len(),
            "Channel does not support command menus, skipping"
        );
        Ok(())
    }
}

/// A shared, type-erased messaging channel.
pub type BoxedChannel = Arc<dyn MessagingChannel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_button_count() {
        let keyboard = InlineKeyboard::default()
            .row(vec![
                InlineButton::new("-", "/counter/decrement"),
                InlineButton::new("+", "/counter/increment"),
            ])
            .row(vec![InlineButton::new("reset", "/counter/reset")]);
        assert_eq!(keyboard.button_count(), 3);
        assert_eq!(keyboard.rows().len(), 2);
        assert!(!keyboard.is_empty());
    }

    #[test]
    fn test_keyboard_with_empty_rows_is_empty() {
        let keyboard = InlineKeyboard::new(vec![vec![], vec![]]);
        assert!(keyboard.is_empty());
    }
}
