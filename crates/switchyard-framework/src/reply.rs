//! Handler replies.
//!
//! Every handler returns exactly one [`Reply`]. The set of variants is closed;
//! rendering lives in [`executor`](crate::executor).
//!
//! Inline replies carry a [`NonEmptyKeyboard`], so a keyboard without buttons
//! is rejected when the reply is built rather than when it is sent.
//!
//! ```rust,ignore
//! let keyboard = InlineKeyboard::default().row(vec![
//!     InlineButton::new("-", "/counter/decrement"),
//!     InlineButton::new("+", "/counter/increment"),
//! ]);
//! Reply::inline(format!("Counter: {value}"), keyboard)?
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::Mutex;

use switchyard_core::{ByteStream, InlineKeyboard, MessageId};

use crate::error::ReplyError;

/// An inline keyboard with at least one button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyKeyboard(InlineKeyboard);

impl NonEmptyKeyboard {
    pub fn new(keyboard: InlineKeyboard) -> Result<Self, ReplyError> {
        if keyboard.is_empty() {
            return Err(ReplyError::EmptyKeyboard);
        }
        Ok(Self(keyboard))
    }

    pub fn get(&self) -> &InlineKeyboard {
        &self.0
    }

    pub fn into_inner(self) -> InlineKeyboard {
        self.0
    }
}

impl TryFrom<InlineKeyboard> for NonEmptyKeyboard {
    type Error = ReplyError;

    fn try_from(keyboard: InlineKeyboard) -> Result<Self, Self::Error> {
        Self::new(keyboard)
    }
}

/// A stream that several owners may hold.
pub type SharedStream = Arc<Mutex<Box<ByteStream>>>;

/// The payload of a file or image reply.
pub enum InputFile {
    /// Owned by the reply; dropped as soon as rendering ends, however it ends.
    Owned(Box<ByteStream>),
    /// Owned by the caller; the reply only borrows it while uploading.
    Shared(SharedStream),
    /// Opened at render time and closed afterwards.
    Path(PathBuf),
}

impl InputFile {
    /// Wraps a reader the reply takes ownership of.
    pub fn owned<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::Owned(Box::new(reader))
    }

    /// Uses a caller-owned stream without taking ownership.
    pub fn shared(stream: SharedStream) -> Self {
        Self::Shared(stream)
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Returns `true` if rendering releases the stream.
    pub fn owns_stream(&self) -> bool {
        !matches!(self, Self::Shared(_))
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned(_) => f.write_str("InputFile::Owned(..)"),
            Self::Shared(_) => f.write_str("InputFile::Shared(..)"),
            Self::Path(path) => f.debug_tuple("InputFile::Path").field(path).finish(),
        }
    }
}

/// What a handler asks the framework to do.
#[derive(Debug)]
pub enum Reply {
    /// Send a plain message, optionally removing the reply keyboard.
    Text {
        content: String,
        clear_keyboard: bool,
    },
    /// Edit a message's text in place.
    TextEdit {
        content: String,
        message_id: MessageId,
        keyboard: Option<InlineKeyboard>,
    },
    /// Send a MarkdownV2 message.
    Markdown { content: String },
    /// Send a message with an inline keyboard.
    Inline {
        content: String,
        keyboard: NonEmptyKeyboard,
        use_markdown: bool,
    },
    /// Replace the keyboard (and text, when non-empty) of a message.
    InlineEdit {
        content: String,
        keyboard: NonEmptyKeyboard,
        message_id: MessageId,
    },
    /// Upload a document.
    File { file: InputFile, filename: String },
    /// Upload a photo.
    Image {
        file: InputFile,
        filename: String,
        caption: String,
    },
    /// Delete a message, ignoring failures.
    DeleteMessage { message_id: MessageId },
    /// Do nothing.
    Empty,
    /// Render each reply in order, stopping at the first failure.
    Multi(Vec<Reply>),
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            clear_keyboard: false,
        }
    }

    /// A plain message that also removes the user's reply keyboard.
    pub fn text_clear_keyboard(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            clear_keyboard: true,
        }
    }

    pub fn text_edit(content: impl Into<String>, message_id: MessageId) -> Self {
        Self::TextEdit {
            content: content.into(),
            message_id,
            keyboard: None,
        }
    }

    pub fn text_edit_with_keyboard(
        content: impl Into<String>,
        message_id: MessageId,
        keyboard: InlineKeyboard,
    ) -> Self {
        Self::TextEdit {
            content: content.into(),
            message_id,
            keyboard: Some(keyboard),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Markdown {
            content: content.into(),
        }
    }

    pub fn inline(content: impl Into<String>, keyboard: InlineKeyboard) -> Result<Self, ReplyError> {
        Ok(Self::Inline {
            content: content.into(),
            keyboard: NonEmptyKeyboard::new(keyboard)?,
            use_markdown: false,
        })
    }

    pub fn inline_markdown(
        content: impl Into<String>,
        keyboard: InlineKeyboard,
    ) -> Result<Self, ReplyError> {
        Ok(Self::Inline {
            content: content.into(),
            keyboard: NonEmptyKeyboard::new(keyboard)?,
            use_markdown: true,
        })
    }

    pub fn inline_edit(
        content: impl Into<String>,
        keyboard: InlineKeyboard,
        message_id: MessageId,
    ) -> Result<Self, ReplyError> {
        Ok(Self::InlineEdit {
            content: content.into(),
            keyboard: NonEmptyKeyboard::new(keyboard)?,
            message_id,
        })
    }

    pub fn file(file: InputFile, filename: impl Into<String>) -> Self {
        Self::File {
            file,
            filename: filename.into(),
        }
    }

    /// A document read from disk, named after the file.
    pub fn file_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::file(InputFile::path(path), file_name_of(path))
    }

    pub fn image(file: InputFile, filename: impl Into<String>, caption: impl Into<String>) -> Self {
        Self::Image {
            file,
            filename: filename.into(),
            caption: caption.into(),
        }
    }

    /// A photo read from disk, named after the file.
    pub fn image_from_path(path: impl AsRef<Path>, caption: impl Into<String>) -> Self {
        let path = path.as_ref();
        Self::image(InputFile::path(path), file_name_of(path), caption)
    }

    pub fn delete(message_id: MessageId) -> Self {
        Self::DeleteMessage { message_id }
    }

    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn multi(replies: Vec<Reply>) -> Result<Self, ReplyError> {
        if replies.is_empty() {
            return Err(ReplyError::EmptyMulti);
        }
        Ok(Self::Multi(replies))
    }

    /// Short variant name, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::TextEdit { .. } => "text_edit",
            Self::Markdown { .. } => "markdown",
            Self::Inline { .. } => "inline",
            Self::InlineEdit { .. } => "inline_edit",
            Self::File { .. } => "file",
            Self::Image { .. } => "image",
            Self::DeleteMessage { .. } => "delete_message",
            Self::Empty => "empty",
            Self::Multi(_) => "multi",
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}
