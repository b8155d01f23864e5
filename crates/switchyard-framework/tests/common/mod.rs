//! Shared fixtures for the dispatch integration tests.

#![allow(dead_code)]

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, ReadBuf};

use switchyard_core::{
    ByteStream, ChannelError, ChannelResult, ChatId, InlineKeyboard, MessageId, MessageRef,
    MessagingChannel, SendOptions,
};

/// One outbound call, as seen by the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: ChatId, text: String, options: SendOptions },
    EditText { message_id: MessageId, text: String, keyboard: Option<InlineKeyboard> },
    EditKeyboard { message_id: MessageId },
    Delete { message_id: MessageId },
    Document { filename: String },
    Photo { filename: String, caption: String },
}

/// Records every call and can be told to fail specific operations.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Sent>>,
    fail_text: Mutex<Option<ChannelError>>,
    fail_upload: Mutex<Option<ChannelError>>,
    fail_delete: Mutex<Option<ChannelError>>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } | Sent::EditText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail_text(&self, err: ChannelError) {
        *self.fail_text.lock() = Some(err);
    }

    pub fn fail_upload(&self, err: ChannelError) {
        *self.fail_upload.lock() = Some(err);
    }

    pub fn fail_delete(&self, err: ChannelError) {
        *self.fail_delete.lock() = Some(err);
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().push(sent);
    }
}

#[async_trait]
impl MessagingChannel for RecordingChannel {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChannelResult<MessageRef> {
        if let Some(err) = self.fail_text.lock().clone() {
            return Err(err);
        }
        self.push(Sent::Text {
            chat_id,
            text: text.to_string(),
            options,
        });
        Ok(MessageRef {
            chat_id,
            message_id: self.sent.lock().len() as MessageId,
        })
    }

    async fn edit_text(
        &self,
        _chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> ChannelResult<()> {
        self.push(Sent::EditText {
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_keyboard(
        &self,
        _chat_id: ChatId,
        message_id: MessageId,
        _keyboard: &InlineKeyboard,
    ) -> ChannelResult<()> {
        self.push(Sent::EditKeyboard { message_id });
        Ok(())
    }

    async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> ChannelResult<()> {
        self.push(Sent::Delete { message_id });
        match self.fail_delete.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send_document(
        &self,
        _chat_id: ChatId,
        _stream: &mut ByteStream,
        filename: &str,
    ) -> ChannelResult<()> {
        if let Some(err) = self.fail_upload.lock().clone() {
            return Err(err);
        }
        self.push(Sent::Document {
            filename: filename.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat_id: ChatId,
        _stream: &mut ByteStream,
        filename: &str,
        caption: &str,
    ) -> ChannelResult<()> {
        if let Some(err) = self.fail_upload.lock().clone() {
            return Err(err);
        }
        self.push(Sent::Photo {
            filename: filename.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

/// A reader that flags when it is dropped.
pub struct TrackedStream {
    data: std::io::Cursor<Vec<u8>>,
    closed: Arc<AtomicBool>,
}

impl TrackedStream {
    pub fn new(data: &[u8]) -> (Self, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let stream = Self {
            data: std::io::Cursor::new(data.to_vec()),
            closed: Arc::clone(&closed),
        };
        (stream, closed)
    }
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.data).poll_read(cx, buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub fn is_closed(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}
