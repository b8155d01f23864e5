//! A recording messaging channel for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;

use switchyard_core::{
    BotCommand, ByteStream, ChannelError, ChannelResult, ChatId, InlineKeyboard, MessageId,
    MessageRef, MessagingChannel, SendOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendText {
        chat_id: ChatId,
        text: String,
        options: SendOptions,
    },
    EditText {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    EditKeyboard {
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: InlineKeyboard,
    },
    DeleteMessage {
        chat_id: ChatId,
        message_id: MessageId,
    },
    SendDocument {
        chat_id: ChatId,
        filename: String,
        bytes: Vec<u8>,
    },
    SendPhoto {
        chat_id: ChatId,
        filename: String,
        caption: String,
        bytes: Vec<u8>,
    },
    SetCommands {
        language: String,
        commands: Vec<BotCommand>,
    },
}

#[derive(Default)]
struct Failures {
    send: Option<ChannelError>,
    edit: Option<ChannelError>,
    delete: Option<ChannelError>,
}

#[derive(Default)]
pub struct MockChannel {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Failures>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn fail_sends(&self, err: ChannelError) {
        self.failures.lock().send = Some(err);
    }

    pub fn fail_edits(&self, err: ChannelError) {
        self.failures.lock().edit = Some(err);
    }

    pub fn fail_deletes(&self, err: ChannelError) {
        self.failures.lock().delete = Some(err);
    }

    fn record(&self, call: Call, failure: Option<ChannelError>) -> ChannelResult<()> {
        self.calls.lock().push(call);
        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl MessagingChannel for MockChannel {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> ChannelResult<MessageRef> {
        let failure = self.failures.lock().send.clone();
        let call = Call::SendText {
            chat_id,
            text: text.to_string(),
            options,
        };
        self.record(call, failure)?;
        let message_id = self.calls.lock().len() as MessageId;
        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> ChannelResult<()> {
        let failure = self.failures.lock().edit.clone();
        let call = Call::EditText {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        };
        self.record(call, failure)
    }

    async fn edit_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        keyboard: &InlineKeyboard,
    ) -> ChannelResult<()> {
        let failure = self.failures.lock().edit.clone();
        let call = Call::EditKeyboard {
            chat_id,
            message_id,
            keyboard: keyboard.clone(),
        };
        self.record(call, failure)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> ChannelResult<()> {
        let failure = self.failures.lock().delete.clone();
        self.record(
            Call::DeleteMessage {
                chat_id,
                message_id,
            },
            failure,
        )
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        stream: &mut ByteStream,
        filename: &str,
    ) -> ChannelResult<()> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).await?;
        let failure = self.failures.lock().send.clone();
        let call = Call::SendDocument {
            chat_id,
            filename: filename.to_string(),
            bytes,
        };
        self.record(call, failure)
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        stream: &mut ByteStream,
        filename: &str,
        caption: &str,
    ) -> ChannelResult<()> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).await?;
        let failure = self.failures.lock().send.clone();
        let call = Call::SendPhoto {
            chat_id,
            filename: filename.to_string(),
            caption: caption.to_string(),
            bytes,
        };
        self.record(call, failure)
    }

    async fn set_commands(&self, language: &str, commands: &[BotCommand]) -> ChannelResult<()> {
        self.record(
            Call::SetCommands {
                language: language.to_string(),
                commands: commands.to_vec(),
            },
            None,
        )
    }
}
