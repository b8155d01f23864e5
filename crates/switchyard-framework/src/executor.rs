//! Reply rendering.
//!
//! [`Reply::render`] consumes a reply and performs its channel calls. Owned
//! file streams live inside the reply, so they are dropped when rendering
//! returns, on success and on failure alike.

use futures::future::BoxFuture;
use tracing::{debug, trace};

use switchyard_core::{
    ByteStream, ChannelResult, ChatId, MessagingChannel, ParseMode, ReplyMarkup, SendOptions,
};

use crate::error::{RenderResult, ReplyError};
use crate::reply::{InputFile, Reply};

/// Upload target for file-carrying replies.
enum Upload<'a> {
    Document { filename: &'a str },
    Photo { filename: &'a str, caption: &'a str },
}

impl Reply {
    /// Renders the reply against `channel`, addressing `chat_id`.
    ///
    /// Failures propagate, except for [`Reply::DeleteMessage`] whose failures
    /// are logged and swallowed. A [`Reply::Multi`] stops at the first failing
    /// child; replies already sent stay sent.
    pub fn render<'a>(
        self,
        channel: &'a dyn MessagingChannel,
        chat_id: ChatId,
    ) -> BoxFuture<'a, RenderResult<()>> {
        Box::pin(async move {
            trace!(reply = self.kind_name(), chat_id, "Rendering reply");
            match self {
                Reply::Text {
                    content,
                    clear_keyboard,
                } => {
                    let options = SendOptions {
                        markup: clear_keyboard.then_some(ReplyMarkup::RemoveKeyboard),
                        parse_mode: None,
                    };
                    channel.send_text(chat_id, &content, options).await?;
                }
                Reply::TextEdit {
                    content,
                    message_id,
                    keyboard,
                } => {
                    channel
                        .edit_text(chat_id, message_id, &content, keyboard.as_ref())
                        .await?;
                }
                Reply::Markdown { content } => {
                    let options = SendOptions {
                        markup: None,
                        parse_mode: Some(ParseMode::MarkdownV2),
                    };
                    channel.send_text(chat_id, &content, options).await?;
                }
                Reply::Inline {
                    content,
                    keyboard,
                    use_markdown,
                } => {
                    let options = SendOptions {
                        markup: Some(ReplyMarkup::Inline(keyboard.into_inner())),
                        parse_mode: use_markdown.then_some(ParseMode::MarkdownV2),
                    };
                    channel.send_text(chat_id, &content, options).await?;
                }
                Reply::InlineEdit {
                    content,
                    keyboard,
                    message_id,
                } => {
                    if content.is_empty() {
                        channel
                            .edit_keyboard(chat_id, message_id, keyboard.get())
                            .await?;
                    } else {
                        channel
                            .edit_text(chat_id, message_id, &content, Some(keyboard.get()))
                            .await?;
                    }
                }
                Reply::File { file, filename } => {
                    upload(channel, chat_id, file, Upload::Document {
                        filename: &filename,
                    })
                    .await?;
                }
                Reply::Image {
                    file,
                    filename,
                    caption,
                } => {
                    upload(channel, chat_id, file, Upload::Photo {
                        filename: &filename,
                        caption: &caption,
                    })
                    .await?;
                }
                Reply::DeleteMessage { message_id } => {
                    if let Err(e) = channel.delete_message(chat_id, message_id).await {
                        debug!(chat_id, message_id, error = %e, "Ignoring failed message deletion");
                    }
                }
                Reply::Empty => {}
                Reply::Multi(replies) => {
                    if replies.is_empty() {
                        return Err(ReplyError::EmptyMulti.into());
                    }
                    for reply in replies {
                        reply.render(channel, chat_id).await?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// Uploads `file`, releasing it afterwards if the reply owns it.
async fn upload(
    channel: &dyn MessagingChannel,
    chat_id: ChatId,
    file: InputFile,
    target: Upload<'_>,
) -> ChannelResult<()> {
    match file {
        InputFile::Owned(mut stream) => send(channel, chat_id, &mut *stream, &target).await,
        InputFile::Shared(shared) => {
            let mut stream = shared.lock().await;
            send(channel, chat_id, &mut **stream, &target).await
        }
        InputFile::Path(path) => {
            let mut file = tokio::fs::File::open(&path).await?;
            send(channel, chat_id, &mut file, &target).await
        }
    }
}

async fn send(
    channel: &dyn MessagingChannel,
    chat_id: ChatId,
    stream: &mut ByteStream,
    target: &Upload<'_>,
) -> ChannelResult<()> {
    match target {
        Upload::Document { filename } => channel.send_document(chat_id, stream, filename).await,
        Upload::Photo { filename, caption } => {
            channel
                .send_photo(chat_id, stream, filename, caption)
                .await
        }
    }
}
