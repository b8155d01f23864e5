//! Per-request handler context.
//!
//! A fresh [`RequestContext`] is built for every dispatched request and handed
//! to the handler as its first argument. It carries the classified request,
//! the outbound channel and, when a store is configured, the per-user state
//! accessor. It is dropped once the handler's reply has been rendered.

use switchyard_core::{
    BoxedChannel, ChatId, InlineKeyboard, MessageId, MessagingChannel, Request, StoreError,
    StoreResult, User,
};

use crate::error::ReplyError;
use crate::reply::Reply;
use crate::state::UserState;

/// Everything a handler may use while serving one request.
pub struct RequestContext {
    request: Request,
    channel: BoxedChannel,
    state: Option<UserState>,
}

impl RequestContext {
    pub fn new(request: Request, channel: BoxedChannel, state: Option<UserState>) -> Self {
        Self {
            request,
            channel,
            state,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn user(&self) -> &User {
        &self.request.user
    }

    /// Chat the reply will be rendered to.
    pub fn chat_id(&self) -> ChatId {
        self.request.chat_id
    }

    /// The message the request refers to, if it can be edited or deleted.
    pub fn source_message_id(&self) -> Option<MessageId> {
        self.request.source_message_id
    }

    /// The outbound channel, for handlers that notify someone before replying.
    pub fn channel(&self) -> &dyn MessagingChannel {
        self.channel.as_ref()
    }

    /// Per-user state accessor.
    ///
    /// Fails with [`StoreError::Unavailable`] when the dispatcher has no store.
    pub fn state(&self) -> StoreResult<&UserState> {
        self.state.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Edits the source message's text, optionally replacing its keyboard.
    pub fn edit_text(
        &self,
        content: impl Into<String>,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<Reply, ReplyError> {
        let message_id = self.source_message_id().ok_or(ReplyError::NoSourceMessage)?;
        Ok(match keyboard {
            Some(keyboard) => Reply::text_edit_with_keyboard(content, message_id, keyboard),
            None => Reply::text_edit(content, message_id),
        })
    }

    /// Deletes the source message.
    pub fn delete_source(&self) -> Result<Reply, ReplyError> {
        let message_id = self.source_message_id().ok_or(ReplyError::NoSourceMessage)?;
        Ok(Reply::delete(message_id))
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request", &self.request)
            .field("has_state", &self.state.is_some())
            .finish_non_exhaustive()
    }
}
