//! Unified error types for the Switchyard core.
//!
//! Only the failures of the two external collaborators live here: the
//! outbound messaging channel and the key-value store. Routing and dispatch
//! errors are defined in `switchyard-framework`.

use thiserror::Error;

use crate::channel::{ChatId, MessageId};

// =============================================================================
// Channel Errors
// =============================================================================

/// Errors reported by a [`MessagingChannel`](crate::MessagingChannel).
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    /// The target message exists but can no longer be edited.
    #[error("message {message_id} in chat {chat_id} cannot be edited")]
    MessageNotModifiable {
        /// Chat holding the message.
        chat_id: ChatId,
        /// The message that was targeted.
        message_id: MessageId,
    },

    /// The target message does not exist (or was already deleted).
    #[error("message {message_id} not found in chat {chat_id}")]
    MessageNotFound {
        /// Chat that was searched.
        chat_id: ChatId,
        /// The missing message.
        message_id: MessageId,
    },

    /// The bot lacks permission for the requested operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Reading the outbound payload failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other transport-level failure.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors reported by a [`KeyValueStore`](crate::KeyValueStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Keys must contain at least one non-whitespace character.
    #[error("key must not be empty")]
    EmptyKey,

    /// No store was configured for this dispatcher.
    #[error("no key-value store configured")]
    Unavailable,

    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
