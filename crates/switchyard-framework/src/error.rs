//! Error types for the Switchyard framework.

use thiserror::Error;

use switchyard_core::{ChannelError, StoreError};

use crate::binder::ParamType;

// =============================================================================
// Registry Errors
// =============================================================================

/// Configuration errors detected while building a [`RouteRegistry`](crate::RouteRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A route pattern is malformed for its kind.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A templated path declares a different number of placeholders than the
    /// handler takes parameters.
    #[error(
        "route '{pattern}' of '{handler}' has {placeholders} placeholder(s) but the handler takes {params} parameter(s)"
    )]
    TemplateArity {
        pattern: String,
        handler: String,
        placeholders: usize,
        params: usize,
    },

    /// A text-query pattern is not a valid regular expression.
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A text-query handler must take no parameter or exactly one string.
    #[error("text query handler '{handler}' must take no parameter or a single String")]
    InvalidQueryHandler { handler: String },

    /// Two routes share the same static shape and parameter types.
    #[error("duplicate route '{pattern}': '{first}' and '{second}' can never be told apart")]
    DuplicateRoute {
        pattern: String,
        first: String,
        second: String,
    },
}

/// Result type for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

// =============================================================================
// Reply Errors
// =============================================================================

/// Errors raised while constructing a [`Reply`](crate::Reply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// Inline replies need at least one button.
    #[error("inline keyboard must contain at least one button")]
    EmptyKeyboard,

    /// A multi-reply needs at least one child.
    #[error("multi reply must contain at least one reply")]
    EmptyMulti,

    /// An edit was requested but the request does not refer to a message.
    #[error("request has no source message to edit")]
    NoSourceMessage,
}

/// Errors raised while rendering a reply against a channel.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The outbound channel call failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The reply itself was malformed.
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Result type for reply rendering.
pub type RenderResult<T> = Result<T, RenderError>;

// =============================================================================
// Invocation Errors
// =============================================================================

/// Errors raised by a handler adapter while invoking its handler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// The number of bound arguments disagrees with the handler signature.
    #[error("expected {expected} argument(s), got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// A bound argument does not have the type the handler expects.
    #[error("argument {index} is not of type {expected}")]
    TypeMismatch { index: usize, expected: ParamType },

    /// The handler returned a key-value store failure.
    #[error("{0}")]
    Store(StoreError),

    /// The handler itself returned an error.
    #[error("{0}")]
    Failed(String),
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Request-scoped dispatch failures.
///
/// None of these stop the receive loop; they are logged and the request ends.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// More than one route accepts the request.
    #[error("ambiguous route for '{payload}': {}", .candidates.join(", "))]
    AmbiguousRoute {
        payload: String,
        /// Signatures of the competing handlers.
        candidates: Vec<String>,
    },

    /// The handler adapter rejected the bound arguments.
    #[error("handler '{handler}' could not be invoked: {source}")]
    Invocation {
        handler: String,
        #[source]
        source: InvokeError,
    },

    /// The handler ran and reported a failure.
    #[error("handler '{handler}' failed: {message}")]
    HandlerFailed { handler: String, message: String },

    /// The handler gave up on a key-value store failure.
    #[error("handler '{handler}' store access failed: {source}")]
    Store {
        handler: String,
        #[source]
        source: StoreError,
    },

    /// The reply could not be rendered.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl DispatchError {
    /// Attributes an [`InvokeError`] to the handler it came from.
    pub fn from_invoke(handler: impl Into<String>, err: InvokeError) -> Self {
        let handler = handler.into();
        match err {
            InvokeError::Failed(message) => Self::HandlerFailed { handler, message },
            InvokeError::Store(source) => Self::Store { handler, source },
            source => Self::Invocation { handler, source },
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

// =============================================================================
// Menu Errors
// =============================================================================

/// Errors raised while building a [`CommandMenu`](crate::CommandMenu).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// Names are 1-32 characters of lowercase letters, digits and underscores.
    #[error("invalid command name '{0}'")]
    InvalidName(String),

    /// Descriptions are 3-256 characters long.
    #[error("description of '{0}' must be 3-256 characters")]
    InvalidDescription(String),

    /// The same command was added twice.
    #[error("command '{0}' is already in the menu")]
    Duplicate(String),
}
