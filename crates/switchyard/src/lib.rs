//! # Switchyard
//!
//! Declarative command routing and dispatch for chat-bot request/response
//! applications.
//!
//! ## Overview
//!
//! Handlers are plain async functions registered against a route: an exact
//! slash command, a templated callback path or a regular expression over free
//! text. Switchyard classifies each inbound update, finds the one route it
//! matches, binds the arguments by position, checks authorization, invokes the
//! handler and renders the returned [`Reply`](framework::Reply) through a
//! messaging channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────┐   ┌──────┐   ┌─────────┐   ┌──────────┐
//! │  Runtime   │──▶│ Classifier │──▶│ Matcher │──▶│ Gate │──▶│ Handler │──▶│ Executor │──▶ channel
//! │ (sources)  │   └────────────┘   └─────────┘   └──────┘   └─────────┘   └──────────┘
//! └────────────┘
//! ```
//!
//! - **Core**: update model, request classification, channel and store contracts
//! - **Framework**: route registry, matcher, binder, handlers, replies, dispatcher
//! - **Runtime**: configuration, logging and the update-receive loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! async fn add_digit(ctx: Arc<RequestContext>, digit: i32) -> Result<Reply, StoreError> {
//!     let state = ctx.state()?;
//!     let key = state.user_key("Phone:");
//!     let value: i64 = state.get(&key).await?;
//!     state.set(&key, value * 10 + i64::from(digit)).await?;
//!     Ok(Reply::text(format!("{}", value * 10 + i64::from(digit))))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let routes = RegistryBuilder::new()
//!         .group(HandlerGroup::new("phone").inline("/phone/{digit}", add_digit));
//!
//!     let runtime = SwitchyardRuntime::builder()
//!         .store(Arc::new(InMemoryKeyValueStore::new()))
//!         .build(routes, channel)?;
//!
//!     runtime.run(updates).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `switchyard.toml` configuration files
//! - `yaml-config`: `switchyard.yaml` configuration files
//! - `json-log`: JSON log output

pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use switchyard_runtime::{StreamSource, SwitchyardConfig, SwitchyardRuntime, UpdateSource};

    // Registration
    pub use switchyard_framework::{HandlerGroup, RegistryBuilder, RouteRegistry};

    // Handlers and replies
    pub use switchyard_framework::{
        CommandMenu, InputFile, IntoReply, Reply, ReplyError, RequestContext, UserState,
    };

    // Authorization
    pub use switchyard_framework::{AllowList, AuthorizationGate, AuthorizationPolicy};

    // Dispatch without the runtime loop
    pub use switchyard_framework::{DispatchError, DispatchOutcome, Dispatcher};

    // Core contracts and value types
    pub use switchyard_core::{
        BoxedChannel, BoxedStore, ChannelError, InMemoryKeyValueStore, InlineButton,
        InlineKeyboard, KeyValueStore, MessagingChannel, StoreError, Update, User,
    };
}
