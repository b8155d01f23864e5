//! # Switchyard Framework
//!
//! The routing and dispatch engine of Switchyard.
//!
//! This layer provides:
//! - Route descriptors and an explicit, validated route registry
//! - Positional argument binding with all-or-nothing type conversion
//! - A matcher for exact commands, templated callback paths and regex queries,
//!   reporting ambiguity instead of picking a winner
//! - Axum-style handler adapters over plain async functions
//! - An authorization gate with pluggable policies
//! - Replies and their rendering against a messaging channel
//! - The per-request dispatcher, usable directly or as a `tower::Service`
//!
//! ```rust,ignore
//! use switchyard_framework::{Dispatcher, HandlerGroup, RegistryBuilder, Reply, RequestContext};
//!
//! async fn add_digit(ctx: Arc<RequestContext>, digit: i32) -> Reply {
//!     Reply::text(format!("Pressed {digit}"))
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .group(HandlerGroup::new("phone").inline("/phone/{digit}", add_digit))
//!     .build()?;
//! let dispatcher = Dispatcher::new(Arc::new(registry), channel);
//! dispatcher.dispatch(&update).await?;
//! ```

pub mod auth;
pub mod binder;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod handler;
pub mod matcher;
pub mod menu;
pub mod registry;
pub mod reply;
pub mod route;
pub mod split;
pub mod state;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::{AllowList, AuthDecision, AuthorizationGate, AuthorizationPolicy, BoxedPolicy};
pub use binder::{ArgValue, FromArg, ParamType, try_convert};
pub use context::RequestContext;
pub use dispatcher::{DispatchOutcome, Dispatcher, DropReason};
pub use error::{
    DispatchError, DispatchResult, InvokeError, MenuError, RegistryError, RegistryResult,
    RenderError, RenderResult, ReplyError,
};
pub use handler::{BoxedHandler, Handler, IntoReply, into_handler};
pub use matcher::{MatchOutcome, MatchedRoute, match_route};
pub use menu::CommandMenu;
pub use registry::{HandlerGroup, RegistryBuilder, Route, RouteRegistry, RouteSpec};
pub use reply::{InputFile, NonEmptyKeyboard, Reply, SharedStream};
pub use route::{PathSegment, RouteDescriptor, RouteKind, RoutePattern};
pub use split::tokenize;
pub use state::UserState;
