//! Request dispatcher.
//!
//! The [`Dispatcher`] drives one update through
//! `classify → match → authorize → invoke → render`:
//!
//! ```text
//! Update ──▶ Request::classify ──▶ match_route ──▶ AuthorizationGate ──▶ handler ──▶ Reply::render
//!               │ unclassifiable       │ no match       │ denied
//!               ▼                      ▼                ▼
//!            Dropped                Dropped       render denial, Unauthorized
//! ```
//!
//! Every failure is scoped to its request: the dispatcher holds no per-request
//! state and can be cloned and called concurrently from many tasks.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(Arc::new(registry), channel)
//!     .with_store(Arc::new(InMemoryKeyValueStore::new()))
//!     .with_gate(AuthorizationGate::with_policy(AllowList::new([1234567890])));
//!
//! match dispatcher.dispatch(&update).await {
//!     Ok(outcome) => debug!(?outcome, "Update handled"),
//!     Err(e) => error!("Dispatch failed: {e}"),
//! }
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, debug, error, info, info_span};

use switchyard_core::{
    BoxedChannel, BoxedStore, Request, RequestKind, Unclassifiable, Update,
};

use crate::auth::{AuthDecision, AuthorizationGate};
use crate::context::RequestContext;
use crate::error::{DispatchError, DispatchResult};
use crate::matcher::{MatchOutcome, match_route};
use crate::registry::RouteRegistry;
use crate::state::UserState;

/// Why an update ended without reaching a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Unclassifiable(Unclassifiable),
    NoMatch,
}

/// How a request ended, when it did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing happened, visibly to the user.
    Dropped(DropReason),
    /// The authorization policy's reply was rendered instead.
    Unauthorized,
    /// The handler ran and its reply was rendered.
    Succeeded,
}

/// Routes updates to handlers and renders their replies.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    channel: BoxedChannel,
    store: Option<BoxedStore>,
    gate: AuthorizationGate,
}

impl Dispatcher {
    /// Creates a dispatcher without store and with a policy-less gate.
    pub fn new(registry: Arc<RouteRegistry>, channel: BoxedChannel) -> Self {
        Self {
            registry,
            channel,
            store: None,
            gate: AuthorizationGate::new(),
        }
    }

    /// Enables per-user state for handlers (builder pattern).
    pub fn with_store(mut self, store: BoxedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the authorization gate (builder pattern).
    pub fn with_gate(mut self, gate: AuthorizationGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn channel(&self) -> &BoxedChannel {
        &self.channel
    }

    /// Dispatches one update to completion.
    ///
    /// Unclassifiable updates and unmatched payloads are dropped silently.
    /// Ambiguous routes, invocation failures and render failures are
    /// returned as errors after being logged.
    pub async fn dispatch(&self, update: &Update) -> DispatchResult<DispatchOutcome> {
        let request = match Request::classify(update) {
            Ok(request) => request,
            Err(reason) => {
                info!(
                    update_id = update.update_id,
                    shape = update.kind_name(),
                    %reason,
                    "Dropping update"
                );
                return Ok(DispatchOutcome::Dropped(DropReason::Unclassifiable(reason)));
            }
        };

        let span = info_span!(
            "dispatch",
            update_id = request.update_id,
            kind = %request.kind,
            user_id = request.user.id,
        );

        let result = self.handle(request).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| error!(error = %e, "Dispatch failed"));
        }
        result
    }

    async fn handle(&self, request: Request) -> DispatchResult<DispatchOutcome> {
        let matched = match match_route(&self.registry, request.kind, &request.payload) {
            MatchOutcome::Single(matched) => matched,
            MatchOutcome::NoMatch => {
                info!(payload = %request.payload, "No route matched");
                return Ok(DispatchOutcome::Dropped(DropReason::NoMatch));
            }
            MatchOutcome::Ambiguous(candidates) => {
                return Err(DispatchError::AmbiguousRoute {
                    payload: request.payload,
                    candidates: candidates
                        .iter()
                        .map(|route| route.descriptor().signature())
                        .collect(),
                });
            }
        };

        let descriptor = matched.route.descriptor();
        let handler_name = descriptor.qualified_name();
        let chat_id = request.chat_id;
        debug!(route = %descriptor, "Route matched");

        if let AuthDecision::Denied(reply) = self
            .gate
            .authorize(descriptor.requires_auth(), &request.user)
            .await
        {
            info!(handler = %handler_name, "Request denied by authorization policy");
            reply.render(self.channel.as_ref(), chat_id).await?;
            return Ok(DispatchOutcome::Unauthorized);
        }

        let state = self
            .store
            .as_ref()
            .map(|store| UserState::new(Arc::clone(store), request.user.id));
        let ctx = Arc::new(RequestContext::new(
            request,
            Arc::clone(&self.channel),
            state,
        ));

        let reply = (matched.route.handler())(ctx, matched.args)
            .await
            .map_err(|e| DispatchError::from_invoke(handler_name.as_str(), e))?;

        debug!(handler = %handler_name, reply = reply.kind_name(), "Handler returned");
        reply.render(self.channel.as_ref(), chat_id).await?;
        Ok(DispatchOutcome::Succeeded)
    }

    /// Returns `true` if the registry has any route for `kind`.
    pub fn handles(&self, kind: RequestKind) -> bool {
        self.registry
            .routes()
            .iter()
            .any(|route| route.descriptor().kind().request_kind() == kind)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("route_count", &self.registry.len())
            .field("has_store", &self.store.is_some())
            .field("gate", &self.gate)
            .finish()
    }
}

// ============================================================================
// tower integration
// ============================================================================

impl Service<Update> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<DispatchOutcome>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, update: Update) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { dispatcher.dispatch(&update).await })
    }
}
