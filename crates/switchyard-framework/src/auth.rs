//! Authorization gate.
//!
//! Routes flagged as requiring authorization pass through the
//! [`AuthorizationGate`] before their handler runs. The gate asks the
//! configured [`AuthorizationPolicy`]; on denial the policy's own reply is
//! rendered instead of the handler's.
//!
//! When a route requires authorization but no policy is configured, the gate
//! denies by default and renders nothing. [`AuthorizationGate::fail_open`]
//! restores pass-through.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use switchyard_core::User;

use crate::reply::Reply;

/// Decides whether a user may call protected routes.
#[async_trait]
pub trait AuthorizationPolicy: Send + Sync {
    /// Returns `true` if `user` may proceed.
    async fn authorize(&self, user: &User) -> bool;

    /// The reply rendered when `user` is denied.
    async fn on_unauthorized(&self, user: &User) -> Reply;
}

/// A shared, type-erased authorization policy.
pub type BoxedPolicy = Arc<dyn AuthorizationPolicy>;

/// The gate's verdict for one request.
#[derive(Debug)]
pub enum AuthDecision {
    Allowed,
    /// Denied; render this reply and stop.
    Denied(Reply),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Applies the authorization policy to protected routes.
#[derive(Clone, Default)]
pub struct AuthorizationGate {
    policy: Option<BoxedPolicy>,
    fail_open: bool,
}

impl AuthorizationGate {
    /// A gate without policy: protected routes are denied.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: impl AuthorizationPolicy + 'static) -> Self {
        Self {
            policy: Some(Arc::new(policy)),
            fail_open: false,
        }
    }

    pub fn policy(mut self, policy: BoxedPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Lets protected routes through when no policy is configured.
    pub fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    pub fn has_policy(&self) -> bool {
        self.policy.is_some()
    }

    pub async fn authorize(&self, requires_auth: bool, user: &User) -> AuthDecision {
        if !requires_auth {
            return AuthDecision::Allowed;
        }
        match &self.policy {
            Some(policy) => {
                if policy.authorize(user).await {
                    AuthDecision::Allowed
                } else {
                    AuthDecision::Denied(policy.on_unauthorized(user).await)
                }
            }
            None if self.fail_open => AuthDecision::Allowed,
            None => {
                warn!(
                    user_id = user.id,
                    "Route requires authorization but no policy is configured, denying"
                );
                AuthDecision::Denied(Reply::empty())
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("has_policy", &self.has_policy())
            .field("fail_open", &self.fail_open)
            .finish()
    }
}

// ============================================================================
// AllowList
// ============================================================================

/// Admits a fixed set of user ids and answers everyone else with a text.
#[derive(Debug, Clone)]
pub struct AllowList {
    users: HashSet<i64>,
    denial: String,
}

impl AllowList {
    pub fn new(users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            users: users.into_iter().collect(),
            denial: "You are not authorized to use this bot.".to_string(),
        }
    }

    /// Replaces the text sent to denied users.
    pub fn denial_text(mut self, text: impl Into<String>) -> Self {
        self.denial = text.into();
        self
    }
}

#[async_trait]
impl AuthorizationPolicy for AllowList {
    async fn authorize(&self, user: &User) -> bool {
        self.users.contains(&user.id)
    }

    async fn on_unauthorized(&self, _user: &User) -> Reply {
        Reply::text(self.denial.clone())
    }
}
