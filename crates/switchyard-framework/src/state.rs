//! Per-user state accessor.
//!
//! [`UserState`] is a typed façade over the shared
//! [`KeyValueStore`](switchyard_core::KeyValueStore). Keys are
//! chosen by the caller; [`UserState::user_key`] builds the conventional
//! `"{prefix}{user_id}"` form.
//!
//! ```rust,ignore
//! async fn increment(ctx: Arc<RequestContext>) -> Result<Reply, StoreError> {
//!     let state = ctx.state()?;
//!     let key = state.user_key("Counter:");
//!     let value: i32 = state.get(&key).await? + 1;
//!     state.set(&key, value).await?;
//!     Ok(Reply::text(format!("Counter: {value}")))
//! }
//! ```
//!
//! A get followed by a set is not atomic. Two concurrent updates from the same
//! user can race unless the runtime serializes per user.

use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use switchyard_core::{BoxedStore, StoreResult};

/// Typed access to the key-value store on behalf of one user.
#[derive(Clone)]
pub struct UserState {
    store: BoxedStore,
    user_id: i64,
}

impl UserState {
    pub fn new(store: BoxedStore, user_id: i64) -> Self {
        Self { store, user_id }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Builds a key scoped to the current user.
    pub fn user_key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.user_id)
    }

    /// Reads a value, falling back to `T::default()` when the key is absent or
    /// holds something that does not parse as `T`.
    pub async fn get<T>(&self, key: &str) -> StoreResult<T>
    where
        T: FromStr + Default,
    {
        let raw = self.store.get(key).await?;
        if raw.is_empty() {
            return Ok(T::default());
        }
        Ok(raw.parse().unwrap_or_else(|_| {
            debug!(key, raw = %raw, "Stored value does not parse, using default");
            T::default()
        }))
    }

    /// Reads the raw string value, `""` if absent.
    pub async fn get_raw(&self, key: &str) -> StoreResult<String> {
        self.store.get(key).await
    }

    pub async fn set<T: Display>(&self, key: &str, value: T) -> StoreResult<()> {
        self.store.set(key, Some(&value.to_string())).await
    }

    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        self.store.set(key, None).await
    }
}

impl std::fmt::Debug for UserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserState")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
