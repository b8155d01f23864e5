//! The update-receive loop.
//!
//! [`SwitchyardRuntime`] pulls updates from an [`UpdateSource`] and dispatches
//! each one on its own task. Concurrency is bounded by
//! `dispatch.max_concurrent_updates`; with `dispatch.serialize_per_user` the
//! updates of one user run one at a time in arrival order while distinct
//! users stay concurrent. An update waiting for its user's previous update
//! does not count against the bound.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! let runtime = SwitchyardRuntime::builder()
//!     .profile("production")
//!     .store(Arc::new(InMemoryKeyValueStore::new()))
//!     .policy(AllowList::new([1234567890]))
//!     .menu(CommandMenu::new("").command("phone", "Enter a phone number")?)
//!     .build(routes, channel)?;
//!
//! // Runs until Ctrl+C, SIGTERM or the source is exhausted.
//! runtime.run(updates_rx).await?;
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use figment::Provider;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use switchyard_core::{BoxedChannel, BoxedStore, Update};
use switchyard_framework::{
    AuthorizationGate, AuthorizationPolicy, CommandMenu, Dispatcher, RegistryBuilder,
};

use crate::config::{ConfigLoader, SwitchyardConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use crate::source::UpdateSource;

/// Drives a [`Dispatcher`] from an update source until shutdown.
pub struct SwitchyardRuntime {
    config: SwitchyardConfig,
    dispatcher: Dispatcher,
    menus: Vec<CommandMenu>,
    shutdown: CancellationToken,
}

impl SwitchyardRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Wraps an already configured dispatcher. Logging is left untouched.
    pub fn new(config: SwitchyardConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher,
            menus: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Adds a command menu published at startup.
    pub fn with_menu(mut self, menu: CommandMenu) -> Self {
        self.menus.push(menu);
        self
    }

    pub fn config(&self) -> &SwitchyardConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// A token that stops the loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Publishes every configured menu and returns how many succeeded.
    pub async fn publish_menus(&self) -> usize {
        let channel = self.dispatcher.channel();
        let mut published = 0;
        for menu in &self.menus {
            match menu.publish(channel.as_ref()).await {
                Ok(()) => published += 1,
                Err(err) => warn!(
                    language = %menu.language(),
                    error = %err,
                    "Failed to publish command menu"
                ),
            }
        }
        if !self.menus.is_empty() {
            info!(published, total = self.menus.len(), "Command menus registered");
        }
        published
    }

    /// Runs until Ctrl+C, SIGTERM, the shutdown token or source exhaustion.
    pub async fn run<S: UpdateSource>(&self, source: S) -> RuntimeResult<()> {
        self.run_until(source, wait_for_signal()).await
    }

    /// Runs until `shutdown` resolves, the shutdown token is cancelled or
    /// the source is exhausted.
    pub async fn run_until<S, F>(&self, mut source: S, shutdown: F) -> RuntimeResult<()>
    where
        S: UpdateSource,
        F: Future<Output = ()> + Send,
    {
        let token = self.shutdown.clone();
        let stop = async move {
            tokio::select! {
                _ = shutdown => {}
                _ = token.cancelled() => {}
            }
        };
        tokio::pin!(stop);

        self.publish_menus().await;

        let dispatch = &self.config.dispatch;
        if !dispatch.receive_updates {
            info!("Update receiving is disabled, waiting for shutdown");
            stop.await;
            info!("Switchyard runtime stopped");
            return Ok(());
        }

        let semaphore = Arc::new(Semaphore::new(dispatch.max_concurrent_updates));
        let queues = dispatch
            .serialize_per_user
            .then(|| Arc::new(UserQueues::default()));
        let mut tasks = JoinSet::new();

        info!(
            max_concurrent_updates = dispatch.max_concurrent_updates,
            serialize_per_user = dispatch.serialize_per_user,
            "Switchyard runtime is now running"
        );

        loop {
            let permit = tokio::select! {
                _ = &mut stop => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let update = tokio::select! {
                _ = &mut stop => break,
                update = source.next_update() => update,
            };
            let Some(update) = update else {
                info!("Update source exhausted");
                break;
            };

            self.spawn_dispatch(&mut tasks, update, permit, &semaphore, queues.as_ref());

            while let Some(joined) = tasks.try_join_next() {
                log_join(joined);
            }
        }

        self.drain(tasks).await;
        info!("Switchyard runtime stopped");
        Ok(())
    }

    fn spawn_dispatch(
        &self,
        tasks: &mut JoinSet<()>,
        update: Update,
        permit: OwnedSemaphorePermit,
        semaphore: &Arc<Semaphore>,
        queues: Option<&Arc<UserQueues>>,
    ) {
        let dispatcher = self.dispatcher.clone();
        let semaphore = Arc::clone(semaphore);
        let mut turn = queues.and_then(|queues| Some(queues.enqueue(update.user()?.id)));

        tasks.spawn(async move {
            let mut permit = Some(permit);
            if let Some(turn) = turn.as_mut()
                && turn.has_predecessor()
            {
                // A queued update holds no dispatch slot while it waits.
                permit = None;
                turn.wait().await;
            }
            let _permit = match permit {
                Some(permit) => permit,
                None => match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            // Failures are logged inside the dispatch span.
            if let Ok(outcome) = dispatcher.dispatch(&update).await {
                trace!(update_id = update.update_id, ?outcome, "Update handled");
            }

            drop(turn);
        });
    }

    async fn drain(&self, mut tasks: JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }
        let grace = self.config.dispatch.shutdown_grace();
        info!(
            in_flight = tasks.len(),
            grace_secs = grace.as_secs(),
            "Waiting for in-flight updates"
        );

        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = tasks.join_next().await {
                log_join(joined);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = tasks.len(),
                "Shutdown grace period elapsed, aborting in-flight updates"
            );
            tasks.shutdown().await;
        }
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(err) = joined
        && err.is_panic()
    {
        error!(error = %err, "Dispatch task panicked");
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(err) => warn!(error = %err, "Failed to register SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(err) => {
            error!(error = %err, "Failed to listen for Ctrl+C, relying on the shutdown token");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Per-user ordering
// =============================================================================

/// Chains the updates of each user so they run one after another.
///
/// Every update waits for the completion signal of the previous update of the
/// same user. Dropping a [`Turn`] (finished, panicked or aborted task) clears
/// the user's entry and releases the next one.
#[derive(Default)]
struct UserQueues {
    inner: Mutex<QueueState>,
}

#[derive(Default)]
struct QueueState {
    next_ticket: u64,
    tails: HashMap<i64, Tail>,
}

struct Tail {
    ticket: u64,
    done: oneshot::Receiver<()>,
}

struct Turn {
    queues: Arc<UserQueues>,
    user_id: i64,
    ticket: u64,
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl UserQueues {
    /// Takes a place in the user's queue. Must be called in arrival order.
    fn enqueue(self: &Arc<Self>, user_id: i64) -> Turn {
        let (tx, rx) = oneshot::channel();
        let mut state = self.inner.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        let previous = state
            .tails
            .insert(user_id, Tail { ticket, done: rx })
            .map(|tail| tail.done);
        Turn {
            queues: Arc::clone(self),
            user_id,
            ticket,
            previous,
            _done: tx,
        }
    }

    fn release(&self, user_id: i64, ticket: u64) {
        let mut state = self.inner.lock();
        if state
            .tails
            .get(&user_id)
            .is_some_and(|tail| tail.ticket == ticket)
        {
            state.tails.remove(&user_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().tails.len()
    }
}

impl Turn {
    fn has_predecessor(&self) -> bool {
        self.previous.is_some()
    }

    async fn wait(&mut self) {
        if let Some(previous) = self.previous.take() {
            // Err means the predecessor finished without signalling; either way it is done.
            let _ = previous.await;
            debug!(user_id = self.user_id, "Previous update of user finished");
        }
    }
}

impl Drop for Turn {
    fn drop(&mut self) {
        self.queues.release(self.user_id, self.ticket);
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`SwitchyardRuntime`].
///
/// ```rust,ignore
/// let runtime = SwitchyardRuntime::builder()
///     .config_file("config/switchyard.toml")
///     .store(store)
///     .build(routes, channel)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<SwitchyardConfig>,
    store: Option<BoxedStore>,
    gate: AuthorizationGate,
    menus: Vec<CommandMenu>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            config: None,
            store: None,
            gate: AuthorizationGate::new(),
            menus: Vec::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a figment provider over the loaded sources.
    pub fn merge<P: Provider>(mut self, provider: P) -> Self {
        self.config_loader = self.config_loader.merge(provider);
        self
    }

    /// Overrides a single dotted configuration key.
    pub fn set<V: Serialize>(mut self, key: &str, value: V) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Uses `config` as is instead of loading from files and environment.
    pub fn config(mut self, config: SwitchyardConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: BoxedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn policy(mut self, policy: impl AuthorizationPolicy + 'static) -> Self {
        self.gate = self.gate.policy(Arc::new(policy));
        self
    }

    pub fn menu(mut self, menu: CommandMenu) -> Self {
        self.menus.push(menu);
        self
    }

    /// Loads configuration, initializes logging and validates the routes.
    pub fn build(
        self,
        routes: RegistryBuilder,
        channel: BoxedChannel,
    ) -> RuntimeResult<SwitchyardRuntime> {
        let config = match self.config {
            Some(config) => {
                validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        logging::init_from_config(&config.logging);

        let registry = routes.build()?;
        let gate = self.gate.fail_open(config.authorization.fail_open);
        let mut dispatcher = Dispatcher::new(Arc::new(registry), channel).with_gate(gate);
        if let Some(store) = self.store {
            dispatcher = dispatcher.with_store(store);
        }

        info!(
            routes = dispatcher.registry().len(),
            menus = self.menus.len(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(SwitchyardRuntime {
            config,
            dispatcher,
            menus: self.menus,
            shutdown: CancellationToken::new(),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
