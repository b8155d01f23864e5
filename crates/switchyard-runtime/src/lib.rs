//! Switchyard Runtime - the outer layer that runs a dispatcher.
//!
//! This crate provides:
//! - Layered configuration loading (`SwitchyardConfig`, `ConfigLoader`)
//! - Logging initialization (`LoggingBuilder`, `SpanEvents`)
//! - The update-receive loop (`SwitchyardRuntime`) with bounded concurrency,
//!   optional per-user ordering, graceful shutdown and command menu publication
//! - Update sources over tokio channels and streams (`UpdateSource`)
//!
//! ```ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     spawn_long_polling(tx);
//!
//!     let runtime = SwitchyardRuntime::builder()
//!         .store(Arc::new(InMemoryKeyValueStore::new()))
//!         .build(routes(), channel)?;
//!
//!     // Run until Ctrl+C
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod source;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, Profile, SwitchyardConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, SwitchyardRuntime};
pub use source::{StreamSource, UpdateSource};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module with the logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
