//! Inbound update sources.
//!
//! The runtime pulls parsed [`Update`]s from an [`UpdateSource`]. Transports
//! (long polling, webhooks) live outside this crate and hand their updates
//! over through a channel or a stream.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use switchyard_core::Update;

/// A source of inbound updates.
///
/// `next_update` must be cancel safe: the runtime races it against shutdown
/// and drops the future when shutdown wins.
#[async_trait]
pub trait UpdateSource: Send {
    /// Returns the next update, or `None` once the source is exhausted.
    async fn next_update(&mut self) -> Option<Update>;
}

#[async_trait]
impl UpdateSource for mpsc::Receiver<Update> {
    async fn next_update(&mut self) -> Option<Update> {
        self.recv().await
    }
}

#[async_trait]
impl UpdateSource for mpsc::UnboundedReceiver<Update> {
    async fn next_update(&mut self) -> Option<Update> {
        self.recv().await
    }
}

/// Adapts any `Stream` of updates.
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = Update> + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> UpdateSource for StreamSource<S>
where
    S: Stream<Item = Update> + Send + Unpin,
{
    async fn next_update(&mut self) -> Option<Update> {
        self.stream.next().await
    }
}
