//! The contract between a match and the shared document store.
//!
//! dotbox doesn't implement a network store itself. Hosts plug one in
//! by implementing [`MatchStore`] (and optionally [`StatsStore`]); the
//! crate ships [`MemoryStore`](crate::MemoryStore) for tests, demos and
//! single-process play.
//!
//! # Semantics expected from an implementation
//!
//! - `write` is atomic: either the whole [`MatchUpdate`] lands or none of
//!   it does. Redrawing an existing line must be refused (see
//!   [`Match::apply`]), which is what arbitrates two clients racing for
//!   the same line.
//! - Subscribers receive *full* snapshots after every accepted write,
//!   starting with the current document right after subscribing.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use dotbox_protocol::{Match, MatchId, MatchSnapshot, MatchUpdate, PlayerId};
use futures_util::Stream;
use tokio::sync::mpsc;

use crate::{GameResult, SyncError, UserStats};

/// A shared, mutable match document keyed by [`MatchId`].
///
/// Methods return `Send` futures so controllers can be driven from any
/// Tokio task. Implementations can simply write `async fn`.
pub trait MatchStore: Send + Sync + 'static {
    /// Stores a new document and returns its id.
    fn create(&self, initial: Match) -> impl Future<Output = Result<MatchId, SyncError>> + Send;

    /// Reads the current document.
    ///
    /// # Errors
    /// [`SyncError::NotFound`] if no such match exists.
    fn read(&self, id: &MatchId) -> impl Future<Output = Result<Match, SyncError>> + Send;

    /// Atomically applies a delta.
    ///
    /// # Errors
    /// [`SyncError::Protocol`] wrapping a `Conflict` when the delta
    /// redraws a line or re-credits a square.
    fn write(
        &self,
        id: &MatchId,
        update: MatchUpdate,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Registers for snapshots of the document.
    fn subscribe(&self, id: &MatchId)
    -> impl Future<Output = Result<Subscription, SyncError>> + Send;
}

/// Per-player win/loss/tie bookkeeping.
///
/// The computer opponent is never tracked: recording a result for it is
/// a no-op and its stats are always `None`.
pub trait StatsStore: Send + Sync + 'static {
    fn record_result(
        &self,
        player: &PlayerId,
        result: GameResult,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn user_stats(
        &self,
        player: &PlayerId,
    ) -> impl Future<Output = Result<Option<UserStats>, SyncError>> + Send;
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live feed of snapshots for one match.
///
/// Call [`unsubscribe`](Self::unsubscribe) (or just drop it) to stop
/// delivery; either way the store is told exactly once.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<MatchSnapshot>,
    on_unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wraps a snapshot channel. `on_unsubscribe` runs once, when the
    /// subscription is released.
    pub fn new(
        receiver: mpsc::UnboundedReceiver<MatchSnapshot>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    /// Waits for the next snapshot. `None` once the store has gone away.
    pub async fn next_snapshot(&mut self) -> Option<MatchSnapshot> {
        self.receiver.recv().await
    }

    /// Returns a snapshot if one is already queued.
    pub fn try_next_snapshot(&mut self) -> Option<MatchSnapshot> {
        self.receiver.try_recv().ok()
    }

    /// Deregisters from the store.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(callback) = self.on_unsubscribe.take() {
            callback();
        }
        self.receiver.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.on_unsubscribe.is_some())
            .finish()
    }
}

impl Stream for Subscription {
    type Item = MatchSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&calls);
        (calls, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_unsubscribe_runs_callback_once() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (calls, callback) = counted();
        let sub = Subscription::new(rx, callback);
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_callback() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (calls, callback) = counted();
        drop(Subscription::new(rx, callback));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_next_snapshot_delivers_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(rx, || {});
        tx.send(MatchSnapshot { grid_size: Some(1), ..Default::default() }).unwrap();
        tx.send(MatchSnapshot { grid_size: Some(2), ..Default::default() }).unwrap();

        assert_eq!(sub.next_snapshot().await.unwrap().grid_size, Some(1));
        assert_eq!(sub.try_next_snapshot().unwrap().grid_size, Some(2));
        assert!(sub.try_next_snapshot().is_none());

        drop(tx);
        assert!(sub.next_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_subscription_is_a_stream() {
        use futures_util::StreamExt;

        let (tx, rx) = mpsc::unbounded_channel();
        let sub = Subscription::new(rx, || {});
        tx.send(MatchSnapshot::default()).unwrap();
        drop(tx);

        let all: Vec<_> = sub.collect().await;
        assert_eq!(all.len(), 1);
    }
}
