// ── Snapshot subscriptions ──
//
// Handles for consuming record snapshots published by a coordinator.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to a coordinator's record snapshot.
///
/// Provides point-in-time access plus change notification via
/// [`changed`](Self::changed) or by converting into a `Stream`.
pub struct RecordStream<R: Clone + Send + Sync + 'static> {
    current: Arc<Vec<R>>,
    receiver: watch::Receiver<Arc<Vec<R>>>,
}

impl<R: Clone + Send + Sync + 'static> RecordStream<R> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<R>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Arc<Vec<R>> {
        &self.current
    }

    pub fn latest(&self) -> Arc<Vec<R>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published snapshot. `None` once the coordinator
    /// is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<R>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> RecordWatchStream<R> {
        RecordWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding every published snapshot, starting with the
/// current one.
pub struct RecordWatchStream<R: Clone + Send + Sync + 'static> {
    inner: WatchStream<Arc<Vec<R>>>,
}

impl<R: Clone + Send + Sync + 'static> Stream for RecordWatchStream<R> {
    type Item = Arc<Vec<R>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
