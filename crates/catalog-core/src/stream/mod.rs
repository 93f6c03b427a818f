// ── Collection subscriptions ──
//
// Views handed to front ends that render the product list and redraw on
// every cache write.

mod filter;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Keyed;
use crate::store::Snapshot;

pub use filter::{Pagination, ProductFilter};

/// Live view of a cached collection.
///
/// Holds the snapshot the caller last acknowledged next to the channel the
/// store publishes on.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = Arc::clone(&receiver.borrow());
        Self { current, receiver }
    }

    /// Last acknowledged snapshot.
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// Whatever the store holds right now, acknowledged or not.
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Park until the store writes again, then acknowledge and return the
    /// new snapshot. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        self.current = Arc::clone(&self.receiver.borrow_and_update());
        Some(Arc::clone(&self.current))
    }

    /// Hand the subscription over as a [`Stream`]. Its first item is the
    /// snapshot the store holds at this moment.
    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

impl<T: Keyed + Send + Sync + 'static> EntityStream<T> {
    /// Entity with `key` in the store's current snapshot.
    pub fn find(&self, key: &T::Key) -> Option<Arc<T>> {
        self.receiver
            .borrow()
            .iter()
            .find(|e| e.key() == key)
            .map(Arc::clone)
    }
}

/// Snapshot-per-write [`Stream`] returned by [`EntityStream::into_stream`].
pub struct EntityWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
