// ── Reactive product stream ──
//
// Read-only subscription handle over the ProductStore's list slot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Product;

/// One immutable view of the cached product list.
pub type ProductSnapshot = Arc<Vec<Arc<Product>>>;

/// A subscription to the cached product list.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct ProductStream {
    current: ProductSnapshot,
    receiver: watch::Receiver<ProductSnapshot>,
}

impl ProductStream {
    pub(crate) fn new(receiver: watch::Receiver<ProductSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &ProductSnapshot {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> ProductSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<ProductSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first,
    /// then every replacement.
    pub fn into_stream(self) -> ProductWatchStream {
        ProductWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ProductWatchStream {
    inner: WatchStream<ProductSnapshot>,
}

impl Stream for ProductWatchStream {
    type Item = ProductSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
