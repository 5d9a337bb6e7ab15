// ── Debounced input ──
//
// A background task that waits for input to settle for a quiet period,
// then emits the latest value if it differs from the last one emitted.
// Used for the search box (300 ms) and the id availability check (500 ms).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Quiet period before a search term is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Quiet period before an id is sent for verification.
pub const ID_CHECK_DEBOUNCE: Duration = Duration::from_millis(500);

/// Handle to a running debounce task.
///
/// Dropping the handle (or cancelling its token) stops the task. A value
/// still waiting out its quiet period when the handle is dropped is
/// flushed; cancellation discards it.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Spawn the debounce task. `on_settled` runs on the task for every
    /// settled, distinct value.
    pub fn spawn<F>(quiet: Duration, cancel: CancellationToken, on_settled: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce_task(quiet, rx, cancel.clone(), on_settled));
        Self { tx, cancel }
    }

    /// Feed a new raw value. Restarts the quiet period.
    pub fn push(&self, value: T) {
        // Only fails once the task has stopped.
        let _ = self.tx.send(value);
    }

    /// Stop the task without emitting anything pending.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

async fn debounce_task<T, F>(
    quiet: Duration,
    mut rx: mpsc::UnboundedReceiver<T>,
    cancel: CancellationToken,
    mut on_settled: F,
) where
    T: Clone + PartialEq + Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    let mut pending: Option<T> = None;
    let mut last_emitted: Option<T> = None;
    let sleep = tokio::time::sleep(quiet);
    tokio::pin!(sleep);

    let mut emit = |value: T, last: &mut Option<T>| {
        if last.as_ref() == Some(&value) {
            trace!("debounce: duplicate value suppressed");
            return;
        }
        *last = Some(value.clone());
        on_settled(value);
    };

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            value = rx.recv() => {
                let Some(value) = value else {
                    if let Some(value) = pending.take() {
                        emit(value, &mut last_emitted);
                    }
                    break;
                };
                pending = Some(value);
                sleep.as_mut().reset(Instant::now() + quiet);
            }
            () = &mut sleep, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    emit(value, &mut last_emitted);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn collector() -> (
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_the_settled_value() {
        let (out_tx, mut out_rx) = collector();
        let debouncer = Debouncer::spawn(SEARCH_DEBOUNCE, CancellationToken::new(), move |v| {
            let _ = out_tx.send(v);
        });

        let start = Instant::now();
        debouncer.push("t".to_string());
        debouncer.push("ta".to_string());
        debouncer.push("tar".to_string());

        assert_eq!(out_rx.recv().await.unwrap(), "tar");
        assert!(start.elapsed() >= SEARCH_DEBOUNCE);

        let nothing = tokio::time::timeout(Duration::from_secs(2), out_rx.recv()).await;
        assert!(nothing.is_err(), "intermediate values must not be emitted");
    }

    #[tokio::test(start_paused = true)]
    async fn suppresses_consecutive_duplicates() {
        let (out_tx, mut out_rx) = collector();
        let debouncer = Debouncer::spawn(ID_CHECK_DEBOUNCE, CancellationToken::new(), move |v| {
            let _ = out_tx.send(v);
        });

        debouncer.push("abc".to_string());
        assert_eq!(out_rx.recv().await.unwrap(), "abc");

        // Edited away and back within the window: settles on the same value.
        debouncer.push("abcd".to_string());
        debouncer.push("abc".to_string());
        let dup = tokio::time::timeout(Duration::from_secs(2), out_rx.recv()).await;
        assert!(dup.is_err());

        debouncer.push("abcd".to_string());
        assert_eq!(out_rx.recv().await.unwrap(), "abcd");
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_emit_separately() {
        let (out_tx, mut out_rx) = collector();
        let debouncer = Debouncer::spawn(SEARCH_DEBOUNCE, CancellationToken::new(), move |v| {
            let _ = out_tx.send(v);
        });

        debouncer.push("a".to_string());
        assert_eq!(out_rx.recv().await.unwrap(), "a");
        tokio::time::sleep(Duration::from_secs(1)).await;
        debouncer.push("b".to_string());
        assert_eq!(out_rx.recv().await.unwrap(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending() {
        let (out_tx, mut out_rx) = collector();
        let debouncer = Debouncer::spawn(SEARCH_DEBOUNCE, CancellationToken::new(), move |v| {
            let _ = out_tx.send(v);
        });

        debouncer.push("never".to_string());
        debouncer.cancel();

        // Task exits and drops the sender, closing the channel.
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_flushes_pending() {
        let (out_tx, mut out_rx) = collector();
        let debouncer = Debouncer::spawn(SEARCH_DEBOUNCE, CancellationToken::new(), move |v| {
            let _ = out_tx.send(v);
        });

        debouncer.push("last".to_string());
        drop(debouncer);

        assert_eq!(out_rx.recv().await.unwrap(), "last");
        assert!(out_rx.recv().await.is_none());
    }
}
