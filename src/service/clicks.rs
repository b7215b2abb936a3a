use crate::models::NewClick;
use crate::storage::ClickStore;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};

/// Fire-and-forget click persistence behind a bounded queue and a fixed
/// worker pool.
///
/// Semantics are at-most-once: a full queue drops the event with a
/// warning, a failed write drops it with a warning, and events still in
/// flight when the process dies are lost. Nothing here may ever delay the
/// redirect response that triggered the click.
pub struct ClickRecorder {
    tx: mpsc::Sender<NewClick>,
    shutdown_tx: watch::Sender<bool>,
}

impl ClickRecorder {
    pub fn new(store: Arc<dyn ClickStore>, queue_capacity: usize, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let (shutdown_tx, _) = watch::channel(false);

        for worker in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let mut shutdown_rx = shutdown_tx.subscribe();

            tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while waiting for the
                    // next event, not across the store write.
                    let next = {
                        let mut rx = rx.lock().await;
                        tokio::select! {
                            click = rx.recv() => click,
                            _ = shutdown_rx.changed() => None,
                        }
                    };

                    let Some(click) = next else {
                        break;
                    };

                    if let Err(err) = store.create(&click).await {
                        tracing::warn!(
                            link_id = click.link_id,
                            error = %err,
                            "failed to record click, dropping event"
                        );
                    }
                }

                tracing::debug!(worker, "click worker stopped");
            });
        }

        Self { tx, shutdown_tx }
    }

    /// Enqueue a click without waiting. Returns immediately; a full or
    /// closed queue drops the event.
    pub fn record(&self, click: NewClick) {
        match self.tx.try_send(click) {
            Ok(()) => {}
            Err(TrySendError::Full(click)) => {
                tracing::warn!(link_id = click.link_id, "click queue full, dropping event");
            }
            Err(TrySendError::Closed(click)) => {
                tracing::warn!(link_id = click.link_id, "click queue closed, dropping event");
            }
        }
    }

    /// Stop the workers. Queued but unprocessed events are dropped, which
    /// is within the at-most-once contract.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct RecordingStore {
        clicks: StdMutex<Vec<NewClick>>,
        attempts: AtomicUsize,
        fail: bool,
    }

    impl RecordingStore {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                clicks: StdMutex::new(Vec::new()),
                attempts: AtomicUsize::new(0),
                fail,
            })
        }

        fn recorded(&self) -> usize {
            self.clicks.lock().unwrap().len()
        }

        async fn wait_for_attempts(&self, want: usize) {
            for _ in 0..200 {
                if self.attempts.load(Ordering::SeqCst) >= want {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panic!(
                "expected {} write attempts, saw {}",
                want,
                self.attempts.load(Ordering::SeqCst)
            );
        }
    }

    #[async_trait]
    impl ClickStore for RecordingStore {
        async fn create(&self, click: &NewClick) -> StoreResult<()> {
            if self.fail {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                return Err(StoreError::Other(anyhow::anyhow!("store down")));
            }
            self.clicks.lock().unwrap().push(click.clone());
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn click(link_id: i64) -> NewClick {
        NewClick {
            link_id,
            user_agent: Some("test-agent".to_string()),
            ip_address: Some("203.0.113.7".to_string()),
        }
    }

    #[tokio::test]
    async fn recorded_clicks_reach_the_store() {
        let store = RecordingStore::new(false);
        let recorder = ClickRecorder::new(store.clone(), 16, 2);

        recorder.record(click(1));
        recorder.record(click(2));

        store.wait_for_attempts(2).await;
        assert_eq!(store.recorded(), 2);
        recorder.shutdown();
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let store = RecordingStore::new(true);
        let recorder = ClickRecorder::new(store.clone(), 16, 1);

        recorder.record(click(1));
        store.wait_for_attempts(1).await;

        assert_eq!(store.recorded(), 0);
        recorder.shutdown();
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        // No workers draining: single-slot queue, capacity 1, worker pool
        // blocked behind a store that never completes quickly enough to
        // matter here. Recording past capacity must return immediately.
        let store = RecordingStore::new(false);
        let recorder = ClickRecorder::new(store.clone(), 1, 1);

        for i in 0..50 {
            recorder.record(click(i));
        }
        // Reaching this line at all is the assertion: try_send never blocks.
        recorder.shutdown();
    }
}
