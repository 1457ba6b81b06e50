/// Cancellable background tasks for the simulated integrations
///
/// Every flow runs on the tokio runtime and is handed back as a
/// `FlowHandle`. Progress (0-100) is published through a `watch` channel;
/// cancelling aborts the task and resets progress to 0.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::FlowError;

/// Which simulated integration a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Share,
    Connect,
    Upload,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlowKind::Share => "file sharing",
            FlowKind::Connect => "SuiteDash connect",
            FlowKind::Upload => "SuiteDash upload",
        };
        f.write_str(name)
    }
}

/// Write side of a flow's progress channel
pub struct ProgressReporter {
    tx: Arc<watch::Sender<u8>>,
    cancelled: Arc<AtomicBool>,
}

impl ProgressReporter {
    /// Publish progress, clamped to 100. Ignored once the flow is cancelled.
    pub fn set(&self, percent: u8) {
        if !self.cancelled.load(Ordering::SeqCst) {
            self.tx.send_replace(percent.min(100));
        }
    }
}

/// Clonable cancel switch for a running flow
#[derive(Clone)]
pub struct FlowCanceller {
    kind: FlowKind,
    abort: AbortHandle,
    progress: Arc<watch::Sender<u8>>,
    cancelled: Arc<AtomicBool>,
}

impl FlowCanceller {
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Abort the flow and discard its progress.
    ///
    /// Returns false when the flow had already settled.
    pub fn cancel(&self) -> bool {
        if self.abort.is_finished() {
            return false;
        }
        self.cancelled.store(true, Ordering::SeqCst);
        self.abort.abort();
        self.progress.send_replace(0);
        tracing::info!(flow = %self.kind, "flow cancelled");
        true
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl std::fmt::Debug for FlowCanceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowCanceller")
            .field("kind", &self.kind)
            .field("finished", &self.abort.is_finished())
            .finish()
    }
}

/// A started flow
pub struct FlowHandle<T> {
    join: JoinHandle<Result<T, FlowError>>,
    canceller: FlowCanceller,
}

impl<T> FlowHandle<T> {
    pub fn kind(&self) -> FlowKind {
        self.canceller.kind
    }

    /// Subscribe to progress updates (0-100)
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.canceller.progress.subscribe()
    }

    pub fn canceller(&self) -> FlowCanceller {
        self.canceller.clone()
    }

    pub fn cancel(&self) -> bool {
        self.canceller.cancel()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the flow to settle
    pub async fn wait(self) -> Result<T, FlowError> {
        let kind = self.canceller.kind;
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(FlowError::Cancelled(kind)),
            Err(e) => Err(FlowError::Failed {
                kind,
                reason: e.to_string(),
            }),
        }
    }
}

impl<T> std::fmt::Debug for FlowHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowHandle")
            .field("kind", &self.canceller.kind)
            .field("finished", &self.join.is_finished())
            .finish()
    }
}

/// Spawn `body` on the current tokio runtime as a flow of `kind`
pub fn spawn_flow<T, F, Fut>(kind: FlowKind, body: F) -> FlowHandle<T>
where
    F: FnOnce(ProgressReporter) -> Fut,
    Fut: Future<Output = Result<T, FlowError>> + Send + 'static,
    T: Send + 'static,
{
    let (tx, _rx) = watch::channel(0u8);
    let tx = Arc::new(tx);
    let cancelled = Arc::new(AtomicBool::new(false));

    let reporter = ProgressReporter {
        tx: tx.clone(),
        cancelled: cancelled.clone(),
    };
    let join = tokio::spawn(body(reporter));

    tracing::debug!(flow = %kind, "flow started");

    FlowHandle {
        canceller: FlowCanceller {
            kind,
            abort: join.abort_handle(),
            progress: tx,
            cancelled,
        },
        join,
    }
}

/// Single-occupancy slot: at most one pending flow per kind
#[derive(Debug)]
pub struct FlowSlot {
    kind: FlowKind,
    current: Option<FlowCanceller>,
}

impl FlowSlot {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            current: None,
        }
    }

    /// True while the last started flow has not settled
    pub fn is_pending(&self) -> bool {
        self.current.as_ref().is_some_and(|c| !c.is_finished())
    }

    /// Fail with `Busy` if a flow is still pending
    pub fn ensure_free(&self) -> Result<(), FlowError> {
        if self.is_pending() {
            Err(FlowError::Busy(self.kind))
        } else {
            Ok(())
        }
    }

    /// Remember `handle` as the pending flow
    pub fn occupy<T>(&mut self, handle: &FlowHandle<T>) {
        self.current = Some(handle.canceller());
    }

    /// Cancel the pending flow, if any
    pub fn cancel(&mut self) -> bool {
        self.current.take().is_some_and(|c| c.cancel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_outcome() {
        let handle = spawn_flow(FlowKind::Share, |progress| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            progress.set(100);
            Ok::<_, FlowError>(7)
        });
        let rx = handle.progress();

        assert_eq!(handle.wait().await.unwrap(), 7);
        assert_eq!(*rx.borrow(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resets_progress() {
        let handle = spawn_flow(FlowKind::Upload, |progress| async move {
            progress.set(40);
            tokio::time::sleep(Duration::from_secs(10)).await;
            progress.set(100);
            Ok::<_, FlowError>(())
        });
        let rx = handle.progress();

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(*rx.borrow(), 40);

        assert!(handle.cancel());
        assert_eq!(*rx.borrow(), 0);
        assert!(matches!(handle.wait().await, Err(FlowError::Cancelled(FlowKind::Upload))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_settle_is_noop() {
        let handle = spawn_flow(FlowKind::Connect, |_| async { Ok::<_, FlowError>(()) });
        let canceller = handle.canceller();

        handle.wait().await.unwrap();

        assert!(!canceller.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_rejects_second_flow_while_pending() {
        let mut slot = FlowSlot::new(FlowKind::Share);
        let handle = spawn_flow(FlowKind::Share, |_| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, FlowError>(())
        });
        slot.occupy(&handle);

        assert!(matches!(slot.ensure_free(), Err(FlowError::Busy(FlowKind::Share))));

        handle.wait().await.unwrap();
        assert!(slot.ensure_free().is_ok());
    }
}
