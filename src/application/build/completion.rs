//! One-shot result channel
//!
//! The build result crosses from the thread that finishes a pass to the
//! caller waiting on it. A second completion is an error, not a silent
//! no-op, so a late pass surfaces instead of vanishing.

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{HobbesError, HobbesResult};

/// Create a connected completer/pending pair
pub fn channel<T>() -> (Completer<T>, Pending<T>) {
    let (tx, rx) = sync_channel(1);
    (
        Completer {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        Pending { rx, done: false },
    )
}

/// Sending side; clones share the single slot
pub struct Completer<T> {
    tx: Arc<Mutex<Option<SyncSender<HobbesResult<T>>>>>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Completer<T> {
    /// Deliver the result. Fails with `CompletionRejected` when a result was
    /// already delivered; `pass` identifies the late completer in that error.
    pub fn complete(&self, pass: u64, result: HobbesResult<T>) -> HobbesResult<()> {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(HobbesError::CompletionRejected { pass })?;
        // The receiver may be gone; the result is then simply discarded.
        let _ = tx.send(result);
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).is_none()
    }
}

/// Receiving side
pub struct Pending<T> {
    rx: Receiver<HobbesResult<T>>,
    done: bool,
}

impl<T> Pending<T> {
    /// Block until the result arrives. `BuildAborted` when every completer
    /// was dropped without completing.
    pub fn wait(self) -> HobbesResult<T> {
        self.rx.recv().unwrap_or(Err(HobbesError::BuildAborted))
    }

    /// Wait up to `timeout`. `None` on timeout or once the result was taken.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<HobbesResult<T>> {
        if self.done {
            return None;
        }
        let result = match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(HobbesError::BuildAborted),
        };
        self.done = true;
        Some(result)
    }

    /// Whether `wait_timeout` already returned the result
    pub fn is_done(&self) -> bool {
        self.done
    }
}
