//! Debounce scheduler
//!
//! One worker thread owns the only timer. `schedule` re-arms it, `cancel`
//! disarms it, and changed paths noted in between are handed to the trigger
//! when it fires. A fire while a pass is running is dropped; the noted paths
//! stay pending for the next fire. The trigger always runs on the worker
//! thread, so even a zero delay never re-enters the caller.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use crate::error::{HobbesError, HobbesResult};

use super::guard::PassGuard;

/// Invoked when the timer fires with the paths changed since the last fire
pub type Trigger = Box<dyn FnMut(Vec<PathBuf>) -> HobbesResult<()> + Send>;

/// Receives failures of the trigger; panics arrive as `SchedulerFault`
pub type FaultHandler = Box<dyn Fn(HobbesError) + Send>;

#[derive(Debug)]
enum Command {
    Arm(Duration),
    Note(PathBuf),
    Cancel,
    Shutdown,
}

/// Cloneable sender side of a `Debouncer`
///
/// Sends after the worker stopped are ignored.
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    tx: Sender<Command>,
}

impl DebounceHandle {
    /// Arm the timer, replacing any armed deadline
    pub fn schedule(&self, delay: Duration) {
        self.send(Command::Arm(delay));
    }

    /// Disarm the timer. A no-op when nothing is armed.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    /// Record a changed path for the next fire
    pub fn note_change(&self, path: PathBuf) {
        self.send(Command::Note(path));
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::trace!("debouncer stopped, command dropped");
        }
    }
}

pub struct Debouncer {
    handle: DebounceHandle,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

impl Debouncer {
    pub fn spawn(guard: PassGuard, trigger: Trigger, on_fault: FaultHandler) -> HobbesResult<Self> {
        let (tx, rx) = channel();
        let worker = thread::Builder::new()
            .name("hobbes-debounce".to_string())
            .spawn(move || Worker::new(guard, trigger, on_fault).run(rx))?;
        let worker_id = worker.thread().id();
        Ok(Self {
            handle: DebounceHandle { tx },
            worker: Some(worker),
            worker_id,
        })
    }

    pub fn handle(&self) -> DebounceHandle {
        self.handle.clone()
    }

    pub fn schedule(&self, delay: Duration) {
        self.handle.schedule(delay);
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn note_change(&self, path: PathBuf) {
        self.handle.note_change(path);
    }

    /// Stop the worker and wait for it, unless called from the worker itself
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if thread::current().id() == self.worker_id {
                return;
            }
            if worker.join().is_err() {
                tracing::warn!("debounce worker panicked");
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    guard: PassGuard,
    trigger: Trigger,
    on_fault: FaultHandler,
    deadline: Option<Instant>,
    changed: BTreeSet<PathBuf>,
}

impl Worker {
    fn new(guard: PassGuard, trigger: Trigger, on_fault: FaultHandler) -> Self {
        Self {
            guard,
            trigger,
            on_fault,
            deadline: None,
            changed: BTreeSet::new(),
        }
    }

    fn run(mut self, rx: Receiver<Command>) {
        loop {
            let command = match self.deadline {
                None => match rx.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
                Some(at) => {
                    let now = Instant::now();
                    if at <= now {
                        self.fire();
                        continue;
                    }
                    match rx.recv_timeout(at - now) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => {
                            self.fire();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            };

            match command {
                Command::Arm(delay) => self.deadline = Some(Instant::now() + delay),
                Command::Note(path) => {
                    self.changed.insert(path);
                }
                Command::Cancel => self.deadline = None,
                Command::Shutdown => break,
            }
        }
        tracing::trace!("debounce worker stopped");
    }

    fn fire(&mut self) {
        self.deadline = None;
        if !self.guard.is_idle() {
            tracing::debug!(state = ?self.guard.state(), "timer fired during a pass, dropped");
            return;
        }

        let changed: Vec<PathBuf> = std::mem::take(&mut self.changed).into_iter().collect();
        tracing::debug!(changed = changed.len(), "timer fired");
        let trigger = &mut self.trigger;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| trigger(changed)));
        let fault = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(payload) => HobbesError::SchedulerFault {
                message: panic_message(payload.as_ref()),
            },
        };
        tracing::warn!(error = %fault, "build trigger failed");
        (self.on_fault)(fault);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "build trigger panicked".to_string()
    }
}
