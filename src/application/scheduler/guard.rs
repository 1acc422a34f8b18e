//! Reentrancy guard
//!
//! At most one pass runs at a time. A pass holds a `PassToken` for its whole
//! duration; dropping the token, on success, error or unwind alike, returns
//! the guard to `Idle`. Once `Terminal`, the guard never admits another pass.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Building,
    Terminal,
}

#[derive(Debug, Clone)]
pub struct PassGuard {
    state: Arc<Mutex<PassState>>,
}

impl Default for PassGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl PassGuard {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PassState::Idle)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PassState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> PassState {
        *self.lock()
    }

    pub fn is_idle(&self) -> bool {
        self.state() == PassState::Idle
    }

    /// `Idle -> Building`. `None` while a pass runs or after termination.
    pub fn try_begin(&self) -> Option<PassToken> {
        let mut state = self.lock();
        if *state != PassState::Idle {
            tracing::trace!(state = ?*state, "pass refused");
            return None;
        }
        *state = PassState::Building;
        tracing::trace!("guard: idle -> building");
        Some(PassToken {
            state: self.state.clone(),
        })
    }

    /// Enter `Terminal` for good
    pub fn terminate(&self) {
        let mut state = self.lock();
        if *state != PassState::Terminal {
            tracing::trace!(from = ?*state, "guard: -> terminal");
            *state = PassState::Terminal;
        }
    }
}

/// Proof that the holder owns the running pass
#[derive(Debug)]
pub struct PassToken {
    state: Arc<Mutex<PassState>>,
}

impl Drop for PassToken {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == PassState::Building {
            *state = PassState::Idle;
            tracing::trace!("guard: building -> idle");
        }
    }
}
