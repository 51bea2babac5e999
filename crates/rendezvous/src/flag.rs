//! Blocking rendezvous flag for OS threads.
//!
//! The permit count lives behind a mutex and waiters park on a condition
//! variable, so a waiting thread costs nothing while blocked and a signal
//! can never be lost to a racing increment.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{RendezvousError, Result};

#[derive(Debug)]
pub(crate) struct Permits {
    pub(crate) available: usize,
    pub(crate) closed: bool,
}

impl Permits {
    pub(crate) const fn new() -> Self {
        Self {
            available: 0,
            closed: false,
        }
    }

    /// Take a permit if one is available; a closed flag with none left fails.
    pub(crate) fn take(&mut self) -> Option<Result<()>> {
        if self.available > 0 {
            self.available -= 1;
            Some(Ok(()))
        } else if self.closed {
            Some(Err(RendezvousError::Closed))
        } else {
            None
        }
    }
}

/// Counting rendezvous between a signaling thread and a waiting thread.
///
/// Starts with zero permits. Share it by reference or behind an `Arc`.
#[derive(Debug)]
pub struct RendezvousFlag {
    label: &'static str,
    state: Mutex<Permits>,
    ready: Condvar,
}

impl Default for RendezvousFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RendezvousFlag {
    pub const fn new() -> Self {
        Self::labeled("rendezvous")
    }

    /// Create a flag whose log events carry `label`.
    pub const fn labeled(label: &'static str) -> Self {
        Self {
            label,
            state: Mutex::new(Permits::new()),
            ready: Condvar::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn lock(&self) -> MutexGuard<'_, Permits> {
        // No user code runs under this lock, so a poisoned guard is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one permit and wake a waiter.
    pub fn signal(&self) {
        let available = {
            let mut state = self.lock();
            state.available += 1;
            state.available
        };
        self.ready.notify_one();
        tracing::debug!(flag = self.label, permits = available, "Rendezvous signalled");
    }

    /// Block until a permit is available, then take it.
    ///
    /// Without a matching `signal()` (and without `close()`) this never returns.
    pub fn wait(&self) -> Result<()> {
        let mut state = self.lock();
        loop {
            if let Some(result) = state.take() {
                self.log_taken(&result, state.available);
                return result;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<()> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };

        let mut state = self.lock();
        loop {
            if let Some(result) = state.take() {
                self.log_taken(&result, state.available);
                return result;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(flag = self.label, timeout = ?timeout, "Rendezvous wait timed out");
                return Err(RendezvousError::Timeout { waited: timeout });
            }

            state = self
                .ready
                .wait_timeout(state, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    /// Take a permit without blocking. Returns `false` if none was available.
    pub fn try_wait(&self) -> bool {
        let mut state = self.lock();
        if state.available > 0 {
            state.available -= 1;
            true
        } else {
            false
        }
    }

    /// Release every waiter that finds no permit with [`RendezvousError::Closed`].
    ///
    /// Permits signalled before the close are still handed out.
    pub fn close(&self) {
        let already_closed = std::mem::replace(&mut self.lock().closed, true);
        self.ready.notify_all();
        if !already_closed {
            tracing::debug!(flag = self.label, "Rendezvous closed");
        }
    }

    /// Close this flag when the returned guard drops, unless disarmed.
    pub fn close_on_drop(&self) -> CloseGuard<'_> {
        CloseGuard {
            flag: self,
            armed: true,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of permits not yet taken.
    pub fn permits(&self) -> usize {
        self.lock().available
    }

    pub fn is_ready(&self) -> bool {
        self.permits() > 0
    }

    fn log_taken(&self, result: &Result<()>, remaining: usize) {
        match result {
            Ok(()) => tracing::trace!(flag = self.label, permits = remaining, "Rendezvous passed"),
            Err(e) => tracing::debug!(flag = self.label, error = %e, "Rendezvous wait released"),
        }
    }
}

/// Closes a [`RendezvousFlag`] on drop, including during unwinding.
///
/// Hold one on the signaling side so a failed setup releases the peer.
#[must_use = "the flag is closed when the guard drops"]
#[derive(Debug)]
pub struct CloseGuard<'a> {
    flag: &'a RendezvousFlag,
    armed: bool,
}

impl CloseGuard<'_> {
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.close();
        }
    }
}
