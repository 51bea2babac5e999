//! Rendezvous flag for tokio tasks.

use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::{RendezvousError, Result};
use crate::flag::Permits;

/// Async counterpart of [`RendezvousFlag`](crate::RendezvousFlag).
///
/// Waiting suspends the task instead of the thread. A permit signalled while
/// no task is waiting is kept until one arrives.
#[derive(Debug)]
pub struct AsyncRendezvousFlag {
    label: &'static str,
    state: Mutex<Permits>,
    notify: Notify,
}

impl Default for AsyncRendezvousFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncRendezvousFlag {
    pub fn new() -> Self {
        Self::labeled("rendezvous")
    }

    pub fn labeled(label: &'static str) -> Self {
        Self {
            label,
            state: Mutex::new(Permits::new()),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Permits> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn signal(&self) {
        let available = {
            let mut state = self.lock();
            state.available += 1;
            state.available
        };
        self.notify.notify_one();
        tracing::debug!(flag = self.label, permits = available, "Rendezvous signalled");
    }

    /// Suspend until a permit is available, then take it.
    ///
    /// Cancel-safe: dropping the future never consumes a permit.
    pub async fn wait(&self) -> Result<()> {
        loop {
            let mut notified = pin!(self.notify.notified());
            // Register before checking so a signal between the check and the await still wakes us.
            notified.as_mut().enable();

            let taken = self.lock().take();
            if let Some(result) = taken {
                if let Err(e) = &result {
                    tracing::debug!(flag = self.label, error = %e, "Rendezvous wait released");
                }
                return result;
            }

            notified.await;
        }
    }

    pub async fn wait_timeout(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(flag = self.label, timeout = ?timeout, "Rendezvous wait timed out");
                Err(RendezvousError::Timeout { waited: timeout })
            }
        }
    }

    pub fn try_wait(&self) -> bool {
        let mut state = self.lock();
        if state.available > 0 {
            state.available -= 1;
            true
        } else {
            false
        }
    }

    /// Release every waiting task that finds no permit with [`RendezvousError::Closed`].
    pub fn close(&self) {
        let already_closed = std::mem::replace(&mut self.lock().closed, true);
        self.notify.notify_waiters();
        if !already_closed {
            tracing::debug!(flag = self.label, "Rendezvous closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn permits(&self) -> usize {
        self.lock().available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test]
    async fn signal_before_wait_is_kept() {
        let flag = AsyncRendezvousFlag::new();
        flag.signal();
        flag.signal();

        assert_eq!(flag.wait().await, Ok(()));
        assert_eq!(flag.permits(), 1);
        assert_eq!(flag.wait().await, Ok(()));
        assert_eq!(flag.permits(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_without_signal_does_not_return() {
        let flag = AsyncRendezvousFlag::labeled("idle");

        let waited = tokio::time::timeout(Duration::from_millis(100), flag.wait()).await;

        assert!(waited.is_err(), "wait returned with no signal: {waited:?}");
        assert_eq!(flag.permits(), 0);
        assert!(!flag.is_closed());
    }

    #[tokio::test]
    async fn repeated_close_keeps_flag_closed() {
        let flag = AsyncRendezvousFlag::new();
        flag.close();
        flag.close();

        assert!(flag.is_closed());
        assert_eq!(flag.wait().await, Err(RendezvousError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_not_released_before_delayed_signal() {
        let flag = Arc::new(AsyncRendezvousFlag::new());
        let start = Instant::now();

        let signaler = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.signal();
            })
        };

        flag.wait().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
        signaler.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn wait_timeout_expires_without_signal() {
        let flag = AsyncRendezvousFlag::labeled("idle");

        let err = flag.wait_timeout(Duration::from_secs(3)).await.unwrap_err();

        assert_eq!(
            err,
            RendezvousError::Timeout {
                waited: Duration::from_secs(3)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_wait_does_not_consume_later_signal() {
        let flag = AsyncRendezvousFlag::new();

        assert!(flag.wait_timeout(Duration::from_millis(10)).await.is_err());
        flag.signal();

        assert_eq!(flag.permits(), 1);
        assert!(flag.try_wait());
    }

    #[tokio::test]
    async fn close_releases_waiting_tasks() {
        let flag = Arc::new(AsyncRendezvousFlag::new());

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let flag = Arc::clone(&flag);
                tokio::spawn(async move { flag.wait().await })
            })
            .collect();

        tokio::task::yield_now().await;
        flag.close();

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Err(RendezvousError::Closed));
        }
        assert!(flag.is_closed());
    }

    #[tokio::test]
    async fn close_keeps_outstanding_permits() {
        let flag = AsyncRendezvousFlag::new();
        flag.signal();
        flag.close();

        assert_eq!(flag.wait().await, Ok(()));
        assert_eq!(flag.wait().await, Err(RendezvousError::Closed));
    }
}
