//! Deadlines and run-wide cancellation
//!
//! A [`Deadline`] bounds a single check execution in time and carries a
//! [`CancelToken`] so that cancelling the whole run reaches every in-flight
//! subprocess.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Owner side of a cancellation signal.
///
/// Created once per run; every [`CancelToken`] handed out by [`Self::token`]
/// observes [`Self::cancel`].
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the source is cancelled; pending forever otherwise.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Source dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }
}

/// Point in time by which an operation must finish.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    timeout: Duration,
    cancel: CancelToken,
}

impl Deadline {
    pub fn after(timeout: Duration, cancel: CancelToken) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
            timeout,
            cancel,
        }
    }

    pub fn uncancellable(timeout: Duration) -> Self {
        Self::after(timeout, CancelToken::never())
    }

    /// Deadline that expires at the earlier of `self` and `now + timeout`,
    /// sharing the same cancellation token.
    pub fn narrowed(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        if candidate < self.expires_at {
            Self {
                expires_at: candidate,
                timeout,
                cancel: self.cancel.clone(),
            }
        } else {
            self.clone()
        }
    }

    /// The budget this deadline was created with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub async fn expired(&self) {
        tokio::time::sleep_until(self.expires_at).await;
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}
