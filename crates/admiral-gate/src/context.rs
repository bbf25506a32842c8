//! Cancellation and deadlines for a single `ask`.
//!
//! An [`AskContext`] travels with one question. The asker can cancel it from
//! anywhere through the paired [`CancelHandle`], or give it a deadline. When
//! either fires before an answer arrives, `ask` retracts the question and
//! returns a cancellation error.
//!
//! Dropping a [`CancelHandle`] without calling [`CancelHandle::cancel`] does
//! not cancel the context.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation signal and optional deadline for one question.
#[derive(Debug, Clone, Default)]
pub struct AskContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels the [`AskContext`] it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Which condition ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContextDone {
    Cancelled,
    DeadlineExceeded,
}

impl AskContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// A context plus the handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancel: Some(rx),
            },
            CancelHandle { tx: Arc::new(tx) },
        )
    }

    /// Add a timeout. The earlier of the existing and new deadline wins.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(candidate),
            None => candidate,
        });
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Apply the gate's default timeout when no deadline was given.
    pub(crate) fn or_default_timeout(self, default: Option<Duration>) -> Self {
        match (self.deadline, default) {
            (None, Some(timeout)) => self.timeout(timeout),
            _ => self,
        }
    }

    /// The condition that already ended this context, if any.
    pub(crate) fn check(&self) -> Option<ContextDone> {
        if self.is_cancelled() {
            Some(ContextDone::Cancelled)
        } else if self.is_expired() {
            Some(ContextDone::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub(crate) async fn done(&self) -> ContextDone {
        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            match cancel.as_mut() {
                Some(rx) => {
                    // Sender gone without cancelling: never fires
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => ContextDone::Cancelled,
            _ = expired => ContextDone::DeadlineExceeded,
        }
    }
}

impl CancelHandle {
    /// Cancel the context. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`CancelHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}
