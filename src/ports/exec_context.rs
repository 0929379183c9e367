//! ExecContext - cancellation and deadline scope for a publish call.
//!
//! A context is cheap to clone and carries two optional stop conditions:
//! a shutdown signal (`watch::Receiver<bool>` flipped to `true`) and an
//! absolute deadline. Executors receive it with every statement; the
//! publisher also races its backoff sleeps against it.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Why a context stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    shutdown: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl ExecContext {
    /// A context that never stops.
    pub fn background() -> Self {
        Self::default()
    }

    /// Stops once `shutdown` observes `true`. A dropped sender never cancels.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Stops at `deadline`. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The stop reason if the context is already done. Cancellation wins
    /// over an expired deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.shutdown.as_ref().map_or(false, |rx| *rx.borrow()) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves when the context stops. Pends forever for a background context.
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            if let Some(rx) = &self.shutdown {
                let mut rx = rx.clone();
                if rx.wait_for(|stop| *stop).await.is_ok() {
                    return;
                }
            }
            std::future::pending::<()>().await
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => ContextError::Cancelled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }

    /// Drives `future` until it completes or the context stops.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }
}
