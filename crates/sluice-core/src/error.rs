//! Error types for the sluice substrate.
//!
//! Each component has its own small taxonomy. Operation errors are the
//! caller's own types and pass through unchanged; the enums here cover the
//! substrate's failures only. Nothing is logged on the caller's behalf.

use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;

/// Failure of the worker running a dispatched operation, distinct from any
/// error the operation itself returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The worker panicked while running the operation.
    #[error("worker task panicked: {0}")]
    Panicked(String),

    /// The runtime tore the worker down before the operation completed.
    #[error("worker task was cancelled before completing")]
    Cancelled,
}

impl BridgeError {
    /// Maps a join failure onto the bridge taxonomy, recovering the panic
    /// message when one is available.
    pub(crate) fn from_join(err: JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            };
            BridgeError::Panicked(message)
        } else {
            BridgeError::Cancelled
        }
    }
}

/// Failure of a single-flight computation, delivered to every waiter of
/// that flight.
#[derive(Error, Debug, Clone)]
pub enum CacheError<E> {
    /// The computation itself failed. The inner error is the operation's
    /// own; the failed entry is evicted and never served to later callers.
    #[error("computation failed: {0}")]
    Computation(E),

    /// The task driving the computation died before producing a result.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl<E> CacheError<E> {
    /// Extracts the operation's own error, if that is what this is.
    pub fn into_computation(self) -> Option<E> {
        match self {
            CacheError::Computation(e) => Some(e),
            CacheError::Bridge(_) => None,
        }
    }
}

/// Rejection of a request that exhausted its credential's window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// Retryable: the same request is admissible once `retry_after` passes.
    #[error("rate limit exceeded, retry in {}s", .retry_after.as_secs())]
    Exceeded {
        /// Time remaining until the current window can reset.
        retry_after: Duration,
    },
}

impl RateLimitError {
    /// Remaining wait in whole seconds, for transport layers that surface an
    /// integral Retry-After value.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            RateLimitError::Exceeded { retry_after } => retry_after.as_secs(),
        }
    }
}

/// Lifecycle failures of the background reaper.
#[derive(Error, Debug)]
pub enum ReaperError {
    /// `start` was called while the sweep task is already running.
    #[error("reaper is already running")]
    AlreadyRunning,

    /// The sweep task could not be joined during shutdown.
    #[error("failed to join reaper task: {0}")]
    Join(String),

    /// The lifecycle lock was poisoned by a panicking thread.
    #[error("reaper state lock poisoned: {0}")]
    Lock(String),
}
