//! Bridge from blocking operations onto the async runtime.
//!
//! The data layer this substrate fronts is synchronous. Calling it directly
//! from an async handler would pin a runtime worker for the whole call and
//! starve every other task scheduled on that worker. `ExecutionBridge`
//! moves the call onto the runtime's dedicated blocking pool and hands back
//! an awaitable result, so cooperative tasks keep making progress while the
//! blocking work runs elsewhere.

use crate::error::BridgeError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics snapshot for an [`ExecutionBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    /// Operations handed to the blocking pool.
    pub dispatched: u64,
    /// Dispatches that ended in a worker failure (panic or teardown).
    pub failed: u64,
}

/// Runs blocking closures on the runtime's blocking pool.
///
/// Construct one per composition and share it behind an `Arc`. Instances
/// carry counters only; all scheduling state belongs to the runtime.
#[derive(Debug, Default)]
pub struct ExecutionBridge {
    dispatched: AtomicU64,
    failed: AtomicU64,
}

impl ExecutionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` on the blocking pool and awaits its result.
    ///
    /// The closure's return value is delivered unchanged to the caller. For
    /// fallible operations returning `Result<T, E>` the double `?` pattern
    /// applies:
    ///
    /// ```ignore
    /// let page = bridge.dispatch(move || store.load_page(&id)).await??;
    /// ```
    ///
    /// No timeout is applied here. A caller that stops waiting abandons only
    /// its own wait; the worker always runs the operation to completion.
    pub async fn dispatch<T, F>(&self, op: F) -> Result<T, BridgeError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        match tokio::task::spawn_blocking(op).await {
            Ok(value) => Ok(value),
            Err(join_err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                Err(BridgeError::from_join(join_err))
            }
        }
    }

    /// Point-in-time counters.
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dispatch_returns_value() {
        let bridge = ExecutionBridge::new();
        let value = bridge.dispatch(|| 21 * 2).await.unwrap();
        assert_eq!(value, 42);

        let stats = bridge.stats();
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_operation_error_passes_through_unchanged() {
        let bridge = ExecutionBridge::new();
        let result: Result<u32, String> = bridge
            .dispatch(|| Err("backend offline".to_string()))
            .await
            .unwrap();
        assert_eq!(result, Err("backend offline".to_string()));
        assert_eq!(
            bridge.stats().failed,
            0,
            "operation errors are not bridge failures"
        );
    }

    #[tokio::test]
    async fn test_panic_surfaces_as_bridge_error() {
        let bridge = ExecutionBridge::new();
        let result = bridge.dispatch(|| -> u32 { panic!("kaboom") }).await;
        match result {
            Err(BridgeError::Panicked(message)) => assert!(message.contains("kaboom")),
            other => panic!("expected a panic error, got {:?}", other),
        }
        assert_eq!(bridge.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_blocking_work_does_not_stall_the_runtime() {
        let bridge = ExecutionBridge::new();
        let started = std::time::Instant::now();
        let (blocking, woke_at) = tokio::join!(
            bridge.dispatch(|| {
                std::thread::sleep(Duration::from_millis(100));
                1
            }),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                std::time::Instant::now()
            }
        );
        assert_eq!(blocking.unwrap(), 1);
        assert!(
            woke_at.duration_since(started) < Duration::from_millis(100),
            "timer task should fire while the blocking call is still running"
        );
    }

    #[tokio::test]
    async fn test_abandoned_wait_does_not_cancel_the_work() {
        let bridge = ExecutionBridge::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();

        let dispatch = bridge.dispatch(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag.store(true, Ordering::SeqCst);
        });
        tokio::select! {
            _ = dispatch => panic!("dispatch should not beat the 5ms timer"),
            _ = tokio::time::sleep(Duration::from_millis(5)) => {}
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(
            done.load(Ordering::SeqCst),
            "worker must run to completion after the waiter gave up"
        );
    }
}
