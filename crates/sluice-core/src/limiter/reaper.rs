//! Background sweep of expired rate-limit entries.
//!
//! Windows that elapse without further traffic leave dead entries in the
//! ledger. The reaper deletes them periodically so memory tracks the active
//! caller set instead of the historical one.
//!
//! The reaper never starts itself. The composing application owns the
//! lifecycle: construct it alongside the registry, call `start()` once the
//! runtime is up, and `stop()` during shutdown.

use crate::error::ReaperError;
use crate::limiter::LimiterRegistry;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

enum ReaperState {
    Stopped,
    Running(JoinHandle<()>),
}

/// Statistics snapshot for a [`LimiterReaper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperStats {
    /// Completed sweeps since construction.
    pub sweeps: u64,
    /// Entries removed across all sweeps.
    pub removed: u64,
}

/// Periodic reaper for every limiter in a registry.
pub struct LimiterReaper {
    registry: Arc<LimiterRegistry>,
    sweep_interval: Duration,
    state: RwLock<ReaperState>,
    shutdown: Arc<Notify>,
    sweeps: Arc<AtomicU64>,
    removed: Arc<AtomicU64>,
}

impl LimiterReaper {
    /// Creates a stopped reaper. Nothing runs until [`LimiterReaper::start`]
    /// is called.
    pub fn new(registry: Arc<LimiterRegistry>, sweep_interval: Duration) -> Self {
        Self {
            registry,
            sweep_interval,
            state: RwLock::new(ReaperState::Stopped),
            shutdown: Arc::new(Notify::new()),
            sweeps: Arc::new(AtomicU64::new(0)),
            removed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts the sweep task.
    pub async fn start(&self) -> Result<(), ReaperError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| ReaperError::Lock(e.to_string()))?;

        if matches!(*state, ReaperState::Running(_)) {
            return Err(ReaperError::AlreadyRunning);
        }

        *state = ReaperState::Running(self.spawn_sweep_task());
        log::info!(
            "limiter reaper started (sweep interval: {:?})",
            self.sweep_interval
        );
        Ok(())
    }

    /// Stops the sweep task and waits for it to exit. Stopping an already
    /// stopped reaper is a no-op.
    pub async fn stop(&self) -> Result<(), ReaperError> {
        let handle = {
            let mut state = self
                .state
                .write()
                .map_err(|e| ReaperError::Lock(e.to_string()))?;
            match mem::replace(&mut *state, ReaperState::Stopped) {
                ReaperState::Running(handle) => {
                    self.shutdown.notify_one();
                    Some(handle)
                }
                ReaperState::Stopped => None,
            }
        };

        if let Some(handle) = handle {
            handle.await.map_err(|e| ReaperError::Join(e.to_string()))?;
            log::info!("limiter reaper stopped");
        }
        Ok(())
    }

    /// Whether the sweep task is currently running.
    pub fn is_running(&self) -> bool {
        self.state
            .read()
            .map(|state| matches!(*state, ReaperState::Running(_)))
            .unwrap_or(false)
    }

    /// Point-in-time counters.
    pub fn stats(&self) -> ReaperStats {
        ReaperStats {
            sweeps: self.sweeps.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
        }
    }

    fn spawn_sweep_task(&self) -> JoinHandle<()> {
        let registry = self.registry.clone();
        let shutdown = self.shutdown.clone();
        let sweep_interval = self.sweep_interval;
        let sweeps = self.sweeps.clone();
        let removed = self.removed.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let dropped = registry.purge_expired();
                        sweeps.fetch_add(1, Ordering::Relaxed);
                        if dropped > 0 {
                            removed.fetch_add(dropped as u64, Ordering::Relaxed);
                            log::debug!("limiter reaper removed {} expired entries", dropped);
                        }
                    }
                    _ = shutdown.notified() => {
                        log::info!("limiter reaper received shutdown signal");
                        break;
                    }
                }
            }
        })
    }
}
