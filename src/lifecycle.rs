//! Substrate bootstrap.
//!
//! Builds the components in dependency order from validated configuration:
//! the execution bridge, the limiter registry (pre-registered with every
//! configured operation), and the reaper. The reaper comes back stopped;
//! starting it, and stopping it at shutdown, belongs to the embedding
//! application.

use anyhow::Context;
use log::{debug, info};
use sluice_commons::OperationId;
use sluice_configs::SluiceConfig;
use sluice_core::{ExecutionBridge, LimiterReaper, LimiterRegistry, SingleFlightCache};
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

/// The wired substrate components an application embeds.
pub struct SubstrateComponents {
    pub bridge: Arc<ExecutionBridge>,
    pub limiters: Arc<LimiterRegistry>,
    /// Constructed stopped; call `start()` once the runtime is up.
    pub reaper: Arc<LimiterReaper>,
}

/// Builds the substrate from configuration.
///
/// Synchronous by design: nothing here touches the runtime, so it can run
/// before one exists. The configuration is validated first; assemble-in-code
/// configs get the same checks as loaded ones.
pub fn bootstrap(config: &SluiceConfig) -> anyhow::Result<SubstrateComponents> {
    let phase_start = Instant::now();
    config
        .validate()
        .context("invalid substrate configuration")?;

    let bridge = Arc::new(ExecutionBridge::new());

    let limiters = Arc::new(LimiterRegistry::new());
    for (name, quota) in &config.limiter.operations {
        let operation = OperationId::try_new(name.clone())
            .map_err(|e| anyhow::anyhow!("invalid operation name '{}': {}", name, e))?;
        limiters.register(operation, quota);
    }
    debug!("registered {} rate-limited operations", limiters.len());

    let reaper = Arc::new(LimiterReaper::new(
        limiters.clone(),
        config.limiter.reaper.sweep_interval(),
    ));

    info!(
        "substrate bootstrap complete: {} operations, reaper sweep every {}s ({:.2}ms)",
        limiters.len(),
        config.limiter.reaper.sweep_interval_seconds,
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(SubstrateComponents {
        bridge,
        limiters,
        reaper,
    })
}

/// Builds a single-flight cache with the configured capacity.
///
/// Caches are typed per computation family, so the application calls this
/// once for each family it memoizes; every cache built from the same config
/// shares the capacity setting, nothing else.
pub fn build_cache<K, V, E>(config: &SluiceConfig) -> anyhow::Result<SingleFlightCache<K, V, E>>
where
    K: Hash + Eq + Clone + fmt::Debug + Send,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let capacity = NonZeroUsize::new(config.cache.max_entries)
        .context("cache max_entries must be at least 1")?;
    debug!("building single-flight cache with capacity {}", capacity);
    Ok(SingleFlightCache::new(capacity))
}
