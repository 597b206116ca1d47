//! # sluice
//!
//! Concurrency-coordination substrate for async applications fronting
//! blocking, non-reentrant data layers.
//!
//! Three mechanisms compose: an execution bridge that moves blocking calls
//! onto the runtime's blocking pool, a single-flight cache that collapses
//! concurrent identical computations into one execution and memoizes the
//! result under an LRU bound, and per-operation fixed-window rate limiting
//! with a background reaper for elapsed windows.
//!
//! This crate is the composition root: configuration loading lives in
//! `sluice-configs`, the mechanisms in `sluice-core`, identifier types in
//! `sluice-commons`. [`lifecycle::bootstrap`] wires a config into ready
//! components; [`logging::init_logging`] sets up the subscriber stack.
//!
//! ```ignore
//! let config = SluiceConfig::from_file("sluice.toml")?;
//! sluice::logging::init_logging(&config.logging)?;
//! let components = sluice::lifecycle::bootstrap(&config)?;
//! components.reaper.start().await?;
//! ```

pub mod lifecycle;
pub mod logging;

pub use lifecycle::{bootstrap, build_cache, SubstrateComponents};

pub use sluice_commons::{CredentialId, OperationId};
pub use sluice_configs::{
    CacheSettings, LimiterSettings, LoggingSettings, RateLimitSettings, ReaperSettings,
    SluiceConfig,
};
pub use sluice_core::{
    BridgeError, BridgeStats, CacheError, CacheKey, CacheStats, ExecutionBridge, KeyPart,
    LimiterReaper, LimiterRegistry, RateLimitError, RateLimiter, RateLimiterStats, ReaperError,
    ReaperStats, SingleFlightCache, OVER_LIMIT_ALLOWANCE,
};
