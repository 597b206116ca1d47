//! # sluice-core
//!
//! Concurrency-coordination substrate: the pieces that let a cooperative
//! async dispatcher drive a blocking, non-reentrant data layer safely under
//! concurrent load.
//!
//! ## Components
//!
//! - [`ExecutionBridge`]: runs blocking operations on the runtime's
//!   blocking pool without stalling cooperative tasks
//! - [`SingleFlightCache`]: deduplicates concurrent identical computations
//!   and memoizes results under an LRU bound
//! - [`RateLimiter`] / [`LimiterRegistry`]: per-credential fixed-window
//!   admission control, one limiter per protected operation
//! - [`LimiterReaper`]: background deletion of elapsed windows
//!
//! A typical handler path checks the limiter first, then asks the cache;
//! the cache's computation dispatches the blocking call through the bridge:
//!
//! ```ignore
//! limiters.check(&operation, &credential)?;
//! let page = cache
//!     .get_or_compute(key, || {
//!         let bridge = bridge.clone();
//!         async move { bridge.dispatch(move || store.render(&id)).await? }
//!     })
//!     .await?;
//! ```
//!
//! Everything here is instance-based: construct the pieces, wire them
//! together, and share them behind `Arc`s. Nothing is process-global.

pub mod bridge;
pub mod cache;
pub mod error;
pub mod limiter;

pub use bridge::{BridgeStats, ExecutionBridge};
pub use cache::key::{CacheKey, KeyPart};
pub use cache::{CacheStats, SingleFlightCache};
pub use error::{BridgeError, CacheError, RateLimitError, ReaperError};
pub use limiter::{
    LimiterReaper, LimiterRegistry, RateLimiter, RateLimiterStats, ReaperStats,
    OVER_LIMIT_ALLOWANCE,
};
