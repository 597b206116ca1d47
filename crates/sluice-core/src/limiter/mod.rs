//! Request admission control.
//!
//! ## Components
//!
//! - [`RateLimiter`]: fixed-window counters, one window per credential
//! - [`LimiterRegistry`]: one limiter per protected operation
//! - [`LimiterReaper`]: periodic deletion of elapsed windows
//!
//! ## Design Principles
//!
//! 1. **Check before record**: the admission decision reads the counter as
//!    it stood, then records the request; see [`OVER_LIMIT_ALLOWANCE`] for
//!    the resulting bound.
//! 2. **Monotonic time**: windows are anchored to `Instant`, immune to wall
//!    clock adjustments.
//! 3. **Explicit lifecycle**: constructors spawn nothing; the composing
//!    application starts and stops the reaper.

pub mod rate_limiter;
pub mod reaper;
pub mod registry;

pub use rate_limiter::{RateLimiter, RateLimiterStats, OVER_LIMIT_ALLOWANCE};
pub use reaper::{LimiterReaper, ReaperStats};
pub use registry::LimiterRegistry;
