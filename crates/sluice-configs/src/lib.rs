//! sluice-configs
//!
//! Substrate configuration types and loader for sluice.

pub mod config;

pub use config::defaults;
pub use config::*;
