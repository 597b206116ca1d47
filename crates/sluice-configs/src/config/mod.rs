//! Configuration types, default values, and TOML loading.

pub mod defaults;
pub mod loader;
pub mod types;

pub use types::*;
