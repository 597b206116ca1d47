//! Helper utilities shared across sluice crates.

pub mod security;
