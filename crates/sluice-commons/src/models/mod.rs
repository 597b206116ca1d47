//! Type-safe wrapper types for sluice identifiers.
//!
//! This module provides newtype wrappers around String to enforce type safety
//! at compile time, preventing accidental mixing of caller credentials and
//! operation names.

pub mod ids;

pub use ids::*;
