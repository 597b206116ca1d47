//! # sluice-commons
//!
//! Shared identifier types and helpers for the sluice substrate.
//!
//! This crate provides the foundational types used across the sluice crates
//! (sluice-core, sluice-configs). It depends on nothing inside the substrate
//! to prevent circular dependency issues.
//!
//! ## Type-Safe Wrappers
//!
//! - `CredentialId`: opaque caller credential. Its `Debug` output is a short
//!   fingerprint, never the raw value, so credentials cannot leak through
//!   logs or assertion messages.
//! - `OperationId`: name of a protected operation (a rate-limit scope).
//!
//! ## Example Usage
//!
//! ```rust
//! use sluice_commons::{CredentialId, OperationId};
//!
//! let credential = CredentialId::new("token-abc123");
//! let operation = OperationId::new("render_page");
//!
//! // Type safety prevents mixing
//! // let wrong: OperationId = credential; // Compile error!
//!
//! // Raw access is explicit
//! let raw: &str = credential.as_str();
//! assert_eq!(operation.as_str(), "render_page");
//! ```

pub mod helpers;
pub mod models;

pub use models::{CredentialId, OperationId};
