//! Type-safe identifier wrappers.

mod credential_id;
mod operation_id;

pub use credential_id::{CredentialId, CredentialIdValidationError};
pub use operation_id::{OperationId, OperationIdValidationError};
