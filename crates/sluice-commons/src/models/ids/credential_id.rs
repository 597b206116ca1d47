use crate::helpers::security;
use std::fmt;

/// Validation error for CredentialId
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialIdValidationError(pub String);

impl fmt::Display for CredentialIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CredentialIdValidationError {}

/// Opaque caller credential used as the rate-limiting ledger key.
///
/// The wrapped value is typically an authentication token or API key, so it
/// must never reach logs. `CredentialId` therefore implements `Debug` by
/// hand, rendering a short stable fingerprint instead of the raw value, and
/// deliberately has no `Display` impl. Code that genuinely needs the raw
/// value calls [`CredentialId::as_str`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialId(String);

impl CredentialId {
    /// Creates a new CredentialId.
    ///
    /// # Panics
    ///
    /// Panics if the value is empty, longer than 256 bytes, or contains
    /// whitespace or control characters. Use [`CredentialId::try_new`] for
    /// fallible construction.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::try_new(value).expect("invalid credential")
    }

    /// Creates a new CredentialId, validating the value.
    pub fn try_new(value: impl Into<String>) -> Result<Self, CredentialIdValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CredentialIdValidationError(
                "credential cannot be empty".to_string(),
            ));
        }
        if value.len() > 256 {
            return Err(CredentialIdValidationError(format!(
                "credential cannot exceed 256 bytes (got {})",
                value.len()
            )));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CredentialIdValidationError(
                "credential cannot contain whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw credential value.
    ///
    /// Callers are responsible for keeping the result out of logs.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw String.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Short stable fingerprint of the credential, safe to log.
    ///
    /// Two distinct credentials produce distinct fingerprints with
    /// overwhelming probability; the raw value cannot be recovered from it.
    pub fn fingerprint(&self) -> String {
        security::fingerprint(&self.0)
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialId({})", self.fingerprint())
    }
}

impl From<String> for CredentialId {
    /// Panics if the value fails validation. Use `try_new` for fallible conversion.
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CredentialId {
    /// Panics if the value fails validation. Use `try_new` for fallible conversion.
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for CredentialId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for CredentialId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
