use std::fmt;

/// Validation error for OperationId
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIdValidationError(pub String);

impl fmt::Display for OperationIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for OperationIdValidationError {}

/// Name of a protected operation, the scope a rate-limit quota applies to.
///
/// Operation names come from configuration tables and appear in logs, so the
/// alphabet is restricted to ASCII alphanumerics plus `.`, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(String);

impl OperationId {
    /// Creates a new OperationId.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty, longer than 128 bytes, or contains
    /// characters outside `[A-Za-z0-9._-]`. Use [`OperationId::try_new`]
    /// for fallible construction.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::try_new(name).expect("invalid operation name")
    }

    /// Creates a new OperationId, validating the name.
    pub fn try_new(name: impl Into<String>) -> Result<Self, OperationIdValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(OperationIdValidationError(
                "operation name cannot be empty".to_string(),
            ));
        }
        if name.len() > 128 {
            return Err(OperationIdValidationError(format!(
                "operation name cannot exceed 128 bytes (got {})",
                name.len()
            )));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
        {
            return Err(OperationIdValidationError(format!(
                "operation name contains invalid character '{}' (allowed: A-Za-z0-9 . _ -)",
                bad
            )));
        }
        Ok(Self(name))
    }

    /// Returns the operation name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OperationId {
    /// Panics if the name fails validation. Use `try_new` for fallible conversion.
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for OperationId {
    /// Panics if the name fails validation. Use `try_new` for fallible conversion.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for OperationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_id_creation() {
        let op = OperationId::new("render_page");
        assert_eq!(op.as_str(), "render_page");
        assert_eq!(op.to_string(), "render_page");
    }

    #[test]
    fn test_allowed_punctuation() {
        assert!(OperationId::try_new("api.v2.render-page_html").is_ok());
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(OperationId::try_new("").is_err());
    }

    #[test]
    fn test_try_new_rejects_invalid_characters() {
        assert!(OperationId::try_new("has space").is_err());
        assert!(OperationId::try_new("path/segment").is_err());
        assert!(OperationId::try_new("naïve").is_err());
    }

    #[test]
    fn test_try_new_rejects_overlong() {
        let long = "a".repeat(129);
        assert!(OperationId::try_new(long).is_err());
        let max = "a".repeat(128);
        assert!(OperationId::try_new(max).is_ok());
    }

    #[test]
    #[should_panic(expected = "invalid operation name")]
    fn test_new_panics_on_invalid() {
        OperationId::new("has space");
    }

    #[test]
    fn test_ordering() {
        let a = OperationId::new("alpha");
        let b = OperationId::new("beta");
        assert!(a < b);
    }
}
