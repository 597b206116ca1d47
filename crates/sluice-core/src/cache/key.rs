//! Typed cache-key fingerprints.
//!
//! The cache deduplicates by key equality, so two calls that must not share
//! a result need keys that cannot collide. `CacheKey` builds a fingerprint
//! from heterogeneous call arguments where both position and type
//! participate: `1i64`, `1.0f64` and `"1"` are three different keys, and a
//! present `None` argument differs from an omitted one.

/// One argument's contribution to a [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Bit pattern of an f64. NaN equals itself here, which is what a
    /// memoizer wants even though it differs from IEEE comparison.
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    /// A present-but-empty optional argument.
    Null,
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::UInt(u64::from(value))
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::UInt(value)
    }
}

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        KeyPart::UInt(value as u64)
    }
}

impl From<f64> for KeyPart {
    fn from(value: f64) -> Self {
        KeyPart::Float(value.to_bits())
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<Vec<u8>> for KeyPart {
    fn from(value: Vec<u8>) -> Self {
        KeyPart::Bytes(value)
    }
}

impl From<&[u8]> for KeyPart {
    fn from(value: &[u8]) -> Self {
        KeyPart::Bytes(value.to_vec())
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => KeyPart::Null,
        }
    }
}

/// Ordered, typed key for memoized call results.
///
/// ```rust
/// use sluice_core::cache::key::CacheKey;
///
/// let key = CacheKey::new().with("render_page").with(42u64).with(true);
/// let other = CacheKey::new().with("render_page").with("42").with(true);
/// assert_ne!(key, other); // 42u64 and "42" do not collide
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CacheKey {
    parts: Vec<KeyPart>,
}

impl CacheKey {
    /// Empty key; append arguments with [`CacheKey::with`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one argument and returns the key, builder style.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Appends one argument in place.
    pub fn push(&mut self, part: impl Into<KeyPart>) {
        self.parts.push(part.into());
    }

    /// Number of argument parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for CacheKey {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().map(Into::into).collect(),
        }
    }
}
