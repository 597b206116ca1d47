//! Log-safety helpers for sensitive values.
//!
//! Credentials and tokens must never appear verbatim in logs or assertion
//! output. These helpers derive short stable fingerprints that are safe to
//! write anywhere and still let operators correlate entries for the same
//! caller across log files.

use sha2::{Digest, Sha256};

/// Number of hex characters retained by [`fingerprint`].
const FINGERPRINT_LEN: usize = 8;

/// Hex-encoded SHA-256 digest of the input bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Short stable fingerprint of a sensitive string.
///
/// The first [`FINGERPRINT_LEN`] hex characters of the SHA-256 digest.
/// The underlying value cannot be recovered from the result.
pub fn fingerprint(value: &str) -> String {
    let mut hex = sha256_hex(value.as_bytes());
    hex.truncate(FINGERPRINT_LEN);
    hex
}
