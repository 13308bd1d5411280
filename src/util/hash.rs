//! Hashing utilities for archive fingerprints.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Short fingerprint (first 12 hex digits of SHA256) for display.
pub fn short_fingerprint(data: &[u8]) -> String {
    let mut full = sha256_bytes(data);
    full.truncate(12);
    full
}
