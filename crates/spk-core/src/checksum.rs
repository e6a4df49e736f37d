//! SHA-256 helpers for change detection and stable row keys.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest for a songplay key.
const FINGERPRINT_LEN: usize = 16;

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Stable key for one play event.
///
/// The same `(start_time, user_id, session_id, item_in_session)` always maps
/// to the same key, so replaying a log file hits the primary key conflict
/// instead of adding duplicate facts.
pub fn songplay_fingerprint(
    start_time: i64,
    user_id: i64,
    session_id: i64,
    item_in_session: i64,
) -> String {
    let mut digest =
        compute_checksum(&format!("{start_time}|{user_id}|{session_id}|{item_in_session}"));
    digest.truncate(FINGERPRINT_LEN);
    digest
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
