//! TTL derivation from optional deadlines.

use chrono::{DateTime, Utc};

/// TTL granted to records whose deadline has already passed, so they stay
/// queryable for a short window instead of expiring immediately.
pub const EXPIRED_GRACE_SECS: u64 = 600;

/// Seconds until `deadline`, or `None` when no usable deadline is given
/// (the caller applies its own fallback). Past or present deadlines yield
/// the fixed grace period.
pub fn compute_expires_in(deadline: Option<&str>) -> Option<u64> {
    let deadline = deadline?;
    let parsed = DateTime::parse_from_rfc3339(deadline).ok()?;
    let diff_ms = parsed.timestamp_millis() - Utc::now().timestamp_millis();
    if diff_ms <= 0 {
        Some(EXPIRED_GRACE_SECS)
    } else {
        Some((diff_ms / 1000) as u64)
    }
}
