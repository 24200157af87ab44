//! Human-readable order codes: `DH-YYYYMMDD-NNNN`.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::ORDER_CODE_PREFIX;

/// Random candidate for the day of `now`. May collide; callers check.
pub fn candidate_code(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}-{:04}", ORDER_CODE_PREFIX, now.format("%Y%m%d"), suffix)
}

/// Timestamp-suffixed code used once random candidates are exhausted.
pub fn fallback_code(now: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        ORDER_CODE_PREFIX,
        now.format("%Y%m%d"),
        now.timestamp_millis()
    )
}
