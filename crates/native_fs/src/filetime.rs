//! FILETIME <-> chrono conversion
//!
//! A FILETIME counts 100ns ticks since 1601-01-01 UTC.

use chrono::{DateTime, Utc};

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;

/// Seconds between 1601-01-01 and 1970-01-01
const EPOCH_DIFFERENCE_SECS: i64 = 11_644_473_600;

/// Convert the two FILETIME halves into a UTC timestamp.
///
/// The value is read as unsigned, so every input maps to an instant at or
/// after 1601; anything chrono cannot represent clamps to `MAX_UTC`.
pub fn from_filetime(low: u32, high: u32) -> DateTime<Utc> {
    let ticks = (high as u64) << 32 | low as u64;
    let secs = (ticks / TICKS_PER_SECOND as u64) as i64 - EPOCH_DIFFERENCE_SECS;
    let nanos = (ticks % TICKS_PER_SECOND as u64) as u32 * NANOS_PER_TICK as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Convert a UTC timestamp into FILETIME halves `(low, high)`.
/// Instants before 1601 clamp to zero.
pub fn to_filetime(ts: &DateTime<Utc>) -> (u32, u32) {
    let secs = ts.timestamp() + EPOCH_DIFFERENCE_SECS;
    let ticks = secs
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(ts.timestamp_subsec_nanos() as i64 / NANOS_PER_TICK)
        .max(0) as u64;
    (ticks as u32, (ticks >> 32) as u32)
}
