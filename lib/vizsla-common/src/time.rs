//! Time-related functions.

use std::time::SystemTime;

/// Get the current Unix timestamp, in nanoseconds.
///
/// This function is accurate, as it always retrieves the current time for each call. Clock readings from before the
/// Unix epoch are reported as zero.
pub fn get_unix_timestamp_nanos() -> u128 {
    let since_unix_epoch = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    since_unix_epoch.as_nanos()
}

/// Get the current Unix timestamp as fractional seconds.
///
/// Sub-second precision is preserved, which makes the value suitable for recency math over short intervals.
pub fn get_unix_timestamp_fractional() -> f64 {
    get_unix_timestamp_nanos() as f64 / 1e9
}
