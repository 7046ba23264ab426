//! Field-extraction rules for each supported provider.

pub mod instagram;
pub mod reddit;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Convert an epoch-seconds value to a point in time (seconds × 1000 as epoch millis).
pub fn from_epoch_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value.as_i64() {
        Some(seconds) => seconds.checked_mul(1000)?,
        None => {
            let seconds = value.as_f64()?;
            (seconds * 1000.0).round() as i64
        }
    };
    DateTime::from_timestamp_millis(millis)
}

/// Convert an epoch-milliseconds value to a point in time.
pub fn from_epoch_millis(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value.as_i64() {
        Some(millis) => millis,
        None => value.as_f64()?.round() as i64,
    };
    DateTime::from_timestamp_millis(millis)
}
