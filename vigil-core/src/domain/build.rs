//! Build detail and the rules applied to it before reporting

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decoded `<job>/<number>/api/json` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDetail {
    #[serde(default)]
    pub building: bool,

    /// Duration in milliseconds
    #[serde(default)]
    pub duration: i64,

    pub number: i64,

    /// Terminal result such as `SUCCESS`; `null` while the build runs
    #[serde(default)]
    pub result: Option<String>,

    /// Start time in epoch milliseconds
    pub timestamp: i64,
}

impl BuildDetail {
    /// Raw result string, empty when the server did not report one
    pub fn result(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }

    /// Start time, or `None` if the millisecond value is out of range
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn result_code(&self) -> i64 {
        map_result_code(self.result())
    }
}

/// Maps a build result string to its numeric code.
///
/// Case-insensitive; unrecognized values map to -1.
pub fn map_result_code(result: &str) -> i64 {
    match result.to_ascii_lowercase().as_str() {
        "success" => 0,
        "failure" => 1,
        "not_built" => 2,
        "unstable" => 3,
        "aborted" => 4,
        _ => -1,
    }
}

/// Whether a build started strictly before `now - max_age`.
///
/// A build exactly on the cutoff is still reported.
pub fn is_too_old(started_at: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    let cutoff = TimeDelta::from_std(max_age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age));

    match cutoff {
        Some(cutoff) => started_at < cutoff,
        // cutoff lies before the representable range, nothing is older
        None => false,
    }
}
