//! Normalized findings and their age classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::remote::RawAlert;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed between `created_at` and `now`, rounded down.
///
/// Timestamps in the future yield a negative age rather than zero so clock
/// skew never hides behind a rounded value.
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// A security alert with its computed age and violation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: u64,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub age_days: i64,
    pub exceeds_threshold: bool,
}

impl Finding {
    /// Classify a raw alert against the maximum allowed age.
    pub fn classify(alert: &RawAlert, now: DateTime<Utc>, max_age_days: i64) -> Self {
        let age_days = age_in_days(alert.created_at, now);
        Self {
            id: alert.number,
            url: alert.html_url.clone(),
            created_at: alert.created_at,
            age_days,
            exceeds_threshold: age_days > max_age_days,
        }
    }
}
