//! Alert severities and the cumulative threshold cascade.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{GateError, GateResult};

/// Severity of a code scanning alert, as accepted by the `severity` filter
/// of the alerts listing.
///
/// Variants are declared most severe first; the derived ordering follows
/// declaration order, so `Critical < High < ... < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Warning,
    Note,
    Error,
}

/// Every severity in cascade order.
const CASCADE: [Severity; 7] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Warning,
    Severity::Note,
    Severity::Error,
];

impl Severity {
    /// All severities, most severe first.
    pub const ALL: &'static [Self] = &CASCADE;

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Error => "error",
        }
    }

    /// The severities in scope when this severity is the configured
    /// threshold: itself plus every level listed before it.
    pub fn cascade(self) -> &'static [Self] {
        let end = CASCADE
            .iter()
            .position(|s| *s == self)
            .map_or(CASCADE.len(), |i| i + 1);
        &CASCADE[..end]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "warning" => Ok(Self::Warning),
            "note" => Ok(Self::Note),
            "error" => Ok(Self::Error),
            other => Err(GateError::Config(format!(
                "unknown threshold '{other}', expected one of: critical, high, medium, low, warning, note, error"
            ))),
        }
    }
}

/// Resolve a configured threshold name to the ordered severities to fetch.
pub fn resolve(threshold: &str) -> GateResult<&'static [Severity]> {
    threshold.parse::<Severity>().map(Severity::cascade)
}
