//! Triage categories and their numeric weights.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Clinician-assigned urgency bucket.
///
/// Ordering follows urgency: `Immediate < Emergency < ... < NonUrgent`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TriageCategory {
    /// Immediately life-threatening (red).
    Immediate,
    /// Very urgent (orange).
    Emergency,
    /// Urgent (yellow).
    Urgent,
    /// Standard (green).
    #[default]
    Standard,
    /// Non-urgent (blue).
    NonUrgent,
}

impl TriageCategory {
    /// All categories, most urgent first.
    pub const ALL: [Self; 5] = [
        Self::Immediate,
        Self::Emergency,
        Self::Urgent,
        Self::Standard,
        Self::NonUrgent,
    ];

    /// Base priority score; lower is more urgent.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Immediate => 1,
            Self::Emergency => 2,
            Self::Urgent => 3,
            Self::Standard => 4,
            Self::NonUrgent => 5,
        }
    }

    /// Display color used on triage boards.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Immediate => "red",
            Self::Emergency => "orange",
            Self::Urgent => "yellow",
            Self::Standard => "green",
            Self::NonUrgent => "blue",
        }
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::Standard => "standard",
            Self::NonUrgent => "non_urgent",
        }
    }

    /// Parse a raw category, falling back to [`TriageCategory::Standard`] when the value is
    /// missing or unrecognised.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Standard,
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(category = value, "unknown triage category, using standard");
                Self::Standard
            }),
        }
    }
}

impl fmt::Display for TriageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriageCategory {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "immediate" => Ok(Self::Immediate),
            "emergency" => Ok(Self::Emergency),
            "urgent" => Ok(Self::Urgent),
            "standard" => Ok(Self::Standard),
            "non_urgent" | "nonurgent" => Ok(Self::NonUrgent),
            other => Err(SchedulerError::Validation(format!(
                "unknown triage category `{other}`"
            ))),
        }
    }
}
