#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pothole record, severity, and status types.
//!
//! This crate defines the canonical shapes shared across the pothole admin
//! toolchain: the three-level [`Severity`] scale and its defect-count
//! classifier, the repair workflow [`RecordStatus`], and the point-level
//! records (reports and patches) that the aggregation engine groups by
//! road.

pub mod record;

pub use record::{
    Contractor, Coordinates, HistoryEntry, PointRecord, RecordKind, UNKNOWN_ROAD,
};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity label derived from a defect count.
///
/// `Unknown` never comes out of [`SeverityThresholds::classify`]; it only
/// appears when averaging a group that has nothing to average.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    /// No defect data to classify.
    Unknown = 0,
    /// Fewer defects than the medium threshold.
    Low = 1,
    /// At or above the medium threshold.
    Medium = 2,
    /// At or above the high threshold.
    High = 3,
}

impl Severity {
    /// Returns the numeric weight used when averaging severities.
    #[must_use]
    pub const fn weight(self) -> u8 {
        self as u8
    }

    /// Maps a fractional mean weight back to a label.
    ///
    /// Bands are half-open: `>= 2.5` is High, `>= 1.5` is Medium, anything
    /// above zero is Low. Zero, negatives, and NaN are `Unknown`.
    #[must_use]
    pub fn from_mean_weight(mean: f64) -> Self {
        if mean >= 2.5 {
            Self::High
        } else if mean >= 1.5 {
            Self::Medium
        } else if mean > 0.0 {
            Self::Low
        } else {
            Self::Unknown
        }
    }

    /// Returns the labels an operator can filter by.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Fixed defect-count breakpoints for [`Severity`] classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Counts at or above this are at least Medium.
    pub medium: u32,
    /// Counts at or above this are High.
    pub high: u32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            medium: DEFAULT_MEDIUM_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

/// Default defect count at which a report becomes Medium.
pub const DEFAULT_MEDIUM_THRESHOLD: u32 = 10;

/// Default defect count at which a report becomes High.
pub const DEFAULT_HIGH_THRESHOLD: u32 = 30;

impl SeverityThresholds {
    /// Classifies a defect count. Negative counts are treated as zero.
    #[must_use]
    pub fn classify(&self, count: i64) -> Severity {
        let count = count.max(0);
        if count >= i64::from(self.high) {
            Severity::High
        } else if count >= i64::from(self.medium) {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Classifies a loosely typed defect count as it arrives over the wire.
    ///
    /// Numbers and numeric strings are accepted; anything else counts as
    /// zero.
    #[must_use]
    pub fn classify_value(&self, value: &serde_json::Value) -> Severity {
        self.classify(defect_count_from_value(value).into())
    }
}

/// Coerces a loosely typed defect count into a non-negative integer.
///
/// Fractional values are truncated; negatives, NaN, and non-numeric input
/// become zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn defect_count_from_value(value: &serde_json::Value) -> u32 {
    let as_float = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match as_float {
        Some(f) if f.is_finite() && f > 0.0 => f.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

/// Workflow status of a pothole report or patch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum RecordStatus {
    /// Reported by a citizen or detector, not yet assigned.
    Reported,
    /// A contractor has been assigned.
    Assigned,
    /// The contractor marked the repair done; awaiting admin verification.
    #[strum(to_string = "Pending Verification")]
    PendingVerification,
    /// Repair verified by an admin.
    Verified,
}

impl RecordStatus {
    /// Priority used to pick a road-level status from its reports.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::PendingVerification => 3,
            Self::Assigned => 2,
            Self::Reported => 1,
            Self::Verified => 0,
        }
    }

    /// Parses a backend or display status string.
    ///
    /// Matching ignores case, whitespace, `_`, and `-`. Unrecognized values
    /// are treated as freshly `Reported`.
    #[must_use]
    pub fn parse_loose(value: &str) -> Self {
        let key: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "assigned" | "inprogress" => Self::Assigned,
            "pendingverification" | "completed" | "awaitingverification" => {
                Self::PendingVerification
            }
            "verified" | "resolved" | "closed" => Self::Verified,
            _ => Self::Reported,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Reported,
            Self::Assigned,
            Self::PendingVerification,
            Self::Verified,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_breakpoints_match_thresholds() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(0), Severity::Low);
        assert_eq!(t.classify(9), Severity::Low);
        assert_eq!(t.classify(10), Severity::Medium);
        assert_eq!(t.classify(29), Severity::Medium);
        assert_eq!(t.classify(30), Severity::High);
        assert_eq!(t.classify(1_000), Severity::High);
    }

    #[test]
    fn classify_is_monotonic() {
        let t = SeverityThresholds::default();
        let mut previous = t.classify(0);
        for count in 1..200 {
            let current = t.classify(count);
            assert!(current >= previous, "{count} dropped from {previous} to {current}");
            previous = current;
        }
    }

    #[test]
    fn classify_clamps_negative_and_non_numeric() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(-5), Severity::Low);
        assert_eq!(t.classify_value(&serde_json::json!("abc")), Severity::Low);
        assert_eq!(t.classify_value(&serde_json::json!(null)), Severity::Low);
        assert_eq!(t.classify_value(&serde_json::json!(-40)), Severity::Low);
        assert_eq!(t.classify_value(&serde_json::json!("31")), Severity::High);
        assert_eq!(t.classify_value(&serde_json::json!(12.7)), Severity::Medium);
    }

    #[test]
    fn custom_thresholds_move_breakpoints() {
        let t = SeverityThresholds { medium: 3, high: 5 };
        assert_eq!(t.classify(2), Severity::Low);
        assert_eq!(t.classify(3), Severity::Medium);
        assert_eq!(t.classify(5), Severity::High);
    }

    #[test]
    fn mean_weight_bands_are_half_open() {
        assert_eq!(Severity::from_mean_weight(3.0), Severity::High);
        assert_eq!(Severity::from_mean_weight(2.5), Severity::High);
        assert_eq!(Severity::from_mean_weight(2.49), Severity::Medium);
        assert_eq!(Severity::from_mean_weight(1.5), Severity::Medium);
        assert_eq!(Severity::from_mean_weight(1.49), Severity::Low);
        assert_eq!(Severity::from_mean_weight(0.01), Severity::Low);
        assert_eq!(Severity::from_mean_weight(0.0), Severity::Unknown);
        assert_eq!(Severity::from_mean_weight(f64::NAN), Severity::Unknown);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("MEDIUM".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn status_priority_order() {
        assert!(RecordStatus::PendingVerification.priority() > RecordStatus::Assigned.priority());
        assert!(RecordStatus::Assigned.priority() > RecordStatus::Reported.priority());
        assert!(RecordStatus::Reported.priority() > RecordStatus::Verified.priority());
    }

    #[test]
    fn status_parse_loose_accepts_backend_spellings() {
        assert_eq!(
            RecordStatus::parse_loose("Pending Verification"),
            RecordStatus::PendingVerification
        );
        assert_eq!(
            RecordStatus::parse_loose("pending_verification"),
            RecordStatus::PendingVerification
        );
        assert_eq!(RecordStatus::parse_loose("in-progress"), RecordStatus::Assigned);
        assert_eq!(RecordStatus::parse_loose("VERIFIED"), RecordStatus::Verified);
        assert_eq!(RecordStatus::parse_loose("open"), RecordStatus::Reported);
        assert_eq!(RecordStatus::parse_loose(""), RecordStatus::Reported);
    }

    #[test]
    fn status_display_uses_operator_labels() {
        assert_eq!(
            RecordStatus::PendingVerification.to_string(),
            "Pending Verification"
        );
        assert_eq!(RecordStatus::Assigned.to_string(), "Assigned");
    }
}
