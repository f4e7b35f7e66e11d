//! Road-level grouping of point records.
//!
//! Every record lands in exactly one [`RoadGroup`], keyed by its resolved
//! road name (or [`UNKNOWN_ROAD`]). Groups appear in first-seen order:
//! reports first, then patches, so repeated aggregation of the same input
//! is byte-for-byte identical.
//!
//! [`UNKNOWN_ROAD`]: pothole_admin_pothole_models::UNKNOWN_ROAD

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pothole_admin_pothole_models::{PointRecord, RecordStatus, Severity, SeverityThresholds};
use serde::Serialize;

/// Display format for timestamps, e.g. `"Jan 15, 2024 09:30"`.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// Naive formats accepted for raw `reported_at` strings, tried in order
/// after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    DISPLAY_FORMAT,
];

/// The mean reported-at time of a road, or the sentinel when no report on
/// the road carries a parseable timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportedTime {
    /// No parseable timestamps.
    Unavailable,
    /// Arithmetic mean of the parseable timestamps.
    At(DateTime<Utc>),
}

impl fmt::Display for ReportedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable"),
            Self::At(at) => write!(f, "{}", at.format(DISPLAY_FORMAT)),
        }
    }
}

impl Serialize for ReportedTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a raw timestamp. Naive timestamps are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One road's aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadGroup {
    pub road_name: String,
    /// Reports on the road.
    pub num_potholes: usize,
    /// Patches on the road.
    pub num_patches: usize,
    /// Sum of the reports' defect counts.
    pub total_defects: u64,
    pub avg_severity: Severity,
    pub reported_time: ReportedTime,
    pub status: RecordStatus,
    pub reports: Vec<PointRecord>,
    pub patches: Vec<PointRecord>,
}

impl RoadGroup {
    /// Report and patch ids on this road, reports first.
    #[must_use]
    pub fn record_ids(&self) -> Vec<&str> {
        self.records().map(|r| r.id.as_str()).collect()
    }

    /// All member records, reports first.
    pub fn records(&self) -> impl Iterator<Item = &PointRecord> {
        self.reports.iter().chain(&self.patches)
    }

    /// Ids of the reports only. Batch actions target these.
    #[must_use]
    pub fn report_ids(&self) -> Vec<String> {
        self.reports.iter().map(|r| r.id.clone()).collect()
    }
}

#[derive(Default)]
struct Members {
    reports: Vec<PointRecord>,
    patches: Vec<PointRecord>,
}

/// Groups `reports` and `patches` by road.
///
/// Never fails. Output order is the order in which each road name first
/// appears, scanning reports before patches.
#[must_use]
pub fn aggregate(
    reports: &[PointRecord],
    patches: &[PointRecord],
    thresholds: &SeverityThresholds,
) -> Vec<RoadGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut members: BTreeMap<String, Members> = BTreeMap::new();

    for report in reports {
        slot(&mut order, &mut members, report)
            .reports
            .push(report.clone());
    }
    for patch in patches {
        slot(&mut order, &mut members, patch)
            .patches
            .push(patch.clone());
    }

    order
        .into_iter()
        .filter_map(|road| {
            let Members { reports, patches } = members.remove(&road)?;
            Some(RoadGroup {
                num_potholes: reports.len(),
                num_patches: patches.len(),
                total_defects: total_defects(&reports),
                avg_severity: mean_severity(&reports, thresholds),
                reported_time: mean_reported_time(&reports),
                status: road_status(&reports),
                road_name: road,
                reports,
                patches,
            })
        })
        .collect()
}

fn slot<'a>(
    order: &mut Vec<String>,
    members: &'a mut BTreeMap<String, Members>,
    record: &PointRecord,
) -> &'a mut Members {
    let key = record.road_key();
    if !members.contains_key(key) {
        order.push(key.to_string());
    }
    members.entry(key.to_string()).or_default()
}

/// Looks up one road's group, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_group<'a>(groups: &'a [RoadGroup], road_name: &str) -> Option<&'a RoadGroup> {
    let wanted = road_name.trim();
    groups
        .iter()
        .find(|g| g.road_name.eq_ignore_ascii_case(wanted))
}

fn total_defects(reports: &[PointRecord]) -> u64 {
    reports
        .iter()
        .map(|r| u64::from(r.defect_count.unwrap_or(0)))
        .sum()
}

/// Mean of the per-report severity weights, mapped back to a label.
/// A road with no reports is `Unknown`.
#[must_use]
pub fn mean_severity(reports: &[PointRecord], thresholds: &SeverityThresholds) -> Severity {
    if reports.is_empty() {
        return Severity::Unknown;
    }
    let total: u32 = reports
        .iter()
        .map(|r| u32::from(r.severity(thresholds).weight()))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(total) / reports.len() as f64;
    Severity::from_mean_weight(mean)
}

/// Mean of the parseable `reported_at` timestamps.
#[must_use]
pub fn mean_reported_time(reports: &[PointRecord]) -> ReportedTime {
    let millis: Vec<i128> = reports
        .iter()
        .filter_map(|r| r.reported_at.as_deref())
        .filter_map(parse_timestamp)
        .map(|at| i128::from(at.timestamp_millis()))
        .collect();

    if millis.is_empty() {
        return ReportedTime::Unavailable;
    }

    let count = i128::try_from(millis.len()).unwrap_or(i128::MAX);
    let mean = millis.iter().sum::<i128>() / count;
    i64::try_from(mean)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or(ReportedTime::Unavailable, ReportedTime::At)
}

/// Highest-priority status across the reports; `Reported` when none.
#[must_use]
pub fn road_status(reports: &[PointRecord]) -> RecordStatus {
    reports
        .iter()
        .map(|r| r.status)
        .max_by_key(|s| s.priority())
        .unwrap_or(RecordStatus::Reported)
}
