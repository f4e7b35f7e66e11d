//! Demo data used when the backend is unreachable.
//!
//! Embedded at compile time from `fallback/dashboard.toml` so the dashboard
//! renders something meaningful with no network at all.

use pothole_admin_pothole_models::{
    Contractor, HistoryEntry, PointRecord, RecordKind, RecordStatus, Severity,
};
use serde::Deserialize;

use crate::normalize::normalize_fallback;

const FALLBACK_TOML: &str = include_str!("../fallback/dashboard.toml");

/// A report or patch row as written in the fallback file.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackRecord {
    pub id: String,
    pub location: String,
    #[serde(default)]
    pub road_name: Option<String>,
    #[serde(default)]
    pub defect_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contractor_id: Option<String>,
    #[serde(default)]
    pub reported_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FallbackRepair {
    id: String,
    location: String,
    road_name: String,
    severity: Severity,
    contractor: String,
    fixed_date: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FallbackFile {
    #[serde(default)]
    contractors: Vec<Contractor>,
    #[serde(default)]
    reports: Vec<FallbackRecord>,
    #[serde(default)]
    patches: Vec<FallbackRecord>,
    #[serde(default)]
    repairs: Vec<FallbackRepair>,
}

/// The parsed fallback dataset.
#[derive(Debug, Clone)]
pub struct FallbackDataset {
    pub contractors: Vec<Contractor>,
    pub reports: Vec<FallbackRecord>,
    pub patches: Vec<FallbackRecord>,
    pub repairs: Vec<HistoryEntry>,
}

impl FallbackDataset {
    /// Normalized reports followed by normalized patches.
    #[must_use]
    pub fn records(&self) -> Vec<PointRecord> {
        self.reports
            .iter()
            .map(|r| normalize_fallback(r, RecordKind::Report))
            .chain(
                self.patches
                    .iter()
                    .map(|p| normalize_fallback(p, RecordKind::Patch)),
            )
            .collect()
    }
}

/// Loads the embedded fallback dataset.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the file is embedded and covered by tests).
#[must_use]
pub fn dataset() -> FallbackDataset {
    let file: FallbackFile = toml::de::from_str(FALLBACK_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded fallback data: {e}"));

    FallbackDataset {
        contractors: file.contractors,
        reports: file.reports,
        patches: file.patches,
        repairs: file
            .repairs
            .into_iter()
            .map(|r| HistoryEntry {
                id: r.id,
                location: r.location,
                road_name: r.road_name,
                severity: r.severity,
                contractor: r.contractor,
                fixed_date: r.fixed_date,
                status: RecordStatus::Verified,
            })
            .collect(),
    }
}
