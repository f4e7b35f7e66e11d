#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the pothole reporting backend.
//!
//! The backend is not ours, so these types are lenient on the way in:
//! ids may arrive as numbers or strings, coordinates and counts may be
//! missing or mistyped, and field names vary between endpoints. Anything
//! the aggregation engine cannot use is left as a raw value for the
//! normalizer to degrade.

use pothole_admin_pothole_models::{Contractor, HistoryEntry, RecordStatus, Severity};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts a JSON string or number and returns it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Like [`string_or_number`] but tolerates `null` and absence.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Reads a loosely typed coordinate component.
#[must_use]
pub fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// One row of `GET /reports/aggregated/locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    /// Location id.
    #[serde(deserialize_with = "string_or_number", alias = "_id", alias = "locationId")]
    pub id: String,
    /// Latitude, possibly as a string.
    #[serde(default, alias = "lat")]
    pub latitude: serde_json::Value,
    /// Longitude, possibly as a string.
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: serde_json::Value,
    /// Total defects detected at this location.
    #[serde(default, alias = "potholeCount", alias = "count")]
    pub total_defects: serde_json::Value,
    /// Worst severity label the backend computed.
    #[serde(default, alias = "severity")]
    pub highest_severity: Option<String>,
    /// Status string in the backend's spelling.
    #[serde(default)]
    pub status: Option<String>,
    /// Assigned contractor id.
    #[serde(default, deserialize_with = "opt_string_or_number", alias = "assignedContractor")]
    pub contractor_id: Option<String>,
    /// Most recent report timestamp.
    #[serde(default, alias = "lastReportedAt", alias = "reportedAt")]
    pub last_reported: Option<String>,
    /// Road name, when the backend already resolved one.
    #[serde(default)]
    pub road_name: Option<String>,
    /// `"pothole"` or `"patch"`; absent means pothole.
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

impl ApiLocation {
    /// Whether this row describes a completed patch rather than a report.
    #[must_use]
    pub fn is_patch(&self) -> bool {
        self.kind.as_deref().is_some_and(|k| {
            let k = k.trim();
            k.eq_ignore_ascii_case("patch") || k.eq_ignore_ascii_case("repair")
        })
    }
}

/// A contractor as returned by `GET /admin/contractors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContractor {
    #[serde(deserialize_with = "string_or_number", alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, alias = "companyName")]
    pub company: Option<String>,
}

impl From<ApiContractor> for Contractor {
    fn from(c: ApiContractor) -> Self {
        Self {
            id: c.id,
            name: c.name,
            company: c.company.unwrap_or_default(),
        }
    }
}

/// A verified repair as returned by `GET /admin/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHistoryEntry {
    #[serde(deserialize_with = "string_or_number", alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub road_name: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub contractor: Option<String>,
    #[serde(default, alias = "verifiedAt")]
    pub fixed_date: Option<String>,
}

impl From<ApiHistoryEntry> for HistoryEntry {
    fn from(e: ApiHistoryEntry) -> Self {
        Self {
            id: e.id,
            location: e.location,
            road_name: e
                .road_name
                .unwrap_or_else(|| pothole_admin_pothole_models::UNKNOWN_ROAD.to_string()),
            severity: e
                .severity
                .and_then(|s| s.parse().ok())
                .unwrap_or(Severity::Unknown),
            contractor: e.contractor.unwrap_or_default(),
            fixed_date: e.fixed_date.unwrap_or_default(),
            status: RecordStatus::Verified,
        }
    }
}

/// Body of `GET /reports/stats/overview`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStatsOverview {
    pub reported: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub pending: u64,
    pub verified: u64,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub message: Option<String>,
}

/// Body of `POST /admin/assign`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub location_id: String,
    pub contractor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /admin/assign/batch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignRequest {
    pub location_ids: Vec<String>,
    pub contractor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /admin/verify/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /admin/verify/batch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerifyRequest {
    pub location_ids: Vec<String>,
    pub notes: String,
}

/// Body of `POST /admin/verify/{id}/reject`.
#[derive(Debug, Clone, Serialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Filters for `GET /admin/history`.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub road_name: Option<String>,
}

impl HistoryQuery {
    /// Query-string pairs for the set filters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("roadName", &self.road_name),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}
