//! Point-level records, contractors, and verified-history entries.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::{RecordStatus, Severity, SeverityThresholds};

/// Road name used for records that have no resolvable road.
pub const UNKNOWN_ROAD: &str = "Unknown road";

/// Whether a point record is a defect report or a completed patch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A reported pothole carrying a defect count.
    Report,
    /// A patch or repair entry. Carries no defect count.
    Patch,
}

/// A WGS84 coordinate pair. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting non-finite components.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a `"lat, lon"` location string.
    ///
    /// Returns `None` unless there are exactly two comma-separated finite
    /// numbers.
    #[must_use]
    pub fn parse(location: &str) -> Option<Self> {
        let mut parts = location.split(',');
        let lat = parts.next()?.trim().parse::<f64>().ok()?;
        let lon = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(lat, lon)
    }

    /// Formats the pair the way locations are keyed in the road-name cache.
    #[must_use]
    pub fn location_key(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

/// A single pothole report or patch tied to one coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    /// Opaque unique identifier.
    pub id: String,
    /// Report or patch.
    pub kind: RecordKind,
    /// Verbatim `"lat, lon"` location string. Also the road-name cache key.
    pub location: String,
    /// Parsed coordinates, `None` when the location is unlocatable.
    pub coordinates: Option<Coordinates>,
    /// Defect count for reports; `None` for patches.
    pub defect_count: Option<u32>,
    /// Workflow status.
    pub status: RecordStatus,
    /// Assigned contractor, if any.
    pub contractor_id: Option<String>,
    /// Raw reported-at timestamp as received.
    pub reported_at: Option<String>,
    road_name: Option<String>,
}

impl PointRecord {
    /// Creates a record in the `Reported` state, parsing its location.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: RecordKind, location: impl Into<String>) -> Self {
        let location = location.into();
        let coordinates = Coordinates::parse(&location);
        Self {
            id: id.into(),
            kind,
            location,
            coordinates,
            defect_count: None,
            status: RecordStatus::Reported,
            contractor_id: None,
            reported_at: None,
            road_name: None,
        }
    }

    /// Creates a record from already-parsed coordinates.
    ///
    /// Non-finite coordinates leave the record unlocatable.
    #[must_use]
    pub fn at(id: impl Into<String>, kind: RecordKind, latitude: f64, longitude: f64) -> Self {
        let coordinates = Coordinates::new(latitude, longitude);
        let location = coordinates.map_or_else(
            || format!("{latitude}, {longitude}"),
            |c| c.location_key(),
        );
        Self {
            coordinates,
            location,
            ..Self::new(id, kind, String::new())
        }
    }

    #[must_use]
    pub const fn with_defect_count(mut self, count: u32) -> Self {
        self.defect_count = Some(count);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_contractor(mut self, contractor_id: impl Into<String>) -> Self {
        self.contractor_id = Some(contractor_id.into());
        self
    }

    #[must_use]
    pub fn with_reported_at(mut self, reported_at: impl Into<String>) -> Self {
        self.reported_at = Some(reported_at.into());
        self
    }

    #[must_use]
    pub fn with_road_name(mut self, road_name: impl Into<String>) -> Self {
        self.resolve_road_name(road_name);
        self
    }

    /// The resolved road name, if resolution has completed.
    #[must_use]
    pub fn road_name(&self) -> Option<&str> {
        self.road_name.as_deref()
    }

    /// The grouping key: the road name, or [`UNKNOWN_ROAD`] when unresolved.
    #[must_use]
    pub fn road_key(&self) -> &str {
        self.road_name.as_deref().unwrap_or(UNKNOWN_ROAD)
    }

    /// Sets the road name once. Returns `false` if a name was already set,
    /// in which case the existing name is kept.
    pub fn resolve_road_name(&mut self, road_name: impl Into<String>) -> bool {
        if self.road_name.is_some() {
            return false;
        }
        self.road_name = Some(road_name.into());
        true
    }

    #[must_use]
    pub const fn is_locatable(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Severity label of this record alone. Patches are `Unknown`.
    #[must_use]
    pub fn severity(&self, thresholds: &SeverityThresholds) -> Severity {
        match self.kind {
            RecordKind::Patch => Severity::Unknown,
            RecordKind::Report => thresholds.classify(self.defect_count.unwrap_or(0).into()),
        }
    }
}

/// A contractor that repairs can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: String,
    pub name: String,
    pub company: String,
}

impl Contractor {
    /// Label shown in tables and history, e.g. `"Mohan Das - Urban Road Solutions"`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.company.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.company)
        }
    }
}

/// A verified repair archived in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub location: String,
    pub road_name: String,
    pub severity: Severity,
    /// Contractor label at the time of verification.
    pub contractor: String,
    pub fixed_date: String,
    pub status: RecordStatus,
}

impl HistoryEntry {
    /// Derives the history entry for a record that was just verified.
    #[must_use]
    pub fn verified(
        record: &PointRecord,
        severity: Severity,
        contractor: impl Into<String>,
        fixed_date: impl Into<String>,
    ) -> Self {
        Self {
            id: record.id.clone(),
            location: record.location.clone(),
            road_name: record.road_key().to_string(),
            severity,
            contractor: contractor.into(),
            fixed_date: fixed_date.into(),
            status: RecordStatus::Verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_location_strings() {
        let c = Coordinates::parse("13.0827, 80.2707").unwrap();
        assert!((c.latitude - 13.0827).abs() < 1e-9);
        assert!((c.longitude - 80.2707).abs() < 1e-9);

        assert!(Coordinates::parse("13.0827").is_none());
        assert!(Coordinates::parse("abc, 80.2").is_none());
        assert!(Coordinates::parse("NaN, 80.2").is_none());
        assert!(Coordinates::parse("inf, 80.2").is_none());
        assert!(Coordinates::parse("1, 2, 3").is_none());
    }

    #[test]
    fn unparseable_location_is_unlocatable() {
        let record = PointRecord::new("PH-1", RecordKind::Report, "somewhere");
        assert!(!record.is_locatable());
        assert_eq!(record.road_key(), UNKNOWN_ROAD);
    }

    #[test]
    fn non_finite_coordinates_are_unlocatable() {
        let record = PointRecord::at("PH-1", RecordKind::Report, f64::NAN, 80.0);
        assert!(!record.is_locatable());
    }

    #[test]
    fn road_name_is_set_once() {
        let mut record = PointRecord::new("PH-1", RecordKind::Report, "13.08, 80.27");
        assert!(record.resolve_road_name("Anna Salai"));
        assert!(!record.resolve_road_name("Mount Road"));
        assert_eq!(record.road_name(), Some("Anna Salai"));
    }

    #[test]
    fn patches_have_unknown_severity() {
        let t = SeverityThresholds::default();
        let patch = PointRecord::new("PT-1", RecordKind::Patch, "13.08, 80.27");
        assert_eq!(patch.severity(&t), Severity::Unknown);

        let report = PointRecord::new("PH-1", RecordKind::Report, "13.08, 80.27")
            .with_defect_count(31);
        assert_eq!(report.severity(&t), Severity::High);
    }

    #[test]
    fn contractor_label_joins_name_and_company() {
        let contractor = Contractor {
            id: "c1".to_string(),
            name: "Mohan Das".to_string(),
            company: "Urban Road Solutions".to_string(),
        };
        assert_eq!(contractor.label(), "Mohan Das - Urban Road Solutions");
    }
}
