//! The active (unverified) records a session operates on.

use std::collections::HashSet;

use pothole_admin_pothole_models::{PointRecord, RecordKind, RecordStatus, SeverityThresholds};

use crate::roads::{self, RoadGroup};

/// Active reports and patches, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    reports: Vec<PointRecord>,
    patches: Vec<PointRecord>,
}

impl WorkingSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Splits normalized records by kind.
    ///
    /// Reports that are already verified belong to history and are left
    /// out. Duplicate ids keep their first occurrence.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = PointRecord>) -> Self {
        let mut set = Self::default();
        let mut seen: HashSet<String> = HashSet::new();
        for record in records {
            if !seen.insert(record.id.clone()) {
                log::warn!("Skipping duplicate record id {}", record.id);
                continue;
            }
            match record.kind {
                RecordKind::Report if record.status == RecordStatus::Verified => {
                    log::debug!("Skipping already verified report {}", record.id);
                }
                RecordKind::Report => set.reports.push(record),
                RecordKind::Patch => set.patches.push(record),
            }
        }
        set
    }

    #[must_use]
    pub fn reports(&self) -> &[PointRecord] {
        &self.reports
    }

    #[must_use]
    pub fn patches(&self) -> &[PointRecord] {
        &self.patches
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len() + self.patches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.patches.is_empty()
    }

    /// Mutable access to every record, for road-name resolution.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut PointRecord> {
        self.reports.iter_mut().chain(self.patches.iter_mut())
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&PointRecord> {
        self.reports
            .iter()
            .chain(&self.patches)
            .find(|r| r.id == id)
    }

    #[must_use]
    pub fn find_report(&self, id: &str) -> Option<&PointRecord> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn find_report_mut(&mut self, id: &str) -> Option<&mut PointRecord> {
        self.reports.iter_mut().find(|r| r.id == id)
    }

    /// Removes a report from the working set, returning it.
    pub fn remove_report(&mut self, id: &str) -> Option<PointRecord> {
        let index = self.reports.iter().position(|r| r.id == id)?;
        Some(self.reports.remove(index))
    }

    /// Recomputes the road groups from scratch.
    #[must_use]
    pub fn road_groups(&self, thresholds: &SeverityThresholds) -> Vec<RoadGroup> {
        roads::aggregate(&self.reports, &self.patches, thresholds)
    }
}
