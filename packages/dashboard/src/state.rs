//! Local state a session's actions mutate.

use pothole_admin_aggregate::{SummaryCounts, WorkingSet};
use pothole_admin_cache::HistoryLog;
use pothole_admin_pothole_models::{Contractor, HistoryEntry};

/// Label used in history for records that were never assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Active records, reference data, and the verified-repair history.
pub struct DashboardState {
    pub working_set: WorkingSet,
    pub contractors: Vec<Contractor>,
    /// Locally verified repairs, persisted across sessions.
    pub history: HistoryLog,
    /// Verified repairs reported by the backend (or fallback data).
    pub remote_history: Vec<HistoryEntry>,
}

impl DashboardState {
    #[must_use]
    pub const fn new(history: HistoryLog) -> Self {
        Self {
            working_set: WorkingSet::new(),
            contractors: Vec::new(),
            history,
            remote_history: Vec::new(),
        }
    }

    #[must_use]
    pub fn contractor(&self, id: &str) -> Option<&Contractor> {
        self.contractors.iter().find(|c| c.id == id)
    }

    /// The contractor's display label; the raw id when the contractor is
    /// not in the list, or [`UNASSIGNED`] when there is none.
    #[must_use]
    pub fn contractor_label(&self, id: Option<&str>) -> String {
        match id {
            None => UNASSIGNED.to_string(),
            Some(id) => self
                .contractor(id)
                .map_or_else(|| id.to_string(), Contractor::label),
        }
    }

    /// Remote history followed by local entries the backend does not know
    /// about yet.
    #[must_use]
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        let mut entries = self.remote_history.clone();
        for entry in self.history.entries() {
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry.clone());
            }
        }
        entries
    }

    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        SummaryCounts::compute(self.working_set.reports(), self.history_entries().len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pothole_admin_cache::MemoryStore;
    use pothole_admin_pothole_models::{RecordStatus, Severity};

    use super::*;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            location: "13.0, 80.0".to_string(),
            road_name: "Anna Salai".to_string(),
            severity: Severity::Low,
            contractor: UNASSIGNED.to_string(),
            fixed_date: "Jan 13, 2024 15:30".to_string(),
            status: RecordStatus::Verified,
        }
    }

    #[test]
    fn contractor_labels() {
        let mut state = DashboardState::new(HistoryLog::load(Arc::new(MemoryStore::new())));
        state.contractors.push(Contractor {
            id: "c1".to_string(),
            name: "Mohan Das".to_string(),
            company: "Urban Road Solutions".to_string(),
        });

        assert_eq!(
            state.contractor_label(Some("c1")),
            "Mohan Das - Urban Road Solutions"
        );
        assert_eq!(state.contractor_label(Some("c9")), "c9");
        assert_eq!(state.contractor_label(None), UNASSIGNED);
    }

    #[test]
    fn history_merges_without_duplicates() {
        let mut state = DashboardState::new(HistoryLog::load(Arc::new(MemoryStore::new())));
        state.remote_history = vec![entry("a"), entry("b")];
        state.history.append(entry("b"));
        state.history.append(entry("c"));

        let ids: Vec<String> = state.history_entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(state.summary().verified, 3);
    }
}
