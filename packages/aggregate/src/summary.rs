//! Dashboard summary cards.

use pothole_admin_pothole_models::{PointRecord, RecordStatus};
use serde::Serialize;

/// Counts shown above the road table.
///
/// Active reports are counted by status; `verified` is the length of the
/// verified-repair history, since verified reports leave the working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub reported: usize,
    pub assigned: usize,
    pub pending_verification: usize,
    pub verified: usize,
}

impl SummaryCounts {
    #[must_use]
    pub fn compute(reports: &[PointRecord], history_len: usize) -> Self {
        let mut counts = Self {
            verified: history_len,
            ..Self::default()
        };
        for report in reports {
            match report.status {
                RecordStatus::Reported => counts.reported += 1,
                RecordStatus::Assigned => counts.assigned += 1,
                RecordStatus::PendingVerification => counts.pending_verification += 1,
                RecordStatus::Verified => counts.verified += 1,
            }
        }
        counts
    }

    /// Reports still needing action.
    #[must_use]
    pub const fn open(&self) -> usize {
        self.reported + self.assigned + self.pending_verification
    }
}
