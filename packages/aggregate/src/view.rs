//! Filtering, sorting, and pagination of road groups and history entries.
//!
//! All of this is presentation only: it never changes the groups
//! themselves, and the groups' canonical first-seen order stays available
//! through [`RoadSort::FirstSeen`].

use std::cmp::Ordering;

use pothole_admin_pothole_models::{HistoryEntry, RecordStatus, Severity};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::roads::RoadGroup;

/// Narrows the road table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadFilter {
    /// Free-text search. Empty matches everything.
    pub query: String,
    pub severity: Option<Severity>,
    pub status: Option<RecordStatus>,
}

impl RoadFilter {
    #[must_use]
    pub fn matches(&self, group: &RoadGroup) -> bool {
        if self.severity.is_some_and(|s| s != group.avg_severity) {
            return false;
        }
        if self.status.is_some_and(|s| s != group.status) {
            return false;
        }

        let Some(needle) = needle(&self.query) else {
            return true;
        };

        contains(&group.road_name, &needle)
            || contains(group.avg_severity.as_ref(), &needle)
            || contains(&group.status.to_string(), &needle)
            || group
                .records()
                .any(|r| contains(&r.id, &needle) || contains(&r.location, &needle))
    }

    /// Keeps the matching groups, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, groups: &'a [RoadGroup]) -> Vec<&'a RoadGroup> {
        groups.iter().filter(|g| self.matches(g)).collect()
    }
}

/// Narrows the verified-repair history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub query: String,
}

impl HistoryFilter {
    #[must_use]
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let Some(needle) = needle(&self.query) else {
            return true;
        };

        [
            entry.id.as_str(),
            entry.location.as_str(),
            entry.road_name.as_str(),
            entry.contractor.as_str(),
            entry.severity.as_ref(),
        ]
        .iter()
        .any(|field| contains(field, &needle))
    }

    #[must_use]
    pub fn apply<'a>(&self, entries: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

fn needle(query: &str) -> Option<String> {
    let query = query.trim();
    (!query.is_empty()).then(|| query.to_lowercase())
}

fn contains(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Column to order the road table by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum RoadSort {
    /// Aggregation order (reports' first appearance).
    #[default]
    FirstSeen,
    RoadName,
    Potholes,
    Severity,
    ReportedTime,
}

impl RoadSort {
    fn compare(self, a: &RoadGroup, b: &RoadGroup) -> Ordering {
        match self {
            Self::FirstSeen => Ordering::Equal,
            Self::RoadName => a
                .road_name
                .to_lowercase()
                .cmp(&b.road_name.to_lowercase()),
            Self::Potholes => a
                .num_potholes
                .cmp(&b.num_potholes)
                .then(a.total_defects.cmp(&b.total_defects)),
            Self::Severity => a.avg_severity.cmp(&b.avg_severity),
            Self::ReportedTime => a.reported_time.cmp(&b.reported_time),
        }
    }
}

/// Sorts in place. Stable, so ties keep first-seen order.
///
/// `FirstSeen` ignores `descending` since first-seen order has no
/// meaningful reverse.
pub fn sort_groups(groups: &mut [&RoadGroup], sort: RoadSort, descending: bool) {
    groups.sort_by(|a, b| {
        let ordering = sort.compare(a, b);
        if descending { ordering.reverse() } else { ordering }
    });
}

/// One page of a larger list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually returned.
    pub page: usize,
    pub page_size: usize,
    /// Always at least 1, even for an empty list.
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Cuts one page out of `items`.
///
/// `page` is 1-based and clamped into `1..=total_pages`. A zero
/// `page_size` is treated as 1.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        page_size,
        total_pages,
        total_items,
    }
}
