//! Conversion of raw rows into canonical [`PointRecord`]s and road-name
//! resolution.
//!
//! Normalization never fails: counts that don't parse become zero,
//! coordinates that don't parse leave the record unlocatable, and
//! unrecognized statuses become `Reported`. Road names come from (in
//! order) the row itself, the persistent cache, or the throttled resolver.
//! Every resolver answer, including "no road", is cached so a coordinate
//! is looked up at most once across sessions.

use std::sync::Arc;

use pothole_admin_api_models::{ApiLocation, value_as_f64};
use pothole_admin_cache::RoadNameCache;
use pothole_admin_geocoder::progress::ProgressCallback;
use pothole_admin_geocoder::throttle::ThrottledResolver;
use pothole_admin_pothole_models::{
    PointRecord, RecordKind, RecordStatus, UNKNOWN_ROAD, defect_count_from_value,
};

use crate::fallback::FallbackRecord;

/// Converts one backend location row.
#[must_use]
pub fn normalize_location(row: &ApiLocation) -> PointRecord {
    let kind = if row.is_patch() {
        RecordKind::Patch
    } else {
        RecordKind::Report
    };

    let mut record = match (value_as_f64(&row.latitude), value_as_f64(&row.longitude)) {
        (Some(lat), Some(lon)) => PointRecord::at(&row.id, kind, lat, lon),
        _ => {
            log::debug!("Location {} has no usable coordinates", row.id);
            PointRecord::new(
                &row.id,
                kind,
                format!("{}, {}", row.latitude, row.longitude),
            )
        }
    };

    if kind == RecordKind::Report {
        record.defect_count = Some(defect_count_from_value(&row.total_defects));
    }
    record.status = row
        .status
        .as_deref()
        .map_or(RecordStatus::Reported, RecordStatus::parse_loose);
    record.contractor_id.clone_from(&row.contractor_id);
    record.reported_at.clone_from(&row.last_reported);
    apply_known_road(&mut record, row.road_name.as_deref());

    record
}

/// Converts one fallback row of the given kind.
#[must_use]
pub fn normalize_fallback(row: &FallbackRecord, kind: RecordKind) -> PointRecord {
    let mut record = PointRecord::new(&row.id, kind, row.location.trim());

    if kind == RecordKind::Report {
        let count = row
            .defect_count
            .map_or(0, |c| u32::try_from(c.max(0)).unwrap_or(u32::MAX));
        record.defect_count = Some(count);
    }
    record.status = row
        .status
        .as_deref()
        .map_or(RecordStatus::Reported, RecordStatus::parse_loose);
    record.contractor_id.clone_from(&row.contractor_id);
    record.reported_at.clone_from(&row.reported_at);
    apply_known_road(&mut record, row.road_name.as_deref());

    record
}

fn apply_known_road(record: &mut PointRecord, road_name: Option<&str>) {
    if let Some(name) = road_name.map(str::trim).filter(|n| !n.is_empty()) {
        record.resolve_road_name(name);
    }
}

/// What a resolution pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Records that already carried a road name.
    pub already_named: usize,
    /// Records answered from the cache.
    pub cache_hits: usize,
    /// Records that needed a resolver call.
    pub lookups: usize,
    /// Records with no usable coordinates.
    pub unlocatable: usize,
}

/// Fills in the road name of every record that lacks one.
///
/// Records that already have a name are never sent to the resolver.
/// Failed lookups resolve to [`UNKNOWN_ROAD`] and are cached like any
/// other answer. Unlocatable records become [`UNKNOWN_ROAD`] without a
/// lookup and without touching the cache.
pub async fn resolve_road_names<'a>(
    records: impl IntoIterator<Item = &'a mut PointRecord>,
    cache: &mut RoadNameCache,
    resolver: &ThrottledResolver,
    progress: &Arc<dyn ProgressCallback>,
) -> ResolveStats {
    let mut stats = ResolveStats::default();
    let mut pending = Vec::new();

    for record in records {
        if record.road_name().is_some() {
            stats.already_named += 1;
        } else {
            pending.push(record);
        }
    }

    if pending.is_empty() {
        return stats;
    }

    progress.set_total(u64::try_from(pending.len()).unwrap_or(u64::MAX));
    progress.set_message("Resolving road names".to_string());

    for record in pending {
        let name = match record.coordinates {
            None => {
                stats.unlocatable += 1;
                UNKNOWN_ROAD.to_string()
            }
            Some(coords) => {
                if let Some(cached) = cache.get(&record.location) {
                    stats.cache_hits += 1;
                    cached.to_string()
                } else {
                    stats.lookups += 1;
                    let name = resolver
                        .resolve(coords)
                        .await
                        .unwrap_or_else(|| UNKNOWN_ROAD.to_string());
                    cache.insert(record.location.clone(), name.clone());
                    name
                }
            }
        };

        record.resolve_road_name(name);
        progress.inc(1);
    }

    progress.finish(format!(
        "{} cached, {} looked up, {} unlocatable",
        stats.cache_hits, stats.lookups, stats.unlocatable
    ));
    log::info!(
        "Road names: {} already named, {} from cache, {} looked up, {} unlocatable",
        stats.already_named,
        stats.cache_hits,
        stats.lookups,
        stats.unlocatable
    );

    stats
}
