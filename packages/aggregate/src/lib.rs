#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record normalization and road-level aggregation.
//!
//! Raw rows (backend locations or embedded fallback data) flow through
//! [`normalize`] into canonical [`PointRecord`]s with resolved road names,
//! are held in a [`WorkingSet`], grouped per road by [`roads::aggregate`],
//! and finally filtered, sorted, and paginated by [`view`] for display.
//!
//! Nothing in the aggregation path returns an error. Unparseable counts,
//! coordinates, and timestamps degrade to documented sentinels so the
//! dashboard always has something to render.
//!
//! [`PointRecord`]: pothole_admin_pothole_models::PointRecord

pub mod fallback;
pub mod normalize;
pub mod roads;
pub mod summary;
pub mod view;
pub mod working_set;

pub use roads::{ReportedTime, RoadGroup, aggregate};
pub use summary::SummaryCounts;
pub use working_set::WorkingSet;
