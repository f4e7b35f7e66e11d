#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session orchestration for the pothole admin dashboard.
//!
//! A [`Session`] owns the injected backend, key-value store, and road
//! resolver, loads the working set (falling back to embedded demo data
//! when the backend is unreachable), and exposes the road-level views and
//! operator actions on top of it. Configuration comes from environment
//! variables via [`DashboardConfig`].

pub mod actions;
pub mod config;
pub mod events;
pub mod policy;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use actions::{ActionError, ActionOutcome, AssignDetails, BatchOutcome};
pub use config::{ConfigError, DashboardConfig};
pub use events::DashboardEvent;
pub use policy::{ApplyPolicy, ApplyPolicyKind};
pub use session::{DataSource, LoadReport, Session, SessionDeps, SessionError};
pub use state::DashboardState;
