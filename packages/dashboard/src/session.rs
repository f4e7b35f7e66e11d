//! One operator session: injected services plus the local state they feed.
//!
//! A session is built once, loaded, driven through `&mut self` so actions
//! never interleave, and torn down on exit or logout. Nothing here is
//! process-global.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pothole_admin_aggregate::fallback::{self, FallbackDataset};
use pothole_admin_aggregate::normalize::{self, ResolveStats};
use pothole_admin_aggregate::roads::find_group;
use pothole_admin_aggregate::{RoadGroup, SummaryCounts, WorkingSet};
use pothole_admin_api::{ApiError, DashboardBackend};
use pothole_admin_api_models::HistoryQuery;
use pothole_admin_cache::{FileStore, HistoryLog, KeyValueStore, RoadNameCache, auth};
use pothole_admin_geocoder::progress::ProgressCallback;
use pothole_admin_geocoder::throttle::ThrottledResolver;
use pothole_admin_geocoder::{GeocodeError, RoadResolver};
use pothole_admin_pothole_models::{Contractor, HistoryEntry, RecordKind, SeverityThresholds};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::actions::{
    ActionError, ActionOrchestrator, ActionOutcome, AssignDetails, BatchOutcome,
};
use crate::config::DashboardConfig;
use crate::events::{DashboardEvent, EventBus};
use crate::policy::ApplyPolicy;
use crate::state::DashboardState;

/// Per-request timeout for the road resolver's HTTP client.
const RESOLVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors building a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend client could not be built.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The road resolver could not be built.
    #[error(transparent)]
    Geocoder(#[from] GeocodeError),

    /// Every road resolver service is disabled.
    #[error("No road resolver service is enabled")]
    NoResolverService,
}

/// Where a dataset came from on the last load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr)]
pub enum DataSource {
    #[default]
    Backend,
    Fallback,
}

/// What the last [`Session::load`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub records: DataSource,
    pub contractors: DataSource,
    pub history: DataSource,
    pub resolve: ResolveStats,
}

impl LoadReport {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        [self.records, self.contractors, self.history].contains(&DataSource::Fallback)
    }
}

/// Everything a session needs, supplied by the caller.
pub struct SessionDeps {
    pub backend: Arc<dyn DashboardBackend>,
    pub store: Arc<dyn KeyValueStore>,
    pub resolver: Arc<dyn RoadResolver>,
    /// Minimum spacing between consecutive resolver calls.
    pub resolver_delay: Duration,
    pub policy: Arc<dyn ApplyPolicy>,
    pub thresholds: SeverityThresholds,
}

pub struct Session {
    backend: Arc<dyn DashboardBackend>,
    store: Arc<dyn KeyValueStore>,
    road_names: RoadNameCache,
    resolver: ThrottledResolver,
    events: EventBus,
    actions: ActionOrchestrator,
    thresholds: SeverityThresholds,
    state: DashboardState,
    last_load: Option<LoadReport>,
}

impl Session {
    /// Builds a session from injected services.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime (the resolver worker is
    /// spawned here).
    #[must_use]
    pub fn new(deps: SessionDeps) -> Self {
        let events = EventBus::new();
        let actions = ActionOrchestrator::new(
            deps.backend.clone(),
            deps.policy,
            events.clone(),
            deps.thresholds,
        );
        log::debug!("Session apply policy: {}", actions.policy_name());

        Self {
            road_names: RoadNameCache::load(deps.store.clone()),
            state: DashboardState::new(HistoryLog::load(deps.store.clone())),
            resolver: ThrottledResolver::spawn(deps.resolver, deps.resolver_delay),
            backend: deps.backend,
            store: deps.store,
            events,
            actions,
            thresholds: deps.thresholds,
            last_load: None,
        }
    }

    /// Builds a session wired to the configured data directory and the
    /// highest-priority road resolver service.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if no resolver service is enabled or its
    /// HTTP client cannot be built.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(
        config: &DashboardConfig,
        backend: Arc<dyn DashboardBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, SessionError> {
        let service =
            pothole_admin_geocoder::primary_service().ok_or(SessionError::NoResolverService)?;
        log::info!("Resolving road names with {} ({})", service.name, service.base_url());

        let client = reqwest::Client::builder()
            .user_agent(pothole_admin_geocoder::user_agent(
                config.contact_email.as_deref(),
            ))
            .timeout(RESOLVER_TIMEOUT)
            .build()
            .map_err(GeocodeError::from)?;

        Ok(Self::new(SessionDeps {
            backend,
            store,
            resolver: pothole_admin_geocoder::resolver_for(&service, client),
            resolver_delay: service.rate_limit(),
            policy: config.apply_policy.policy(),
            thresholds: config.thresholds,
        }))
    }

    /// Opens the file store under the configured data directory.
    #[must_use]
    pub fn open_store(config: &DashboardConfig) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(config.store_dir()))
    }

    /// Fetches locations, contractors, and history, then resolves missing
    /// road names.
    ///
    /// Each dataset falls back to the embedded demo data independently when
    /// its backend call fails. Never fails itself.
    pub async fn load(&mut self, progress: &Arc<dyn ProgressCallback>) -> LoadReport {
        let mut demo: Option<FallbackDataset> = None;
        let mut report = LoadReport::default();

        let records = match self.backend.locations().await {
            Ok(rows) => {
                log::info!("Loaded {} locations from the backend", rows.len());
                rows.iter().map(normalize::normalize_location).collect()
            }
            Err(e) => {
                log::warn!("Failed to load locations, using demo data: {e}");
                report.records = DataSource::Fallback;
                demo.get_or_insert_with(fallback::dataset).records()
            }
        };

        self.state.contractors = match self.backend.contractors().await {
            Ok(rows) => rows.into_iter().map(Contractor::from).collect(),
            Err(e) => {
                log::warn!("Failed to load contractors, using demo data: {e}");
                report.contractors = DataSource::Fallback;
                demo.get_or_insert_with(fallback::dataset)
                    .contractors
                    .clone()
            }
        };

        self.state.remote_history = match self.backend.history(&HistoryQuery::default()).await {
            Ok(rows) => rows.into_iter().map(HistoryEntry::from).collect(),
            Err(e) => {
                log::warn!("Failed to load repair history, using demo data: {e}");
                report.history = DataSource::Fallback;
                demo.get_or_insert_with(fallback::dataset).repairs.clone()
            }
        };

        let verified: HashSet<String> = self
            .state
            .history_entries()
            .into_iter()
            .map(|e| e.id)
            .collect();
        self.state.working_set = WorkingSet::from_records(records.into_iter().filter(|r| {
            let done = r.kind == RecordKind::Report && verified.contains(&r.id);
            if done {
                log::debug!("Skipping {}: already in the repair history", r.id);
            }
            !done
        }));
        report.resolve = normalize::resolve_road_names(
            self.state.working_set.records_mut(),
            &mut self.road_names,
            &self.resolver,
            progress,
        )
        .await;

        log::info!(
            "Session loaded: {} reports, {} patches, {} contractors, {} verified repairs",
            self.state.working_set.reports().len(),
            self.state.working_set.patches().len(),
            self.state.contractors.len(),
            self.state.history_entries().len()
        );

        self.last_load = Some(report);
        report
    }

    /// The report from the most recent [`Self::load`], if any.
    #[must_use]
    pub const fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    #[must_use]
    pub fn road_groups(&self) -> Vec<RoadGroup> {
        self.state.working_set.road_groups(&self.thresholds)
    }

    #[must_use]
    pub fn road(&self, road_name: &str) -> Option<RoadGroup> {
        find_group(&self.road_groups(), road_name).cloned()
    }

    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        self.state.summary()
    }

    #[must_use]
    pub fn contractors(&self) -> &[Contractor] {
        &self.state.contractors
    }

    /// Verified repairs: backend (or demo) history plus local entries.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.history_entries()
    }

    /// Asks the backend for a filtered history. On failure the local
    /// history is filtered by road instead; date bounds are then ignored.
    pub async fn query_history(&self, query: &HistoryQuery) -> Vec<HistoryEntry> {
        match self.backend.history(query).await {
            Ok(rows) => rows.into_iter().map(HistoryEntry::from).collect(),
            Err(e) => {
                log::warn!("History query failed, filtering local history: {e}");
                self.history()
                    .into_iter()
                    .filter(|entry| {
                        query
                            .road_name
                            .as_deref()
                            .is_none_or(|road| entry.road_name.eq_ignore_ascii_case(road))
                    })
                    .collect()
            }
        }
    }

    #[must_use]
    pub const fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    #[must_use]
    pub const fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Receives change notifications for this session.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// See [`ActionOrchestrator::assign_with_details`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] on invalid input; nothing is sent then.
    pub async fn assign(
        &mut self,
        record_id: &str,
        contractor_id: &str,
        details: &AssignDetails,
    ) -> Result<ActionOutcome, ActionError> {
        self.actions
            .assign_with_details(&mut self.state, record_id, contractor_id, details)
            .await
    }

    /// See [`ActionOrchestrator::verify`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] on invalid input; nothing is sent then.
    pub async fn verify(
        &mut self,
        record_id: &str,
        notes: Option<&str>,
    ) -> Result<ActionOutcome, ActionError> {
        self.actions.verify(&mut self.state, record_id, notes).await
    }

    /// See [`ActionOrchestrator::reject_verification`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] on invalid input; nothing is sent then.
    pub async fn reject_verification(
        &mut self,
        record_id: &str,
        reason: &str,
    ) -> Result<ActionOutcome, ActionError> {
        self.actions
            .reject_verification(&mut self.state, record_id, reason)
            .await
    }

    /// See [`ActionOrchestrator::batch_assign`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] on invalid input; nothing is sent then.
    pub async fn batch_assign(
        &mut self,
        road: &str,
        contractor_id: &str,
        details: &AssignDetails,
    ) -> Result<BatchOutcome, ActionError> {
        self.actions
            .batch_assign(&mut self.state, road, contractor_id, details)
            .await
    }

    /// See [`ActionOrchestrator::batch_verify`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] on invalid input; nothing is sent then.
    pub async fn batch_verify(
        &mut self,
        road: &str,
        notes: Option<&str>,
    ) -> Result<BatchOutcome, ActionError> {
        self.actions
            .batch_verify(&mut self.state, road, notes)
            .await
    }

    /// Stops the resolver worker and drops local state. Persisted caches
    /// and history stay on disk.
    pub async fn teardown(self) {
        self.resolver.shutdown().await;
        log::debug!("Session torn down");
    }

    /// Forgets the stored bearer token, then tears down.
    pub async fn logout(self) {
        auth::save_token(self.store.as_ref(), None);
        log::info!("Logged out");
        self.teardown().await;
    }
}

#[cfg(test)]
mod tests {
    use pothole_admin_api_models::{ApiContractor, ApiHistoryEntry, ApiLocation};
    use pothole_admin_cache::MemoryStore;
    use pothole_admin_geocoder::progress::null_progress;
    use pothole_admin_pothole_models::{RecordStatus, Severity, UNKNOWN_ROAD};

    use super::*;
    use crate::policy::OptimisticApply;
    use crate::testing::{FakeBackend, FixedResolver};

    fn location(json: serde_json::Value) -> ApiLocation {
        serde_json::from_value(json).unwrap()
    }

    fn online_backend() -> FakeBackend {
        FakeBackend {
            locations: vec![
                location(serde_json::json!({
                    "id": "L1", "latitude": 13.08, "longitude": 80.27,
                    "totalDefects": 8, "roadName": "Anna Salai"
                })),
                location(serde_json::json!({
                    "id": "L2", "latitude": 13.06, "longitude": 80.24,
                    "totalDefects": 31, "status": "completed", "contractorId": "c1"
                })),
                location(serde_json::json!({
                    "id": "L3", "latitude": "n/a", "longitude": 80.24, "totalDefects": 3
                })),
                location(serde_json::json!({
                    "id": "L4", "latitude": 13.05, "longitude": 80.25,
                    "totalDefects": 12, "status": "verified", "roadName": "Anna Salai"
                })),
            ],
            contractors: vec![
                serde_json::from_value::<ApiContractor>(serde_json::json!({
                    "id": "c1", "name": "Mohan Das", "company": "Urban Road Solutions"
                }))
                .unwrap(),
            ],
            history: vec![
                serde_json::from_value::<ApiHistoryEntry>(serde_json::json!({
                    "id": "H1", "location": "13.0, 80.0", "roadName": "Cathedral Road",
                    "severity": "Low", "contractor": "Mohan Das - Urban Road Solutions",
                    "fixedDate": "Jan 10, 2024 10:00"
                }))
                .unwrap(),
            ],
            ..FakeBackend::default()
        }
    }

    fn session(backend: FakeBackend, store: Arc<dyn KeyValueStore>) -> Session {
        Session::new(SessionDeps {
            backend: Arc::new(backend),
            store,
            resolver: Arc::new(FixedResolver(Some("Mount Road"))),
            resolver_delay: Duration::ZERO,
            policy: Arc::new(OptimisticApply),
            thresholds: SeverityThresholds::default(),
        })
    }

    #[tokio::test]
    async fn loads_and_groups_backend_data() {
        let mut session = session(online_backend(), Arc::new(MemoryStore::new()));
        let report = session.load(&null_progress()).await;

        assert!(!report.used_fallback());
        assert_eq!(report.resolve.already_named, 1);
        assert_eq!(report.resolve.lookups, 1);
        assert_eq!(report.resolve.unlocatable, 1);

        let groups = session.road_groups();
        let names: Vec<&str> = groups.iter().map(|g| g.road_name.as_str()).collect();
        assert_eq!(names, vec!["Anna Salai", "Mount Road", UNKNOWN_ROAD]);

        let mount = session.road("Mount Road").unwrap();
        assert_eq!(mount.status, RecordStatus::PendingVerification);
        assert_eq!(mount.avg_severity, Severity::High);

        assert_eq!(session.contractors().len(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.summary().pending_verification, 1);
        assert_eq!(session.summary().verified, 1);
        session.teardown().await;
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_to_demo_data() {
        let mut session = session(FakeBackend::offline(), Arc::new(MemoryStore::new()));
        let report = session.load(&null_progress()).await;

        assert!(report.used_fallback());
        assert_eq!(report.records, DataSource::Fallback);
        assert!(session.road("Anna Salai").is_some());
        assert!(!session.contractors().is_empty());
        assert!(!session.history().is_empty());
        session.teardown().await;
    }

    #[tokio::test]
    async fn verify_updates_summary_and_notifies() {
        let mut session = session(online_backend(), Arc::new(MemoryStore::new()));
        session.load(&null_progress()).await;
        let mut events = session.subscribe();
        let before = session.summary();

        let outcome = session.verify("L2", None).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { confirmed: true });

        let after = session.summary();
        assert_eq!(after.verified, before.verified + 1);
        assert_eq!(after.pending_verification, before.pending_verification - 1);
        assert!(session.road("Mount Road").is_none());
        assert!(matches!(
            events.recv().await.unwrap(),
            DashboardEvent::HistoryAppended { ref id, total: 2 } if id == "L2"
        ));
        session.teardown().await;
    }

    #[tokio::test]
    async fn road_names_persist_across_sessions() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut first = session(online_backend(), store.clone());
        first.load(&null_progress()).await;
        first.teardown().await;

        let mut second = session(online_backend(), store);
        let report = second.load(&null_progress()).await;
        assert_eq!(report.resolve.lookups, 0);
        assert_eq!(report.resolve.cache_hits, 1);
        second.teardown().await;
    }

    #[tokio::test]
    async fn local_history_survives_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut first = session(FakeBackend::offline(), store.clone());
        first.load(&null_progress()).await;
        let pending = first
            .state()
            .working_set
            .reports()
            .iter()
            .find(|r| r.status == RecordStatus::PendingVerification)
            .map(|r| r.id.clone())
            .unwrap();
        first.verify(&pending, None).await.unwrap();
        first.teardown().await;

        let mut second = session(FakeBackend::offline(), store);
        second.load(&null_progress()).await;
        assert!(second.history().iter().any(|e| e.id == pending));
        second.teardown().await;
    }

    #[tokio::test]
    async fn verified_reports_stay_out_of_later_sessions() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut first = session(FakeBackend::offline(), store.clone());
        first.load(&null_progress()).await;
        let before = first.summary();
        first.verify("PH-2024-004", None).await.unwrap();
        let verified = first.summary().verified;
        first.teardown().await;

        let mut second = session(FakeBackend::offline(), store.clone());
        second.load(&null_progress()).await;
        assert!(second.state().working_set.find("PH-2024-004").is_none());
        let after = second.summary();
        assert_eq!(after.pending_verification, before.pending_verification - 1);
        assert_eq!(after.verified, verified);
        assert_eq!(
            second.verify("PH-2024-004", None).await,
            Err(ActionError::UnknownRecord {
                id: "PH-2024-004".to_string()
            })
        );
        assert_eq!(second.state().history.len(), 1);
        second.teardown().await;
    }

    #[tokio::test]
    async fn logout_clears_the_stored_token() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        auth::save_token(store.as_ref(), Some("secret"));

        let session = session(online_backend(), store.clone());
        session.logout().await;
        assert!(auth::load_token(store.as_ref()).is_none());
    }

    #[tokio::test]
    async fn history_query_falls_back_to_local_filter() {
        let mut session = session(FakeBackend::offline(), Arc::new(MemoryStore::new()));
        session.load(&null_progress()).await;

        let query = HistoryQuery {
            road_name: Some("kamarajar salai".to_string()),
            ..HistoryQuery::default()
        };
        let entries = session.query_history(&query).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].road_name, "Kamarajar Salai");
        session.teardown().await;
    }
}
