//! Operator actions: assign, verify, and reject, single or per road.
//!
//! Each action validates its input locally, sends one best-effort intent
//! to the backend (logged on failure, never retried), then lets the
//! configured [`ApplyPolicy`] decide whether the working set follows. The
//! local half runs against whatever state exists once the call returns;
//! if the target has gone by then the result is discarded.

use std::future::Future;
use std::sync::Arc;

use pothole_admin_aggregate::roads::DISPLAY_FORMAT;
use pothole_admin_api::{ApiError, DashboardBackend};
use pothole_admin_api_models::{
    AssignRequest, BatchAssignRequest, BatchVerifyRequest, RejectRequest, VerifyRequest,
};
use pothole_admin_pothole_models::{HistoryEntry, PointRecord, RecordStatus, SeverityThresholds};
use thiserror::Error;

use crate::events::{DashboardEvent, EventBus};
use crate::policy::ApplyPolicy;
use crate::state::DashboardState;

/// Input problems caught before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// No contractor was chosen.
    #[error("Select a contractor first")]
    MissingContractor,

    /// The contractor is not in the loaded contractor list.
    #[error("Unknown contractor '{id}'")]
    UnknownContractor {
        /// The id given.
        id: String,
    },

    /// Rejecting a repair needs a reason.
    #[error("Give a reason for sending the repair back")]
    MissingReason,

    /// No active report has this id.
    #[error("No active report with id '{id}'")]
    UnknownRecord {
        /// The id given.
        id: String,
    },

    /// The report is not waiting for verification.
    #[error("Report '{id}' is not pending verification")]
    NotPendingVerification {
        /// The report id.
        id: String,
    },

    /// No active record sits on this road.
    #[error("No road named '{road}'")]
    UnknownRoad {
        /// The road name given.
        road: String,
    },
}

/// What happened to a single-record action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Local state was updated. `confirmed` is whether the backend
    /// accepted the call.
    Applied { confirmed: bool },
    /// The backend failed and the policy left local state alone.
    NotApplied,
    /// The target was gone from the working set when the result was
    /// applied. The actions on [`ActionOrchestrator`] hold the state
    /// mutably across the backend call, so the record cannot vanish
    /// mid-call through them; this only surfaces when the apply step runs
    /// against state that changed in between.
    Discarded,
}

/// What happened to a per-road action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Eligible report ids, in road order. Empty means nothing was sent.
    pub targeted: Vec<String>,
    pub applied: Vec<String>,
    pub discarded: Vec<String>,
    /// Whether the backend accepted the batch call.
    pub confirmed: bool,
}

/// Optional extras sent with an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignDetails {
    pub due_date: Option<String>,
    pub notes: Option<String>,
}

/// Sends operator intents and applies their local effects.
pub struct ActionOrchestrator {
    backend: Arc<dyn DashboardBackend>,
    policy: Arc<dyn ApplyPolicy>,
    events: EventBus,
    thresholds: SeverityThresholds,
}

impl ActionOrchestrator {
    #[must_use]
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        policy: Arc<dyn ApplyPolicy>,
        events: EventBus,
        thresholds: SeverityThresholds,
    ) -> Self {
        Self {
            backend,
            policy,
            events,
            thresholds,
        }
    }

    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Assigns one report to a contractor.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the contractor is blank or unknown, or
    /// the report is not in the working set. Nothing is sent in that case.
    pub async fn assign(
        &self,
        state: &mut DashboardState,
        record_id: &str,
        contractor_id: &str,
    ) -> Result<ActionOutcome, ActionError> {
        self.assign_with_details(state, record_id, contractor_id, &AssignDetails::default())
            .await
    }

    /// Like [`Self::assign`], also sending a due date and notes.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub async fn assign_with_details(
        &self,
        state: &mut DashboardState,
        record_id: &str,
        contractor_id: &str,
        details: &AssignDetails,
    ) -> Result<ActionOutcome, ActionError> {
        let contractor_id = require_contractor(state, contractor_id)?;
        require_report(state, record_id)?;

        let request = AssignRequest {
            location_id: record_id.to_string(),
            contractor_id: contractor_id.clone(),
            due_date: details.due_date.clone(),
            notes: details.notes.clone(),
        };
        let accepted = send("assign", record_id, self.backend.assign(&request)).await;

        if !self.should_apply(accepted) {
            return Ok(ActionOutcome::NotApplied);
        }
        let outcome = apply_assign(state, record_id, &contractor_id, accepted);
        if matches!(outcome, ActionOutcome::Applied { .. }) {
            self.events.publish(DashboardEvent::RecordsChanged {
                ids: vec![record_id.to_string()],
            });
        }
        Ok(outcome)
    }

    /// Verifies one report's repair, moving it into the history log.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownRecord`] if the report is not in the
    /// working set. Nothing is sent in that case.
    pub async fn verify(
        &self,
        state: &mut DashboardState,
        record_id: &str,
        notes: Option<&str>,
    ) -> Result<ActionOutcome, ActionError> {
        require_report(state, record_id)?;

        let request = VerifyRequest {
            notes: notes.map(str::to_string),
        };
        let accepted = send(
            "verify",
            record_id,
            self.backend.verify(record_id, &request),
        )
        .await;

        if !self.should_apply(accepted) {
            return Ok(ActionOutcome::NotApplied);
        }
        let outcome = apply_verify(state, record_id, &self.thresholds, accepted);
        if matches!(outcome, ActionOutcome::Applied { .. }) {
            self.announce_verified(state, record_id);
        }
        Ok(outcome)
    }

    /// Sends a completed repair back to its contractor.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the reason is blank, the report is not in
    /// the working set, or it is not pending verification.
    pub async fn reject_verification(
        &self,
        state: &mut DashboardState,
        record_id: &str,
        reason: &str,
    ) -> Result<ActionOutcome, ActionError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ActionError::MissingReason);
        }
        let record = require_report(state, record_id)?;
        if record.status != RecordStatus::PendingVerification {
            return Err(ActionError::NotPendingVerification {
                id: record_id.to_string(),
            });
        }

        let request = RejectRequest {
            reason: reason.to_string(),
        };
        let accepted = send(
            "reject",
            record_id,
            self.backend.reject_verification(record_id, &request),
        )
        .await;

        if !self.should_apply(accepted) {
            return Ok(ActionOutcome::NotApplied);
        }
        let outcome = apply_reject(state, record_id, accepted);
        if matches!(outcome, ActionOutcome::Applied { .. }) {
            self.events.publish(DashboardEvent::RecordsChanged {
                ids: vec![record_id.to_string()],
            });
        }
        Ok(outcome)
    }

    /// Assigns every eligible report on `road` to one contractor.
    ///
    /// Eligible reports have no contractor and are not pending
    /// verification. Patches are never targeted. No eligible report means
    /// no backend call.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the contractor is blank or unknown, or no
    /// active record sits on `road`.
    pub async fn batch_assign(
        &self,
        state: &mut DashboardState,
        road: &str,
        contractor_id: &str,
        details: &AssignDetails,
    ) -> Result<BatchOutcome, ActionError> {
        let contractor_id = require_contractor(state, contractor_id)?;
        let road = require_road(state, road)?;

        let targeted: Vec<String> = state
            .working_set
            .reports()
            .iter()
            .filter(|r| r.road_key() == road)
            .filter(|r| r.contractor_id.is_none() && r.status != RecordStatus::PendingVerification)
            .map(|r| r.id.clone())
            .collect();
        if targeted.is_empty() {
            log::info!("No unassigned reports on {road}");
            return Ok(BatchOutcome::default());
        }

        let request = BatchAssignRequest {
            location_ids: targeted.clone(),
            contractor_id: contractor_id.clone(),
            due_date: details.due_date.clone(),
            notes: details.notes.clone(),
        };
        let accepted = send("batch assign", &road, self.backend.batch_assign(&request)).await;

        let mut outcome = BatchOutcome {
            confirmed: accepted,
            ..BatchOutcome::default()
        };
        if self.should_apply(accepted) {
            for id in &targeted {
                match apply_assign(state, id, &contractor_id, accepted) {
                    ActionOutcome::Applied { .. } => outcome.applied.push(id.clone()),
                    _ => outcome.discarded.push(id.clone()),
                }
            }
        }
        if !outcome.applied.is_empty() {
            self.events.publish(DashboardEvent::RecordsChanged {
                ids: outcome.applied.clone(),
            });
        }
        outcome.targeted = targeted;
        Ok(outcome)
    }

    /// Verifies every report on `road` that is pending verification.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownRoad`] if no active record sits on
    /// `road`.
    pub async fn batch_verify(
        &self,
        state: &mut DashboardState,
        road: &str,
        notes: Option<&str>,
    ) -> Result<BatchOutcome, ActionError> {
        let road = require_road(state, road)?;

        let targeted: Vec<String> = state
            .working_set
            .reports()
            .iter()
            .filter(|r| r.road_key() == road && r.status == RecordStatus::PendingVerification)
            .map(|r| r.id.clone())
            .collect();
        if targeted.is_empty() {
            log::info!("No reports awaiting verification on {road}");
            return Ok(BatchOutcome::default());
        }

        let request = BatchVerifyRequest {
            location_ids: targeted.clone(),
            notes: notes.unwrap_or_default().to_string(),
        };
        let accepted = send("batch verify", &road, self.backend.batch_verify(&request)).await;

        let mut outcome = BatchOutcome {
            confirmed: accepted,
            ..BatchOutcome::default()
        };
        if self.should_apply(accepted) {
            for id in &targeted {
                match apply_verify(state, id, &self.thresholds, accepted) {
                    ActionOutcome::Applied { .. } => {
                        self.announce_verified(state, id);
                        outcome.applied.push(id.clone());
                    }
                    _ => outcome.discarded.push(id.clone()),
                }
            }
        }
        outcome.targeted = targeted;
        Ok(outcome)
    }

    fn should_apply(&self, accepted: bool) -> bool {
        let apply = self.policy.should_apply(accepted);
        if !apply {
            log::warn!(
                "{} apply policy: backend did not accept, local state unchanged",
                self.policy.name()
            );
        }
        apply
    }

    fn announce_verified(&self, state: &DashboardState, id: &str) {
        self.events.publish(DashboardEvent::HistoryAppended {
            id: id.to_string(),
            total: state.history_entries().len(),
        });
    }
}

/// Awaits a backend write, logging instead of propagating failure.
async fn send(
    action: &str,
    target: &str,
    call: impl Future<Output = Result<(), ApiError>>,
) -> bool {
    match call.await {
        Ok(()) => {
            log::info!("{action} {target}: accepted");
            true
        }
        Err(e) => {
            log::warn!("{action} {target}: backend call failed, not retrying: {e}");
            false
        }
    }
}

fn require_contractor(state: &DashboardState, contractor_id: &str) -> Result<String, ActionError> {
    let contractor_id = contractor_id.trim();
    if contractor_id.is_empty() {
        return Err(ActionError::MissingContractor);
    }
    if !state.contractors.is_empty() && state.contractor(contractor_id).is_none() {
        return Err(ActionError::UnknownContractor {
            id: contractor_id.to_string(),
        });
    }
    Ok(contractor_id.to_string())
}

fn require_report<'a>(
    state: &'a DashboardState,
    record_id: &str,
) -> Result<&'a PointRecord, ActionError> {
    state
        .working_set
        .find_report(record_id)
        .ok_or_else(|| ActionError::UnknownRecord {
            id: record_id.to_string(),
        })
}

/// Finds the road as it is spelled in the working set, ignoring case and
/// surrounding whitespace.
fn require_road(state: &DashboardState, road: &str) -> Result<String, ActionError> {
    let wanted = road.trim();
    state
        .working_set
        .reports()
        .iter()
        .chain(state.working_set.patches())
        .map(PointRecord::road_key)
        .find(|key| key.eq_ignore_ascii_case(wanted))
        .map(str::to_string)
        .ok_or_else(|| ActionError::UnknownRoad {
            road: wanted.to_string(),
        })
}

pub(crate) fn apply_assign(
    state: &mut DashboardState,
    record_id: &str,
    contractor_id: &str,
    confirmed: bool,
) -> ActionOutcome {
    let Some(record) = state.working_set.find_report_mut(record_id) else {
        log::debug!("Assignment for {record_id} arrived after it left the working set");
        return ActionOutcome::Discarded;
    };
    record.contractor_id = Some(contractor_id.to_string());
    record.status = RecordStatus::Assigned;
    ActionOutcome::Applied { confirmed }
}

pub(crate) fn apply_verify(
    state: &mut DashboardState,
    record_id: &str,
    thresholds: &SeverityThresholds,
    confirmed: bool,
) -> ActionOutcome {
    let Some(record) = state.working_set.remove_report(record_id) else {
        log::debug!("Verification for {record_id} arrived after it left the working set");
        return ActionOutcome::Discarded;
    };

    if state.history.contains(record_id) {
        log::debug!("{record_id} was already in the repair history");
        return ActionOutcome::Applied { confirmed };
    }

    let entry = HistoryEntry::verified(
        &record,
        record.severity(thresholds),
        state.contractor_label(record.contractor_id.as_deref()),
        chrono::Local::now().format(DISPLAY_FORMAT).to_string(),
    );
    if !state.history.append(entry) {
        log::warn!("Verified {record_id} but could not persist the history log");
    }
    ActionOutcome::Applied { confirmed }
}

pub(crate) fn apply_reject(
    state: &mut DashboardState,
    record_id: &str,
    confirmed: bool,
) -> ActionOutcome {
    let Some(record) = state.working_set.find_report_mut(record_id) else {
        log::debug!("Rejection for {record_id} arrived after it left the working set");
        return ActionOutcome::Discarded;
    };
    record.status = RecordStatus::Assigned;
    ActionOutcome::Applied { confirmed }
}

#[cfg(test)]
mod tests {
    use pothole_admin_aggregate::WorkingSet;
    use pothole_admin_cache::{HistoryLog, MemoryStore};
    use pothole_admin_pothole_models::{Contractor, PointRecord, RecordKind, Severity};

    use super::*;
    use crate::policy::{ConfirmedApply, OptimisticApply};
    use crate::testing::{Call, FakeBackend};

    fn state() -> DashboardState {
        let mut state = DashboardState::new(HistoryLog::load(Arc::new(MemoryStore::new())));
        state.contractors = vec![Contractor {
            id: "c1".to_string(),
            name: "Mohan Das".to_string(),
            company: "Urban Road Solutions".to_string(),
        }];
        state.working_set = WorkingSet::from_records(vec![
            PointRecord::new("r1", RecordKind::Report, "13.08, 80.27")
                .with_defect_count(8)
                .with_road_name("Anna Salai"),
            PointRecord::new("r2", RecordKind::Report, "13.06, 80.24")
                .with_defect_count(31)
                .with_road_name("Anna Salai"),
            PointRecord::new("r3", RecordKind::Report, "13.05, 80.25")
                .with_defect_count(15)
                .with_road_name("Anna Salai")
                .with_status(RecordStatus::Assigned)
                .with_contractor("c1"),
            PointRecord::new("r4", RecordKind::Report, "13.04, 80.26")
                .with_defect_count(40)
                .with_road_name("Anna Salai")
                .with_status(RecordStatus::PendingVerification)
                .with_contractor("c1"),
            PointRecord::new("p1", RecordKind::Patch, "13.07, 80.26").with_road_name("Anna Salai"),
            PointRecord::new("r5", RecordKind::Report, "13.10, 80.29")
                .with_defect_count(2)
                .with_road_name("Kamarajar Salai"),
        ]);
        state
    }

    fn orchestrator(backend: &Arc<FakeBackend>, policy: Arc<dyn ApplyPolicy>) -> ActionOrchestrator {
        ActionOrchestrator::new(
            backend.clone(),
            policy,
            EventBus::new(),
            SeverityThresholds::default(),
        )
    }

    #[tokio::test]
    async fn blank_contractor_is_rejected_before_sending() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        assert_eq!(
            actions.assign(&mut state, "r1", "  ").await,
            Err(ActionError::MissingContractor)
        );
        assert_eq!(
            actions
                .batch_assign(&mut state, "Anna Salai", "", &AssignDetails::default())
                .await,
            Err(ActionError::MissingContractor)
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_targets_are_rejected_before_sending() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        assert!(matches!(
            actions.assign(&mut state, "nope", "c1").await,
            Err(ActionError::UnknownRecord { .. })
        ));
        assert!(matches!(
            actions.assign(&mut state, "r1", "c9").await,
            Err(ActionError::UnknownContractor { .. })
        ));
        assert!(matches!(
            actions.batch_verify(&mut state, "Mount Road", None).await,
            Err(ActionError::UnknownRoad { .. })
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn assign_applies_even_when_backend_fails() {
        let backend = Arc::new(FakeBackend::failing_writes());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        let outcome = actions.assign(&mut state, "r1", "c1").await.unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { confirmed: false });

        let record = state.working_set.find_report("r1").unwrap();
        assert_eq!(record.status, RecordStatus::Assigned);
        assert_eq!(record.contractor_id.as_deref(), Some("c1"));
        assert_eq!(backend.calls(), vec![Call::Assign("r1".to_string(), "c1".to_string())]);
    }

    #[tokio::test]
    async fn confirmed_policy_leaves_state_on_failure() {
        let backend = Arc::new(FakeBackend::failing_writes());
        let actions = orchestrator(&backend, Arc::new(ConfirmedApply));
        let mut state = state();

        assert_eq!(
            actions.assign(&mut state, "r1", "c1").await.unwrap(),
            ActionOutcome::NotApplied
        );
        assert_eq!(
            actions.verify(&mut state, "r4", None).await.unwrap(),
            ActionOutcome::NotApplied
        );
        assert_eq!(
            state.working_set.find_report("r1").unwrap().status,
            RecordStatus::Reported
        );
        assert!(state.working_set.find_report("r4").is_some());
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn verify_moves_record_into_history() {
        let backend = Arc::new(FakeBackend::default());
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let actions = ActionOrchestrator::new(
            backend.clone(),
            Arc::new(OptimisticApply),
            events,
            SeverityThresholds::default(),
        );
        let mut state = state();

        let outcome = actions.verify(&mut state, "r4", Some("looks good")).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { confirmed: true });
        assert!(state.working_set.find("r4").is_none());

        let entries = state.history.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "r4");
        assert_eq!(entries[0].status, RecordStatus::Verified);
        assert_eq!(entries[0].severity, Severity::High);
        assert_eq!(entries[0].road_name, "Anna Salai");
        assert_eq!(entries[0].contractor, "Mohan Das - Urban Road Solutions");

        assert_eq!(
            rx.recv().await.unwrap(),
            DashboardEvent::HistoryAppended {
                id: "r4".to_string(),
                total: 1,
            }
        );
    }

    #[tokio::test]
    async fn batch_assign_only_touches_unassigned_reports() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();
        state.contractors.push(Contractor {
            id: "c2".to_string(),
            name: "Rajesh Kumar".to_string(),
            company: "Metro Road Works Pvt Ltd".to_string(),
        });

        let outcome = actions
            .batch_assign(&mut state, "Anna Salai", "c2", &AssignDetails::default())
            .await
            .unwrap();

        assert_eq!(outcome.targeted, vec!["r1", "r2"]);
        assert_eq!(outcome.applied, vec!["r1", "r2"]);
        assert!(outcome.confirmed);
        assert_eq!(
            backend.calls(),
            vec![Call::BatchAssign(
                vec!["r1".to_string(), "r2".to_string()],
                "c2".to_string()
            )]
        );

        let ws = &state.working_set;
        assert_eq!(ws.find_report("r1").unwrap().contractor_id.as_deref(), Some("c2"));
        assert_eq!(ws.find_report("r2").unwrap().contractor_id.as_deref(), Some("c2"));
        assert_eq!(ws.find_report("r3").unwrap().contractor_id.as_deref(), Some("c1"));
        assert_eq!(
            ws.find_report("r4").unwrap().status,
            RecordStatus::PendingVerification
        );
        assert_eq!(ws.find_report("r5").unwrap().contractor_id, None);
    }

    #[tokio::test]
    async fn batch_verify_targets_pending_reports_only() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        let outcome = actions
            .batch_verify(&mut state, " anna salai", None)
            .await
            .unwrap();

        assert_eq!(outcome.applied, vec!["r4"]);
        assert_eq!(backend.calls(), vec![Call::BatchVerify(vec!["r4".to_string()])]);
        assert_eq!(state.history.len(), 1);
        assert!(state.working_set.find_report("r3").is_some());
    }

    #[tokio::test]
    async fn empty_batches_send_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        let outcome = actions
            .batch_verify(&mut state, "Kamarajar Salai", None)
            .await
            .unwrap();
        assert_eq!(outcome, BatchOutcome::default());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn reject_returns_record_to_assigned() {
        let backend = Arc::new(FakeBackend::default());
        let actions = orchestrator(&backend, Arc::new(OptimisticApply));
        let mut state = state();

        assert_eq!(
            actions.reject_verification(&mut state, "r4", " ").await,
            Err(ActionError::MissingReason)
        );
        assert!(matches!(
            actions.reject_verification(&mut state, "r1", "redo").await,
            Err(ActionError::NotPendingVerification { .. })
        ));

        let outcome = actions
            .reject_verification(&mut state, "r4", "Edges not sealed")
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Applied { confirmed: true });
        assert_eq!(
            state.working_set.find_report("r4").unwrap().status,
            RecordStatus::Assigned
        );
        assert_eq!(
            backend.calls(),
            vec![Call::Reject("r4".to_string(), "Edges not sealed".to_string())]
        );
    }

    #[test]
    fn results_for_vanished_records_are_discarded() {
        let mut state = state();
        state.working_set.remove_report("r1");

        assert_eq!(
            apply_assign(&mut state, "r1", "c1", true),
            ActionOutcome::Discarded
        );
        assert_eq!(
            apply_verify(&mut state, "r1", &SeverityThresholds::default(), true),
            ActionOutcome::Discarded
        );
        assert_eq!(apply_reject(&mut state, "r1", true), ActionOutcome::Discarded);
        assert!(state.history.is_empty());
    }

    #[test]
    fn verifying_a_logged_id_again_adds_no_entry() {
        let thresholds = SeverityThresholds::default();
        let mut state = state();
        apply_verify(&mut state, "r4", &thresholds, true);

        state.working_set = self::state().working_set;
        assert_eq!(
            apply_verify(&mut state, "r4", &thresholds, true),
            ActionOutcome::Applied { confirmed: true }
        );
        assert!(state.working_set.find("r4").is_none());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn unassigned_verification_is_labelled() {
        let mut state = state();
        apply_verify(&mut state, "r1", &SeverityThresholds::default(), false);
        let entry = &state.history.entries()[0];
        assert_eq!(entry.contractor, crate::state::UNASSIGNED);
        assert_eq!(entry.severity, Severity::Low);
    }
}
