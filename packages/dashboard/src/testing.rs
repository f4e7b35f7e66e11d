//! In-memory fakes shared by this crate's tests.

use std::sync::Mutex;

use async_trait::async_trait;
use pothole_admin_api::{ApiError, DashboardBackend};
use pothole_admin_api_models::{
    ApiContractor, ApiHistoryEntry, ApiLocation, AssignRequest, BatchAssignRequest,
    BatchVerifyRequest, HistoryQuery, RejectRequest, VerifyRequest,
};
use pothole_admin_geocoder::{GeocodeError, RoadResolver};
use pothole_admin_pothole_models::Coordinates;

/// A write the fake backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Assign(String, String),
    BatchAssign(Vec<String>, String),
    Verify(String),
    BatchVerify(Vec<String>),
    Reject(String, String),
}

#[derive(Default)]
pub struct FakeBackend {
    pub locations: Vec<ApiLocation>,
    pub contractors: Vec<ApiContractor>,
    pub history: Vec<ApiHistoryEntry>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn read<T: Clone>(&self, rows: &[T]) -> Result<Vec<T>, ApiError> {
        if self.fail_reads {
            return Err(unavailable());
        }
        Ok(rows.to_vec())
    }

    fn write(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> ApiError {
    ApiError::Rejected {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl DashboardBackend for FakeBackend {
    async fn locations(&self) -> Result<Vec<ApiLocation>, ApiError> {
        self.read(&self.locations)
    }

    async fn contractors(&self) -> Result<Vec<ApiContractor>, ApiError> {
        self.read(&self.contractors)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<ApiHistoryEntry>, ApiError> {
        let rows = self.read(&self.history)?;
        Ok(rows
            .into_iter()
            .filter(|e| {
                query
                    .road_name
                    .as_ref()
                    .is_none_or(|road| e.road_name.as_ref() == Some(road))
            })
            .collect())
    }

    async fn assign(&self, request: &AssignRequest) -> Result<(), ApiError> {
        self.write(Call::Assign(
            request.location_id.clone(),
            request.contractor_id.clone(),
        ))
    }

    async fn batch_assign(&self, request: &BatchAssignRequest) -> Result<(), ApiError> {
        self.write(Call::BatchAssign(
            request.location_ids.clone(),
            request.contractor_id.clone(),
        ))
    }

    async fn verify(&self, location_id: &str, _request: &VerifyRequest) -> Result<(), ApiError> {
        self.write(Call::Verify(location_id.to_string()))
    }

    async fn batch_verify(&self, request: &BatchVerifyRequest) -> Result<(), ApiError> {
        self.write(Call::BatchVerify(request.location_ids.clone()))
    }

    async fn reject_verification(
        &self,
        location_id: &str,
        request: &RejectRequest,
    ) -> Result<(), ApiError> {
        self.write(Call::Reject(
            location_id.to_string(),
            request.reason.clone(),
        ))
    }
}

/// Answers every lookup with the same road.
pub struct FixedResolver(pub Option<&'static str>);

#[async_trait]
impl RoadResolver for FixedResolver {
    fn id(&self) -> &str {
        "fixed"
    }

    async fn road_name(&self, _coords: Coordinates) -> Result<Option<String>, GeocodeError> {
        Ok(self.0.map(str::to_string))
    }
}
