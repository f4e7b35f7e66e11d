#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! REST client for the pothole reporting backend.
//!
//! The backend is the source of truth for locations, contractors,
//! assignments, and verifications. [`ApiClient`] speaks its HTTP API;
//! the rest of the toolchain only depends on the [`DashboardBackend`]
//! trait so sessions can run against a fake in tests.

pub mod client;
pub mod retry;

pub use client::ApiClient;

use async_trait::async_trait;
use pothole_admin_api_models::{
    ApiContractor, ApiHistoryEntry, ApiLocation, AssignRequest, BatchAssignRequest,
    BatchVerifyRequest, HistoryQuery, RejectRequest, VerifyRequest,
};

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Errors that can occur talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the status reason.
        message: String,
    },

    /// The configured base URL cannot be used.
    #[error("Invalid base URL '{url}'")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

/// The backend operations a dashboard session needs.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Fetches the aggregated location rows.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn locations(&self) -> Result<Vec<ApiLocation>, ApiError>;

    /// Fetches the contractor list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn contractors(&self) -> Result<Vec<ApiContractor>, ApiError>;

    /// Fetches verified repairs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    async fn history(&self, query: &HistoryQuery) -> Result<Vec<ApiHistoryEntry>, ApiError>;

    /// Assigns one location to a contractor.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the backend does not accept the assignment.
    async fn assign(&self, request: &AssignRequest) -> Result<(), ApiError>;

    /// Assigns several locations to one contractor.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the backend does not accept the assignment.
    async fn batch_assign(&self, request: &BatchAssignRequest) -> Result<(), ApiError>;

    /// Marks one location's repair as verified.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the backend does not accept the verification.
    async fn verify(&self, location_id: &str, request: &VerifyRequest) -> Result<(), ApiError>;

    /// Marks several locations' repairs as verified.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the backend does not accept the verification.
    async fn batch_verify(&self, request: &BatchVerifyRequest) -> Result<(), ApiError>;

    /// Sends a completed repair back for rework.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the backend does not accept the rejection.
    async fn reject_verification(
        &self,
        location_id: &str,
        request: &RejectRequest,
    ) -> Result<(), ApiError>;
}
