//! HTTP client for the backend REST API.

use std::time::Duration;

use async_trait::async_trait;
use pothole_admin_api_models::{
    ApiContractor, ApiHistoryEntry, ApiLocation, ApiStatsOverview, AssignRequest,
    BatchAssignRequest, BatchVerifyRequest, HistoryQuery, LoginRequest, LoginResponse,
    RejectRequest, VerifyRequest,
};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::retry::{self, NO_RETRIES, READ_RETRIES};
use crate::{ApiError, DashboardBackend};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g., `"http://localhost:5000/api"`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the URL cannot be a base for endpoint paths
    /// or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    /// Attaches a bearer token to every subsequent request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Logs in and keeps the returned token for later requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the credentials are rejected or the request
    /// fails.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let url = self.endpoint(&["auth", "login"]);
        let value = retry::send_json(
            || self.request(reqwest::Method::POST, &url).json(&body),
            NO_RETRIES,
        )
        .await?;
        let response: LoginResponse = decode(value)?;

        if let Some(token) = &response.token {
            self.token = Some(token.clone());
        }
        Ok(response)
    }

    /// Forgets the bearer token.
    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Fetches the backend's own summary counts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request or decoding fails.
    pub async fn dashboard_stats(&self) -> Result<ApiStatsOverview, ApiError> {
        self.get_json(&["reports", "stats", "overview"], &[]).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: &Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url.clone());
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        log::debug!("GET {url}");
        let value = retry::send_json(
            || self.request(reqwest::Method::GET, &url).query(query),
            READ_RETRIES,
        )
        .await?;
        decode(value)
    }

    async fn post<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        let url = self.endpoint(segments);
        log::debug!("POST {url}");
        retry::send_json(
            || self.request(reqwest::Method::POST, &url).json(body),
            NO_RETRIES,
        )
        .await?;
        Ok(())
    }
}

/// Decodes a response, unwrapping a `{ "data": ... }` envelope if present.
fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    let inner = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

#[async_trait]
impl DashboardBackend for ApiClient {
    async fn locations(&self) -> Result<Vec<ApiLocation>, ApiError> {
        self.get_json(&["reports", "aggregated", "locations"], &[]).await
    }

    async fn contractors(&self) -> Result<Vec<ApiContractor>, ApiError> {
        self.get_json(&["admin", "contractors"], &[]).await
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<ApiHistoryEntry>, ApiError> {
        self.get_json(&["admin", "history"], &query.to_pairs()).await
    }

    async fn assign(&self, request: &AssignRequest) -> Result<(), ApiError> {
        self.post(&["admin", "assign"], request).await
    }

    async fn batch_assign(&self, request: &BatchAssignRequest) -> Result<(), ApiError> {
        self.post(&["admin", "assign", "batch"], request).await
    }

    async fn verify(&self, location_id: &str, request: &VerifyRequest) -> Result<(), ApiError> {
        self.post(&["admin", "verify", location_id], request).await
    }

    async fn batch_verify(&self, request: &BatchVerifyRequest) -> Result<(), ApiError> {
        self.post(&["admin", "verify", "batch"], request).await
    }

    async fn reject_verification(
        &self,
        location_id: &str,
        request: &RejectRequest,
    ) -> Result<(), ApiError> {
        self.post(&["admin", "verify", location_id, "reject"], request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_append_to_base_path() {
        let client = ApiClient::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            client.endpoint(&["admin", "contractors"]).as_str(),
            "http://localhost:5000/api/admin/contractors"
        );

        let trailing = ApiClient::new("http://localhost:5000/api/").unwrap();
        assert_eq!(
            trailing.endpoint(&["admin", "history"]).as_str(),
            "http://localhost:5000/api/admin/history"
        );
    }

    #[test]
    fn path_ids_are_percent_encoded() {
        let client = ApiClient::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            client.endpoint(&["admin", "verify", "PH 1/2"]).as_str(),
            "http://localhost:5000/api/admin/verify/PH%201%2F2"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("mailto:ops@example.org"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn token_is_sent_as_bearer_auth() {
        let client = ApiClient::new("http://localhost:5000/api")
            .unwrap()
            .with_token(Some("secret".to_string()));
        let url = client.endpoint(&["admin", "contractors"]);
        let request = client
            .request(reqwest::Method::GET, &url)
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer secret"
        );

        let mut client = client;
        client.logout();
        let request = client
            .request(reqwest::Method::GET, &url)
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn decode_unwraps_data_envelope() {
        let wrapped = serde_json::json!({ "success": true, "data": [{ "id": 1, "name": "Mohan" }] });
        let contractors: Vec<ApiContractor> = decode(wrapped).unwrap();
        assert_eq!(contractors[0].id, "1");

        let bare = serde_json::json!([{ "id": "c2", "name": "Rajesh", "company": "Metro" }]);
        let contractors: Vec<ApiContractor> = decode(bare).unwrap();
        assert_eq!(contractors[0].company.as_deref(), Some("Metro"));
    }

    #[test]
    fn decode_reports_shape_mismatch() {
        let value = serde_json::json!({ "data": { "unexpected": true } });
        assert!(decode::<Vec<ApiContractor>>(value).is_err());
    }
}
