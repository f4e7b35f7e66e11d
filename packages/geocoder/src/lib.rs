#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding of pothole coordinates to road names.
//!
//! Providers are configured via TOML files in `services/` and loaded from
//! the [`service_registry`]:
//!
//! 1. **Nominatim / OpenStreetMap** (priority 1): free, 1 req/sec rate
//!    limit on the public instance.
//! 2. **Photon** (priority 2, disabled by default): OSM-backed, more
//!    lenient rate limit.
//!
//! Every provider implements [`RoadResolver`]. Callers never talk to a
//! provider directly during a batch; they go through the
//! [`throttle::ThrottledResolver`], which drains requests one at a time
//! with a fixed delay between upstream calls.

pub mod nominatim;
pub mod photon;
pub mod progress;
pub mod service_registry;
pub mod throttle;

use std::sync::Arc;

use async_trait::async_trait;
use pothole_admin_pothole_models::Coordinates;
use thiserror::Error;

use crate::service_registry::{GeocodingService, ProviderConfig};

/// Errors from reverse geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Unexpected status {status}")]
    Status {
        /// The HTTP status returned.
        status: reqwest::StatusCode,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves a coordinate pair to a human-readable road name.
///
/// `Ok(None)` means the provider answered but knows no road at that
/// point. Callers treat it the same as an error: the name is unavailable.
#[async_trait]
pub trait RoadResolver: Send + Sync {
    /// Returns a short identifier for logging (e.g., `"nominatim"`).
    fn id(&self) -> &str;

    /// Looks up the road nearest to `coords`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails or the response
    /// cannot be parsed.
    async fn road_name(&self, coords: Coordinates) -> Result<Option<String>, GeocodeError>;
}

/// Builds the `User-Agent` sent to public geocoders.
///
/// Nominatim's usage policy asks for an identifying agent, ideally with a
/// contact address.
#[must_use]
pub fn user_agent(contact: Option<&str>) -> String {
    let base = concat!("pothole_admin/", env!("CARGO_PKG_VERSION"));
    match contact {
        Some(contact) if !contact.trim().is_empty() => format!("{base} ({})", contact.trim()),
        _ => base.to_string(),
    }
}

/// Instantiates the resolver for a configured service.
#[must_use]
pub fn resolver_for(service: &GeocodingService, client: reqwest::Client) -> Arc<dyn RoadResolver> {
    match &service.provider {
        ProviderConfig::NominatimReverse { base_url, zoom, .. } => Arc::new(
            nominatim::NominatimReverse::new(client, base_url.clone(), *zoom),
        ),
        ProviderConfig::PhotonReverse { base_url, .. } => {
            Arc::new(photon::PhotonReverse::new(client, base_url.clone()))
        }
    }
}

/// Picks the highest-priority enabled service.
///
/// Returns `None` when every service is disabled.
#[must_use]
pub fn primary_service() -> Option<GeocodingService> {
    service_registry::enabled_services().into_iter().next()
}
