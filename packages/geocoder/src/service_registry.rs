//! Compile-time registry of reverse geocoding service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`enabled_services`].

use std::time::Duration;

use serde::Deserialize;

/// A reverse geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used for road-name resolution.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order. Lower values are preferred.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim `/reverse` endpoint.
    NominatimReverse {
        /// Endpoint URL (e.g., `"https://nominatim.openstreetmap.org/reverse"`).
        base_url: String,
        /// Detail level; 17 targets major and minor streets.
        #[serde(default = "default_zoom")]
        zoom: u8,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
    },
    /// Photon `/reverse` endpoint.
    PhotonReverse {
        /// Endpoint URL (e.g., `"https://photon.komoot.io/reverse"`).
        base_url: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_zoom() -> u8 {
    17
}

impl GeocodingService {
    /// Returns the provider's endpoint URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::NominatimReverse { base_url, .. }
            | ProviderConfig::PhotonReverse { base_url, .. } => base_url,
        }
    }

    /// Returns the inter-call delay the provider asks for.
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        match &self.provider {
            ProviderConfig::NominatimReverse { rate_limit_ms, .. }
            | ProviderConfig::PhotonReverse { rate_limit_ms, .. } => {
                Duration::from_millis(*rate_limit_ms)
            }
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("photon", include_str!("../services/photon.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Looks up a service by id, enabled or not.
#[must_use]
pub fn find_service(id: &str) -> Option<GeocodingService> {
    all_services().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        assert_eq!(all_services().len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for svc in &all_services() {
            assert!(seen.insert(svc.id.clone()), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.id.is_empty(), "Service has empty id");
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(
                !svc.base_url().is_empty(),
                "Service {} has empty base_url",
                svc.id
            );
        }
    }

    #[test]
    fn nominatim_respects_public_rate_limit() {
        let svc = find_service("nominatim").unwrap();
        assert!(svc.rate_limit() >= Duration::from_secs(1));
        assert!(matches!(
            svc.provider,
            ProviderConfig::NominatimReverse { zoom: 17, .. }
        ));
    }

    #[test]
    fn enabled_services_sorted_by_priority() {
        let services = enabled_services();
        for window in services.windows(2) {
            assert!(window[0].priority <= window[1].priority);
        }
        assert!(services.iter().all(|s| s.enabled));
    }
}
