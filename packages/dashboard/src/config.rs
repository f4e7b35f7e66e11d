//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `POTHOLE_ADMIN_API_URL` | `http://localhost:5000/api` |
//! | `POTHOLE_ADMIN_DATA_DIR` | `data/` under the workspace root |
//! | `POTHOLE_ADMIN_SEVERITY_MEDIUM` | `10` |
//! | `POTHOLE_ADMIN_SEVERITY_HIGH` | `30` |
//! | `POTHOLE_ADMIN_PAGE_SIZE` | `10` |
//! | `POTHOLE_ADMIN_APPLY_POLICY` | `optimistic` |
//! | `POTHOLE_ADMIN_CONTACT_EMAIL` | unset |

use std::path::PathBuf;
use std::str::FromStr;

use pothole_admin_api::DEFAULT_API_BASE_URL;
use pothole_admin_pothole_models::SeverityThresholds;
use thiserror::Error;

use crate::policy::ApplyPolicyKind;

pub const API_URL_VAR: &str = "POTHOLE_ADMIN_API_URL";
pub const DATA_DIR_VAR: &str = "POTHOLE_ADMIN_DATA_DIR";
pub const SEVERITY_MEDIUM_VAR: &str = "POTHOLE_ADMIN_SEVERITY_MEDIUM";
pub const SEVERITY_HIGH_VAR: &str = "POTHOLE_ADMIN_SEVERITY_HIGH";
pub const PAGE_SIZE_VAR: &str = "POTHOLE_ADMIN_PAGE_SIZE";
pub const APPLY_POLICY_VAR: &str = "POTHOLE_ADMIN_APPLY_POLICY";
pub const CONTACT_EMAIL_VAR: &str = "POTHOLE_ADMIN_CONTACT_EMAIL";

/// Rows per page when `POTHOLE_ADMIN_PAGE_SIZE` is unset.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse.
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// The medium threshold is not below the high threshold.
    #[error("Severity thresholds must satisfy medium < high (medium={medium}, high={high})")]
    InvalidThresholds {
        /// Medium threshold.
        medium: u32,
        /// High threshold.
        high: u32,
    },

    /// Unknown apply policy name.
    #[error("POTHOLE_ADMIN_APPLY_POLICY must be 'optimistic' or 'confirmed', got '{value}'")]
    InvalidPolicy {
        /// Raw value.
        value: String,
    },
}

/// Resolved dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub thresholds: SeverityThresholds,
    pub page_size: usize,
    pub apply_policy: ApplyPolicyKind,
    /// Appended to the road resolver's `User-Agent`.
    pub contact_email: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: pothole_admin_cache::paths::data_dir(),
            thresholds: SeverityThresholds::default(),
            page_size: DEFAULT_PAGE_SIZE,
            apply_policy: ApplyPolicyKind::default(),
            contact_email: None,
        }
    }
}

impl DashboardConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a set variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a set variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let thresholds = SeverityThresholds {
            medium: parse_number(SEVERITY_MEDIUM_VAR, get(SEVERITY_MEDIUM_VAR))?
                .unwrap_or(defaults.thresholds.medium),
            high: parse_number(SEVERITY_HIGH_VAR, get(SEVERITY_HIGH_VAR))?
                .unwrap_or(defaults.thresholds.high),
        };
        if thresholds.medium >= thresholds.high {
            return Err(ConfigError::InvalidThresholds {
                medium: thresholds.medium,
                high: thresholds.high,
            });
        }

        let page_size = parse_number::<usize>(PAGE_SIZE_VAR, get(PAGE_SIZE_VAR))?
            .unwrap_or(defaults.page_size)
            .max(1);

        let apply_policy = match get(APPLY_POLICY_VAR) {
            Some(value) => ApplyPolicyKind::from_str(&value)
                .map_err(|_| ConfigError::InvalidPolicy { value })?,
            None => defaults.apply_policy,
        };

        Ok(Self {
            api_url: get(API_URL_VAR).unwrap_or(defaults.api_url),
            data_dir: get(DATA_DIR_VAR).map_or(defaults.data_dir, PathBuf::from),
            thresholds,
            page_size,
            apply_policy,
            contact_email: get(CONTACT_EMAIL_VAR),
        })
    }

    /// Directory holding the key-value store blobs.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        pothole_admin_cache::paths::store_dir_in(&self.data_dir)
    }
}

fn parse_number<T: FromStr>(
    var: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DashboardConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.thresholds, SeverityThresholds::default());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.apply_policy, ApplyPolicyKind::Optimistic);
        assert!(config.contact_email.is_none());
        assert!(config.store_dir().ends_with("data/store"));
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            (API_URL_VAR, "https://api.example.org/api"),
            (DATA_DIR_VAR, "/tmp/pothole"),
            (SEVERITY_MEDIUM_VAR, "5"),
            (SEVERITY_HIGH_VAR, " 20 "),
            (PAGE_SIZE_VAR, "25"),
            (APPLY_POLICY_VAR, "Confirmed"),
            (CONTACT_EMAIL_VAR, "ops@example.org"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.org/api");
        assert_eq!(config.store_dir(), PathBuf::from("/tmp/pothole/store"));
        assert_eq!(config.thresholds.medium, 5);
        assert_eq!(config.thresholds.high, 20);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.apply_policy, ApplyPolicyKind::Confirmed);
        assert_eq!(config.contact_email.as_deref(), Some("ops@example.org"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[(API_URL_VAR, "  "), (PAGE_SIZE_VAR, "")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[(SEVERITY_HIGH_VAR, "lots")]),
            Err(ConfigError::InvalidNumber { var: SEVERITY_HIGH_VAR, .. })
        ));
        assert!(matches!(
            config(&[(SEVERITY_MEDIUM_VAR, "-1")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[(SEVERITY_MEDIUM_VAR, "40")]),
            Err(ConfigError::InvalidThresholds { medium: 40, high: 30 })
        ));
        assert!(matches!(
            config(&[(APPLY_POLICY_VAR, "pessimistic")]),
            Err(ConfigError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        assert_eq!(config(&[(PAGE_SIZE_VAR, "0")]).unwrap().page_size, 1);
    }
}
