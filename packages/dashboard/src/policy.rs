//! Whether a local change follows a backend call.
//!
//! Operator actions are sent to the backend best-effort. The policy looks
//! at how the call went and decides whether the working set is updated.

use std::sync::Arc;

use strum_macros::{AsRefStr, Display, EnumString};

/// Decides whether to apply a local change after a backend call.
pub trait ApplyPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// `accepted` is `true` when the backend answered with success.
    fn should_apply(&self, accepted: bool) -> bool;
}

/// Always applies. Local state never rolls back on a backend failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimisticApply;

impl ApplyPolicy for OptimisticApply {
    fn name(&self) -> &'static str {
        "optimistic"
    }

    fn should_apply(&self, _accepted: bool) -> bool {
        true
    }
}

/// Applies only what the backend accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmedApply;

impl ApplyPolicy for ConfirmedApply {
    fn name(&self) -> &'static str {
        "confirmed"
    }

    fn should_apply(&self, accepted: bool) -> bool {
        accepted
    }
}

/// Configurable choice between the built-in policies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApplyPolicyKind {
    #[default]
    Optimistic,
    Confirmed,
}

impl ApplyPolicyKind {
    #[must_use]
    pub fn policy(self) -> Arc<dyn ApplyPolicy> {
        match self {
            Self::Optimistic => Arc::new(OptimisticApply),
            Self::Confirmed => Arc::new(ConfirmedApply),
        }
    }
}
