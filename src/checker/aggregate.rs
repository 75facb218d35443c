//! Folds per-checker outcomes into the verdict a pass publishes.

use crate::models::{HealthState, ResourceHealth, Severity};

use super::CheckerOutcome;

/// Merge outcomes in checking order. Issues keep their order; the severity
/// is the running maximum and never decreases.
pub fn combine(outcomes: impl IntoIterator<Item = CheckerOutcome>) -> CheckerOutcome {
    let mut combined = CheckerOutcome::default();
    for outcome in outcomes {
        combined.severity = combined.severity.max(outcome.severity);
        combined.issues.extend(outcome.issues);
    }
    combined
}

/// Turn a combined outcome into the published health. Any issue forces
/// "deploying", however severe; an issue-free pass at Ready severity is the
/// only way to publish "ready". A pass on its own never publishes "failed".
pub fn resolve(combined: CheckerOutcome) -> ResourceHealth {
    let status = if combined.issues.is_empty() && combined.severity == Severity::Ready {
        HealthState::Ready
    } else {
        HealthState::Deploying
    };

    ResourceHealth {
        status,
        details: combined.issues,
        message: None,
    }
}
