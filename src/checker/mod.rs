use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::PlatformError;
use crate::models::{ChildIssue, ChildKind, Severity};
use crate::platform::PlatformClient;

pub mod aggregate;
mod job;
mod pod;
mod pv;
mod pvc;

pub use job::JobChecker;
pub use pod::PodChecker;
pub use pv::PvChecker;
pub use pvc::PvcChecker;


/// Where a checking pass looks for children: the monitored resource's
/// namespace plus the caller-supplied selectors.
#[derive(Debug, Clone, Default)]
pub struct CheckScope {
    pub namespace: String,
    /// Passed to the Kubernetes API as a server-side label selector.
    /// Empty selects everything.
    pub label_selector: String,
    /// Single `key=value` pair matched client-side against child
    /// annotations. Empty matches everything.
    pub annotation_selector: String,
}

/// Partial result of one checker: the issues it found plus the highest
/// severity it proposes for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckerOutcome {
    pub issues: Vec<ChildIssue>,
    pub severity: Severity,
}

impl CheckerOutcome {
    pub fn record(&mut self, issue: ChildIssue, severity: Severity) {
        self.issues.push(issue);
        self.severity = self.severity.max(severity);
    }
}

/// A stateless inspection of one child kind. Checkers never write anywhere;
/// they report what they saw and let the caller fold the outcomes.
#[async_trait]
pub trait ChildChecker: Send + Sync {
    fn kind(&self) -> ChildKind;

    async fn check(
        &self,
        platform: &dyn PlatformClient,
        scope: &CheckScope,
    ) -> Result<CheckerOutcome, PlatformError>;
}

/// The fixed checking order of a pass.
pub fn ordered() -> Vec<Box<dyn ChildChecker>> {
    vec![
        Box::new(PodChecker),
        Box::new(JobChecker),
        Box::new(PvChecker),
        Box::new(PvcChecker),
    ]
}

/// Exact-match annotation filter. An empty selector matches every child; a
/// non-empty selector without `=` matches none.
pub fn annotations_match(
    annotations: Option<&BTreeMap<String, String>>,
    selector: &str,
) -> bool {
    if selector.is_empty() {
        return true;
    }
    let Some((key, value)) = selector.split_once('=') else {
        return false;
    };
    annotations
        .and_then(|a| a.get(key))
        .is_some_and(|v| v == value)
}
