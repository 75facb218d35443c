use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolume;
use kube::ResourceExt;
use tracing::debug;

use super::{CheckScope, CheckerOutcome, ChildChecker, annotations_match};
use crate::errors::PlatformError;
use crate::models::{ChildIssue, ChildKind, Severity};
use crate::platform::PlatformClient;

pub struct PvChecker;

#[async_trait]
impl ChildChecker for PvChecker {
    fn kind(&self) -> ChildKind {
        ChildKind::PersistentVolume
    }

    async fn check(
        &self,
        platform: &dyn PlatformClient,
        scope: &CheckScope,
    ) -> Result<CheckerOutcome, PlatformError> {
        let volumes = platform
            .list_persistent_volumes(&scope.label_selector)
            .await?;

        let mut outcome = CheckerOutcome::default();
        for pv in &volumes {
            if !annotations_match(pv.metadata.annotations.as_ref(), &scope.annotation_selector) {
                continue;
            }
            if let Some((issue, severity)) = classify(pv) {
                outcome.record(issue, severity);
            }
        }
        Ok(outcome)
    }
}

/// An Available volume is reported so consumers can see it, yet it proposes
/// Ready: on its own it never delays the verdict.
fn classify(pv: &PersistentVolume) -> Option<(ChildIssue, Severity)> {
    let name = pv.name_any();
    let phase = pv
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();
    debug!(pv = %name, %phase, "inspected persistent volume");

    match phase.as_str() {
        "Bound" => None,
        "Available" => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolume {name} is Available"),
                "Available",
            ),
            Severity::Ready,
        )),
        "Failed" => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolume {name} is in Failed state"),
                "Failed",
            ),
            Severity::Failed,
        )),
        "Released" => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolume {name} is in Released state"),
                "Released",
            ),
            Severity::Deploying,
        )),
        _ => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolume {name} is in an unexpected state: {phase}"),
                "Unknown",
            ),
            Severity::Failed,
        )),
    }
}

fn issue(name: &str, status: &str, message: String, reason: &str) -> ChildIssue {
    ChildIssue {
        kind: ChildKind::PersistentVolume,
        name: name.to_string(),
        status: status.to_string(),
        message: Some(message),
        reason: Some(reason.to_string()),
    }
}
