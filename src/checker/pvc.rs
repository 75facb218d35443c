use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::ResourceExt;
use tracing::debug;

use super::{CheckScope, CheckerOutcome, ChildChecker, annotations_match};
use crate::errors::PlatformError;
use crate::models::{ChildIssue, ChildKind, Severity};
use crate::platform::PlatformClient;

pub struct PvcChecker;

#[async_trait]
impl ChildChecker for PvcChecker {
    fn kind(&self) -> ChildKind {
        ChildKind::PersistentVolumeClaim
    }

    async fn check(
        &self,
        platform: &dyn PlatformClient,
        scope: &CheckScope,
    ) -> Result<CheckerOutcome, PlatformError> {
        let claims = platform
            .list_persistent_volume_claims(&scope.namespace, &scope.label_selector)
            .await?;

        let mut outcome = CheckerOutcome::default();
        for pvc in &claims {
            if !annotations_match(pvc.metadata.annotations.as_ref(), &scope.annotation_selector) {
                continue;
            }
            if let Some((issue, severity)) = classify(pvc) {
                outcome.record(issue, severity);
            }
        }
        Ok(outcome)
    }
}

fn classify(pvc: &PersistentVolumeClaim) -> Option<(ChildIssue, Severity)> {
    let name = pvc.name_any();
    let phase = pvc
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();
    debug!(pvc = %name, %phase, "inspected persistent volume claim");

    match phase.as_str() {
        "Bound" => None,
        "Pending" => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolumeClaim {name} is Pending"),
                "Pending",
            ),
            Severity::Deploying,
        )),
        "Lost" => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolumeClaim {name} is in Lost state"),
                "Lost",
            ),
            Severity::Failed,
        )),
        _ => Some((
            issue(
                &name,
                &phase,
                format!("PersistentVolumeClaim {name} is in an unexpected state: {phase}"),
                "Unknown",
            ),
            Severity::Failed,
        )),
    }
}

fn issue(name: &str, status: &str, message: String, reason: &str) -> ChildIssue {
    ChildIssue {
        kind: ChildKind::PersistentVolumeClaim,
        name: name.to_string(),
        status: status.to_string(),
        message: Some(message),
        reason: Some(reason.to_string()),
    }
}
