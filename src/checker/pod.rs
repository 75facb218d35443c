use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use kube::ResourceExt;
use tracing::debug;

use super::{CheckScope, CheckerOutcome, ChildChecker, annotations_match};
use crate::errors::PlatformError;
use crate::models::{ChildIssue, ChildKind, Severity};
use crate::platform::PlatformClient;

pub struct PodChecker;

#[async_trait]
impl ChildChecker for PodChecker {
    fn kind(&self) -> ChildKind {
        ChildKind::Pod
    }

    async fn check(
        &self,
        platform: &dyn PlatformClient,
        scope: &CheckScope,
    ) -> Result<CheckerOutcome, PlatformError> {
        let pods = platform
            .list_pods(&scope.namespace, &scope.label_selector)
            .await?;

        let mut outcome = CheckerOutcome::default();
        for pod in &pods {
            if !annotations_match(pod.metadata.annotations.as_ref(), &scope.annotation_selector) {
                continue;
            }
            if let Some((issue, severity)) = classify(pod) {
                outcome.record(issue, severity);
            }
        }
        Ok(outcome)
    }
}

/// Judge one pod. `None` means it contributes nothing to the verdict.
fn classify(pod: &Pod) -> Option<(ChildIssue, Severity)> {
    let name = pod.name_any();
    let status = pod.status.as_ref();
    let phase = status
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();
    debug!(pod = %name, %phase, "inspected pod");

    match phase.as_str() {
        "Running" => {
            if is_pod_ready(status) {
                return None;
            }
            Some((
                issue(
                    &name,
                    &phase,
                    format!("Pod {name} is in {phase} state but not all containers are ready"),
                    "NotAllContainersReady",
                ),
                Severity::Deploying,
            ))
        }
        "Pending" => Some((
            issue(
                &name,
                &phase,
                format!("Pod {name} is in Pending state"),
                "Pending",
            ),
            Severity::Deploying,
        )),
        "Failed" | "Unknown" => Some((
            issue(
                &name,
                &phase,
                format!("Pod {name} is in {phase} state"),
                &failure_reason(status),
            ),
            Severity::Failed,
        )),
        "Succeeded" => None,
        _ => Some((
            issue(
                &name,
                &phase,
                format!("Pod {name} is in an unexpected state: {phase}"),
                "Unknown",
            ),
            Severity::Deploying,
        )),
    }
}

/// Ready condition must not say anything other than "True", and every
/// reported container must be ready. A pod with no status at all passes.
fn is_pod_ready(status: Option<&PodStatus>) -> bool {
    let Some(status) = status else { return true };
    if let Some(conditions) = &status.conditions {
        for c in conditions {
            if c.type_ == "Ready" && c.status != "True" {
                return false;
            }
        }
    }
    if let Some(statuses) = &status.container_statuses {
        for cs in statuses {
            if !cs.ready {
                return false;
            }
        }
    }
    true
}

/// Reason of the first waiting container, "Unknown" when none is waiting.
fn failure_reason(status: Option<&PodStatus>) -> String {
    if let Some(statuses) = status.and_then(|s| s.container_statuses.as_ref()) {
        for cs in statuses {
            if let Some(waiting) = cs.state.as_ref().and_then(|s| s.waiting.as_ref()) {
                return waiting.reason.clone().unwrap_or_default();
            }
        }
    }
    "Unknown".to_string()
}

fn issue(name: &str, status: &str, message: String, reason: &str) -> ChildIssue {
    ChildIssue {
        kind: ChildKind::Pod,
        name: name.to_string(),
        status: status.to_string(),
        message: Some(message),
        reason: Some(reason.to_string()),
    }
}
