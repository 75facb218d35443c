use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job, JobStatus};
use kube::ResourceExt;
use tracing::debug;

use super::{CheckScope, CheckerOutcome, ChildChecker, annotations_match};
use crate::errors::PlatformError;
use crate::models::{ChildIssue, ChildKind, Severity};
use crate::platform::PlatformClient;

/// Pod restarts recorded against a job before it counts as failed.
const JOB_FAILURE_THRESHOLD: i32 = 3;

pub struct JobChecker;

#[async_trait]
impl ChildChecker for JobChecker {
    fn kind(&self) -> ChildKind {
        ChildKind::Job
    }

    async fn check(
        &self,
        platform: &dyn PlatformClient,
        scope: &CheckScope,
    ) -> Result<CheckerOutcome, PlatformError> {
        let jobs = platform
            .list_jobs(&scope.namespace, &scope.label_selector)
            .await?;

        let mut outcome = CheckerOutcome::default();
        for job in &jobs {
            if !annotations_match(job.metadata.annotations.as_ref(), &scope.annotation_selector) {
                continue;
            }
            if let Some((issue, severity)) = classify(job) {
                outcome.record(issue, severity);
            }
        }
        Ok(outcome)
    }
}

/// Jobs have no phase, so the verdict is synthesized from the counters: a
/// job past the failure threshold reports "Failed", one that has not
/// succeeded yet reports "Pending".
fn classify(job: &Job) -> Option<(ChildIssue, Severity)> {
    let name = job.name_any();
    let status = job.status.as_ref();
    let failed = status.and_then(|s| s.failed).unwrap_or(0);
    let succeeded = status.and_then(|s| s.succeeded).unwrap_or(0);
    debug!(job = %name, succeeded, failed, "inspected job");

    if failed >= JOB_FAILURE_THRESHOLD {
        Some((
            issue(
                &name,
                "Failed",
                format!("Job {name} has failed {failed} times"),
                &failure_reason(status),
            ),
            Severity::Failed,
        ))
    } else if succeeded == 0 {
        Some((
            issue(
                &name,
                "Pending",
                format!("Job {name} is in Pending state"),
                &failure_reason(status),
            ),
            Severity::Deploying,
        ))
    } else {
        None
    }
}

/// Reason of the Failed condition, "Unknown" when the job has none.
fn failure_reason(status: Option<&JobStatus>) -> String {
    if let Some(conditions) = status.and_then(|s| s.conditions.as_ref()) {
        for c in conditions {
            if c.type_ == "Failed" {
                return c.reason.clone().unwrap_or_default();
            }
        }
    }
    "Unknown".to_string()
}

fn issue(name: &str, status: &str, message: String, reason: &str) -> ChildIssue {
    ChildIssue {
        kind: ChildKind::Job,
        name: name.to_string(),
        status: status.to_string(),
        message: Some(message),
        reason: Some(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::batch::v1::JobCondition;
    use kube::core::ObjectMeta;

    fn job(name: &str, status: JobStatus) -> Job {
        Job {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn succeeded_job_contributes_nothing() {
        let status = JobStatus {
            succeeded: Some(1),
            ..Default::default()
        };
        assert_eq!(classify(&job("migrate", status)), None);
    }

    #[test]
    fn unfinished_job_is_pending() {
        let (issue, severity) = classify(&job("migrate", JobStatus::default())).unwrap();
        assert_eq!(severity, Severity::Deploying);
        assert_eq!(issue.status, "Pending");
        assert_eq!(
            issue.message.as_deref(),
            Some("Job migrate is in Pending state")
        );
        assert_eq!(issue.reason.as_deref(), Some("Unknown"));
    }

    #[test]
    fn job_past_threshold_is_failed() {
        let status = JobStatus {
            failed: Some(3),
            ..Default::default()
        };
        let (issue, severity) = classify(&job("migrate", status)).unwrap();
        assert_eq!(severity, Severity::Failed);
        assert_eq!(issue.status, "Failed");
        assert_eq!(
            issue.message.as_deref(),
            Some("Job migrate has failed 3 times")
        );
    }

    #[test]
    fn failures_trump_success() {
        let status = JobStatus {
            failed: Some(5),
            succeeded: Some(2),
            ..Default::default()
        };
        let (issue, severity) = classify(&job("migrate", status)).unwrap();
        assert_eq!(severity, Severity::Failed);
        assert_eq!(
            issue.message.as_deref(),
            Some("Job migrate has failed 5 times")
        );
    }

    #[test]
    fn failed_condition_reason_is_propagated() {
        let status = JobStatus {
            failed: Some(4),
            conditions: Some(vec![JobCondition {
                type_: "Failed".to_string(),
                status: "True".to_string(),
                reason: Some("BackoffLimitExceeded".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (issue, _) = classify(&job("migrate", status)).unwrap();
        assert_eq!(issue.reason.as_deref(), Some("BackoffLimitExceeded"));
    }
}
