use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Identity of one monitored custom resource, spelled out as the five path
/// segments of the Kubernetes API endpoint that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub group: String,
    pub version: String,
    pub plural: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(
        group: &str,
        version: &str,
        plural: &str,
        namespace: &str,
        name: &str,
    ) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.group, self.version, self.plural, self.namespace, self.name
        )
    }
}

/// Child resource kinds inspected during a checking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildKind {
    Pod,
    Job,
    PersistentVolume,
    PersistentVolumeClaim,
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChildKind::Pod => "Pod",
            ChildKind::Job => "Job",
            ChildKind::PersistentVolume => "PersistentVolume",
            ChildKind::PersistentVolumeClaim => "PersistentVolumeClaim",
        };
        f.write_str(s)
    }
}

/// One unhealthy child as reported to API consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildIssue {
    pub kind: ChildKind,
    pub name: String,
    pub status: String,
    #[serde(
        rename = "issue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Severity a checker proposes for what it saw. Folding across checkers
/// takes the maximum, so the value can only ever rise during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    #[default]
    Ready,
    Deploying,
    Failed,
}

/// Published verdict for a resource. Distinct from [`Severity`]: a pass with
/// issues publishes `Deploying` no matter how severe the issues were, and
/// `Failed` is only ever published by the not-found escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Ready,
    Deploying,
    Failed,
}

/// Aggregate health of one resource, as served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHealth {
    pub status: HealthState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ChildIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Store entry for one resource: the last published health plus the
/// escalation counters its monitor maintains across polls.
#[derive(Debug, Clone)]
pub struct CachedHealth {
    pub health: ResourceHealth,
    pub captured_at: Instant,
    pub consecutive_healthy: u32,
    pub consecutive_not_found: u32,
}

impl CachedHealth {
    pub fn new(health: ResourceHealth) -> Self {
        Self {
            health,
            captured_at: Instant::now(),
            consecutive_healthy: 0,
            consecutive_not_found: 0,
        }
    }
}
