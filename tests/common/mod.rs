#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job, JobStatus};
use k8s_openapi::api::core::v1::{
    ContainerStatus, PersistentVolume, PersistentVolumeClaim,
    PersistentVolumeClaimStatus, PersistentVolumeStatus, Pod, PodCondition,
    PodStatus,
};
use kube::core::ObjectMeta;
use tokio::time::Instant;

use healthgate::config::HealthConfig;
use healthgate::errors::PlatformError;
use healthgate::models::ResourceKey;
use healthgate::platform::PlatformClient;
use healthgate::runtime::AppContext;

// Env guard utilities
pub struct EnvGuard {
    key: &'static str,
    old: Option<String>,
}
impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            if let Some(ref v) = self.old {
                std::env::set_var(self.key, v);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }
}
pub fn set_env(key: &'static str, val: &str) -> EnvGuard {
    let old = std::env::var(key).ok();
    unsafe {
        std::env::set_var(key, val);
    }
    EnvGuard { key, old }
}

/// Scripted stand-in for the Kubernetes API. Shared via `Clone`, so a test
/// can keep adjusting it while monitors read from it.
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    resource: Option<serde_json::Value>,
    fail_transport: bool,
    pods: Vec<Pod>,
    jobs: Vec<Job>,
    volumes: Vec<PersistentVolume>,
    claims: Vec<PersistentVolumeClaim>,
    fetch_instants: Vec<Instant>,
    label_selectors: Vec<String>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_resource(&self, value: serde_json::Value) {
        self.lock().resource = Some(value);
    }

    pub fn clear_resource(&self) {
        self.lock().resource = None;
    }

    pub fn set_fail_transport(&self, fail: bool) {
        self.lock().fail_transport = fail;
    }

    pub fn set_pods(&self, pods: Vec<Pod>) {
        self.lock().pods = pods;
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.lock().jobs = jobs;
    }

    pub fn set_volumes(&self, volumes: Vec<PersistentVolume>) {
        self.lock().volumes = volumes;
    }

    pub fn set_claims(&self, claims: Vec<PersistentVolumeClaim>) {
        self.lock().claims = claims;
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_instants.len()
    }

    /// Instants (on the test clock) at which the resource was fetched.
    pub fn fetch_instants(&self) -> Vec<Instant> {
        self.lock().fetch_instants.clone()
    }

    /// Label selectors seen by any listing call, in call order.
    pub fn seen_label_selectors(&self) -> Vec<String> {
        self.lock().label_selectors.clone()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn fetch_custom_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<serde_json::Value, PlatformError> {
        let mut state = self.lock();
        state.fetch_instants.push(Instant::now());
        if state.fail_transport {
            return Err(PlatformError::Transport("injected transport failure".into()));
        }
        match &state.resource {
            Some(v) => Ok(v.clone()),
            None => Err(PlatformError::NotFound(format!("{key} not found"))),
        }
    }

    async fn list_pods(
        &self,
        _namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, PlatformError> {
        let mut state = self.lock();
        state.label_selectors.push(label_selector.to_string());
        Ok(state.pods.clone())
    }

    async fn list_jobs(
        &self,
        _namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Job>, PlatformError> {
        let mut state = self.lock();
        state.label_selectors.push(label_selector.to_string());
        Ok(state.jobs.clone())
    }

    async fn list_persistent_volumes(
        &self,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolume>, PlatformError> {
        let mut state = self.lock();
        state.label_selectors.push(label_selector.to_string());
        Ok(state.volumes.clone())
    }

    async fn list_persistent_volume_claims(
        &self,
        _namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, PlatformError> {
        let mut state = self.lock();
        state.label_selectors.push(label_selector.to_string());
        Ok(state.claims.clone())
    }
}

// RAII guard so spawned monitors stop when a test ends early
pub struct ContextGuard(AppContext);
impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.0.shutdown.cancel();
    }
}

pub fn test_context(platform: &MockPlatform, cfg: HealthConfig) -> (AppContext, ContextGuard) {
    let ctx = AppContext::new(Arc::new(platform.clone()), cfg);
    (ctx.clone(), ContextGuard(ctx))
}

/// Short intervals and a generous limiter, so paused-clock tests can assert
/// exact poll timings.
pub fn fast_config() -> HealthConfig {
    HealthConfig {
        check_interval: Duration::from_secs(5),
        consec_healthy: 3,
        consec_failed: 3,
        limiter_rate: 100,
        limiter_burst: 100,
        increase_interval: Duration::from_secs(2),
        ready_check_interval: Duration::from_secs(60),
        initial_delay: Duration::from_secs(1),
        http_port: 0,
    }
}

pub fn widget_key() -> ResourceKey {
    ResourceKey::new("apps.example.com", "v1", "widgets", "default", "demo")
}

pub fn widget_json() -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "apps.example.com/v1",
        "kind": "Widget",
        "metadata": {"name": "demo", "namespace": "default"},
    })
}

// Child object builders
pub fn meta(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn annotated_meta(name: &str, annotations: &[(&str, &str)]) -> ObjectMeta {
    let map: BTreeMap<String, String> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ObjectMeta {
        name: Some(name.to_string()),
        annotations: Some(map),
        ..Default::default()
    }
}

pub fn ready_pod(name: &str) -> Pod {
    Pod {
        metadata: meta(name),
        status: Some(PodStatus {
            phase: Some("Running".to_string()),
            conditions: Some(vec![PodCondition {
                type_: "Ready".to_string(),
                status: "True".to_string(),
                ..Default::default()
            }]),
            container_statuses: Some(vec![ContainerStatus {
                name: "main".to_string(),
                ready: true,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn pod_with_phase(name: &str, phase: &str) -> Pod {
    Pod {
        metadata: meta(name),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn annotated_pod(name: &str, phase: &str, annotations: &[(&str, &str)]) -> Pod {
    Pod {
        metadata: annotated_meta(name, annotations),
        ..pod_with_phase(name, phase)
    }
}

pub fn job_with_counts(name: &str, succeeded: i32, failed: i32) -> Job {
    Job {
        metadata: meta(name),
        status: Some(JobStatus {
            succeeded: Some(succeeded),
            failed: Some(failed),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn volume_with_phase(name: &str, phase: &str) -> PersistentVolume {
    PersistentVolume {
        metadata: meta(name),
        status: Some(PersistentVolumeStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn claim_with_phase(name: &str, phase: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: meta(name),
        status: Some(PersistentVolumeClaimStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
