use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use kube::Client;
use kube::api::{Api, ListParams};

use crate::errors::PlatformError;
use crate::models::ResourceKey;

/// Kubernetes access used by the health engine: typed child listings plus a
/// raw existence fetch of the monitored custom resource.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn fetch_custom_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<serde_json::Value, PlatformError>;

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, PlatformError>;

    async fn list_jobs(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Job>, PlatformError>;

    /// PersistentVolumes are cluster scoped, so no namespace applies.
    async fn list_persistent_volumes(
        &self,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolume>, PlatformError>;

    async fn list_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, PlatformError>;
}

/// Live implementation backed by a kube client.
#[derive(Clone)]
pub struct KubePlatform {
    client: Client,
}

impl KubePlatform {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn list_params(label_selector: &str) -> ListParams {
    if label_selector.is_empty() {
        ListParams::default()
    } else {
        ListParams::default().labels(label_selector)
    }
}

#[async_trait]
impl PlatformClient for KubePlatform {
    async fn fetch_custom_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<serde_json::Value, PlatformError> {
        let path = format!(
            "/apis/{}/{}/namespaces/{}/{}/{}",
            key.group, key.version, key.namespace, key.plural, key.name
        );
        let req = http::Request::get(path)
            .body(Vec::new())
            .map_err(|e| PlatformError::Transport(e.to_string()))?;
        self.client
            .request::<serde_json::Value>(req)
            .await
            .map_err(PlatformError::from)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, PlatformError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&list_params(label_selector)).await?;
        Ok(list.items)
    }

    async fn list_jobs(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Job>, PlatformError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&list_params(label_selector)).await?;
        Ok(list.items)
    }

    async fn list_persistent_volumes(
        &self,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolume>, PlatformError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let list = api.list(&list_params(label_selector)).await?;
        Ok(list.items)
    }

    async fn list_persistent_volume_claims(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, PlatformError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&list_params(label_selector)).await?;
        Ok(list.items)
    }
}
