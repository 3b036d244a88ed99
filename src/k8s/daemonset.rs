//! DaemonSet read/replace access used by the kube-proxy manager.

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::Api;
use kube::api::PostParams;
use tracing::debug;

/// Read and replace access to DaemonSets in a single namespace.
#[async_trait]
pub trait DaemonSetStore: Send + Sync {
    /// Fetch a DaemonSet by name. Returns `Ok(None)` when it does not exist.
    async fn get(&self, name: &str) -> Result<Option<DaemonSet>>;

    /// Replace a DaemonSet with the given object.
    ///
    /// The object's `resourceVersion` is sent as-is, so a concurrent
    /// modification surfaces as a conflict error.
    async fn replace(&self, daemonset: &DaemonSet) -> Result<DaemonSet>;

    /// Namespace this store operates in.
    fn namespace(&self) -> &str;
}

/// [`DaemonSetStore`] backed by the Kubernetes API.
pub struct KubeDaemonSetStore {
    api: Api<DaemonSet>,
    namespace: String,
}

impl KubeDaemonSetStore {
    pub fn new(client: kube::Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl DaemonSetStore for KubeDaemonSetStore {
    async fn get(&self, name: &str) -> Result<Option<DaemonSet>> {
        debug!("Getting DaemonSet {}/{}", self.namespace, name);
        let daemonset = self.api.get_opt(name).await?;
        Ok(daemonset)
    }

    async fn replace(&self, daemonset: &DaemonSet) -> Result<DaemonSet> {
        let name = daemonset.metadata.name.as_deref().unwrap_or_default();
        debug!("Replacing DaemonSet {}/{}", self.namespace, name);
        let updated = self
            .api
            .replace(name, &PostParams::default(), daemonset)
            .await?;
        Ok(updated)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
