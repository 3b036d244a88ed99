//! kube-proxy up-to-date check and update.

use anyhow::Result;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::core::v1::Container;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::KUBE_PROXY;
use super::affinity::{ARM64, add_arm64_node_selector, arch_label, has_arm64_node_selector};
use super::image::{expected_image_tag, image_tag, split_image, with_tag};
use crate::error::KpupError;
use crate::k8s::daemonset::DaemonSetStore;

/// Result of [`ProxyAddonManager::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// kube-proxy is absent or already up to date.
    NoChangeNeeded,
    /// An update is needed but was not applied (dry run).
    ChangePending,
    /// The update was written to the cluster.
    Applied,
}

impl UpdateOutcome {
    /// Returns true only when a change is still pending.
    pub fn is_pending(self) -> bool {
        matches!(self, UpdateOutcome::ChangePending)
    }
}

/// Read-only snapshot of the kube-proxy DaemonSet against a control plane version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyStatus {
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub current_tag: String,
    pub desired_tag: String,
    pub arch_label: String,
    pub has_arm64_selector: bool,
}

impl ProxyStatus {
    /// Returns true if the image tag matches the control plane version.
    pub fn is_tag_current(&self) -> bool {
        self.current_tag == self.desired_tag
    }

    /// Returns true if no update is needed.
    pub fn is_up_to_date(&self) -> bool {
        self.is_tag_current() && self.has_arm64_selector
    }
}

/// Checks and updates the kube-proxy DaemonSet.
pub struct ProxyAddonManager<S> {
    store: S,
}

impl<S: DaemonSetStore> ProxyAddonManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns true if the kube-proxy image tag matches `control_plane_version`.
    ///
    /// A missing DaemonSet counts as up to date.
    pub async fn is_up_to_date(&self, control_plane_version: &str) -> Result<bool> {
        let Some(daemonset) = self.fetch().await? else {
            return Ok(true);
        };

        let image = first_container_image(&daemonset)?;
        let desired_tag = expected_image_tag(control_plane_version)?;
        let current_tag = image_tag(image)?;

        Ok(current_tag == desired_tag)
    }

    /// Inspect kube-proxy without changing it. Returns `None` if it does not exist.
    pub async fn status(&self, control_plane_version: &str) -> Result<Option<ProxyStatus>> {
        let Some(daemonset) = self.fetch().await? else {
            return Ok(None);
        };

        let image = first_container_image(&daemonset)?;
        let desired_tag = expected_image_tag(control_plane_version)?;
        let current_tag = image_tag(image)?.to_string();
        let label = arch_label(control_plane_version)?;

        Ok(Some(ProxyStatus {
            namespace: self.store.namespace().to_string(),
            name: KUBE_PROXY.to_string(),
            image: image.to_string(),
            current_tag,
            desired_tag,
            arch_label: label.to_string(),
            has_arm64_selector: has_arm64_node_selector(&daemonset, label),
        }))
    }

    /// Bring kube-proxy in line with `control_plane_version`.
    ///
    /// Sets the image tag and adds `arm64` to the architecture node
    /// selector. With `dry_run`, reports [`UpdateOutcome::ChangePending`]
    /// instead of writing.
    pub async fn apply(&self, control_plane_version: &str, dry_run: bool) -> Result<UpdateOutcome> {
        let Some(current) = self.fetch().await? else {
            return Ok(UpdateOutcome::NoChangeNeeded);
        };

        let Some(target) = build_update(&current, control_plane_version)? else {
            info!("{:?} is already up-to-date", KUBE_PROXY);
            return Ok(UpdateOutcome::NoChangeNeeded);
        };

        if dry_run {
            error!("(plan) {:?} is not up-to-date", KUBE_PROXY);
            return Ok(UpdateOutcome::ChangePending);
        }

        debug!("{} [updated] = \n{}", KUBE_PROXY, to_json(&target));

        self.store.replace(&target).await.map_err(|e| {
            KpupError::KubernetesApi(format!(
                "Failed to update DaemonSet {}/{}: {}",
                self.store.namespace(),
                KUBE_PROXY,
                e
            ))
        })?;

        info!("{:?} is now up-to-date", KUBE_PROXY);
        Ok(UpdateOutcome::Applied)
    }

    async fn fetch(&self) -> Result<Option<DaemonSet>> {
        let daemonset = self.store.get(KUBE_PROXY).await.map_err(|e| {
            KpupError::KubernetesApi(format!(
                "Failed to get DaemonSet {}/{}: {}",
                self.store.namespace(),
                KUBE_PROXY,
                e
            ))
        })?;

        if daemonset.is_none() {
            warn!("{:?} was not found", KUBE_PROXY);
        }
        Ok(daemonset)
    }
}

/// Compute the updated kube-proxy DaemonSet, or `None` if it is already current.
///
/// All validation happens before the target object is built, so an error
/// leaves nothing half-changed.
pub fn build_update(current: &DaemonSet, control_plane_version: &str) -> Result<Option<DaemonSet>> {
    let label = arch_label(control_plane_version)?;

    let has_arm64 = has_arm64_node_selector(current, label);
    if !has_arm64 {
        info!("missing arm64 nodeSelector value");
    }

    let image = first_container_image(current)?;
    debug!("{} [current] = \n{}", KUBE_PROXY, to_json(current));

    let (_, current_tag) = split_image(image)?;
    let desired_tag = expected_image_tag(control_plane_version)?;

    if current_tag == desired_tag && has_arm64 {
        debug!("current tag = {}, desired tag = {}", current_tag, desired_tag);
        return Ok(None);
    }

    let new_image = with_tag(image, &desired_tag)?;
    let mut target = current.clone();
    if let Some(container) = pod_containers_mut(&mut target).first_mut() {
        container.image = Some(new_image);
    }
    if !has_arm64 {
        let changed = add_arm64_node_selector(&mut target, label);
        debug!("Added {} to {} {} match expressions", ARM64, changed, label);
    }

    Ok(Some(target))
}

/// Image of the first container, failing if the pod template has none.
fn first_container_image(daemonset: &DaemonSet) -> Result<&str> {
    let containers = daemonset
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|pod| pod.containers.as_slice())
        .unwrap_or_default();

    let container = containers.first().ok_or_else(|| KpupError::ContainerCount {
        name: KUBE_PROXY.to_string(),
        count: containers.len(),
    })?;

    Ok(container.image.as_deref().unwrap_or_default())
}

fn pod_containers_mut(daemonset: &mut DaemonSet) -> &mut [Container] {
    daemonset
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
        .map(|pod| pod.containers.as_mut_slice())
        .unwrap_or_default()
}

fn to_json(daemonset: &DaemonSet) -> String {
    serde_json::to_string_pretty(daemonset).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
