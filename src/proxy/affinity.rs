//! Architecture node affinity on the kube-proxy pod template.

use anyhow::Result;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::core::v1::NodeSelectorTerm;

use crate::version::is_min_version;

/// Architecture label used from [`ARCH_LABEL_MIN_VERSION`] onward.
pub const ARCH_LABEL: &str = "kubernetes.io/arch";

/// Architecture label used before [`ARCH_LABEL_MIN_VERSION`].
pub const ARCH_BETA_LABEL: &str = "beta.kubernetes.io/arch";

/// First control plane version that uses [`ARCH_LABEL`].
pub const ARCH_LABEL_MIN_VERSION: &str = "1.18";

/// Architecture value kube-proxy must be schedulable on.
pub const ARM64: &str = "arm64";

/// Select the architecture label key for a control plane version.
pub fn arch_label(control_plane_version: &str) -> Result<&'static str> {
    if is_min_version(ARCH_LABEL_MIN_VERSION, control_plane_version)? {
        Ok(ARCH_LABEL)
    } else {
        Ok(ARCH_BETA_LABEL)
    }
}

/// Flatten the required node selector terms into `(key, values)` pairs.
///
/// Returns an empty list when any level of the affinity is absent.
pub fn node_selector_requirements(daemonset: &DaemonSet) -> Vec<(&str, &[String])> {
    daemonset
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|pod| pod.affinity.as_ref())
        .and_then(|affinity| affinity.node_affinity.as_ref())
        .and_then(|na| na.required_during_scheduling_ignored_during_execution.as_ref())
        .map(|selector| {
            selector
                .node_selector_terms
                .iter()
                .flat_map(|term| term.match_expressions.iter().flatten())
                .map(|expr| (expr.key.as_str(), expr.values.as_deref().unwrap_or(&[])))
                .collect()
        })
        .unwrap_or_default()
}

/// Returns true if a required node selector term admits `arm64` under `label`.
pub fn has_arm64_node_selector(daemonset: &DaemonSet, label: &str) -> bool {
    node_selector_requirements(daemonset)
        .into_iter()
        .any(|(key, values)| key == label && values.iter().any(|v| v == ARM64))
}

/// Append `arm64` to every match expression keyed by `label`.
///
/// Never creates terms or expressions, and does not deduplicate: callers
/// check [`has_arm64_node_selector`] first. Returns the number of
/// expressions changed.
pub fn add_arm64_node_selector(daemonset: &mut DaemonSet, label: &str) -> usize {
    let Some(terms) = node_selector_terms_mut(daemonset) else {
        return 0;
    };

    let mut changed = 0;
    for expr in terms
        .iter_mut()
        .flat_map(|term| term.match_expressions.iter_mut().flatten())
        .filter(|expr| expr.key == label)
    {
        expr.values.get_or_insert_with(Vec::new).push(ARM64.to_string());
        changed += 1;
    }
    changed
}

fn node_selector_terms_mut(daemonset: &mut DaemonSet) -> Option<&mut Vec<NodeSelectorTerm>> {
    daemonset
        .spec
        .as_mut()?
        .template
        .spec
        .as_mut()?
        .affinity
        .as_mut()?
        .node_affinity
        .as_mut()?
        .required_during_scheduling_ignored_during_execution
        .as_mut()
        .map(|selector| &mut selector.node_selector_terms)
}
