//! kube-proxy DaemonSet inspection and upgrade.
//!
//! The kube-proxy image tag must track the control plane version
//! (`v<version>-eksbuild.1`), and the DaemonSet's required node affinity must
//! admit `arm64` nodes under the architecture label for that version.

pub mod affinity;
pub mod image;
pub mod manager;

pub use manager::{ProxyAddonManager, ProxyStatus, UpdateOutcome};

/// Name of the kube-proxy DaemonSet.
pub const KUBE_PROXY: &str = "kube-proxy";

/// Namespace the kube-proxy DaemonSet lives in.
pub const KUBE_SYSTEM_NAMESPACE: &str = "kube-system";
