//! Custom error types for kpup.

use thiserror::Error;

/// Errors that can occur while inspecting or updating kube-proxy.
#[derive(Error, Debug)]
pub enum KpupError {
    #[error("{name} has {count} containers, expected at least 1")]
    ContainerCount { name: String, count: usize },

    #[error("unexpected image format {image:?} for {name:?}")]
    ImageFormat { image: String, name: String },

    #[error("{0} is not up-to-date: {1}")]
    NotUpToDate(String, String),

    #[error("Invalid version format: {0}")]
    InvalidVersion(String),

    #[error("Kubernetes API error: {0}")]
    KubernetesApi(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Operation cancelled by user")]
    UserCancelled,
}
