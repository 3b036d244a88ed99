//! Kubernetes API access.

pub mod client;
pub mod daemonset;
