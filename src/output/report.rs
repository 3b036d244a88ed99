//! JSON report for the `check` command.

use serde::Serialize;

use crate::proxy::ProxyStatus;

/// Machine-readable result of `kpup check`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub context: String,
    pub control_plane_version: String,
    pub found: bool,
    pub up_to_date: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube_proxy: Option<ProxyStatus>,
}

impl CheckReport {
    pub fn new(context: &str, control_plane_version: &str, status: Option<ProxyStatus>) -> Self {
        Self {
            context: context.to_string(),
            control_plane_version: control_plane_version.to_string(),
            found: status.is_some(),
            up_to_date: status.as_ref().is_none_or(ProxyStatus::is_up_to_date),
            kube_proxy: status,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
