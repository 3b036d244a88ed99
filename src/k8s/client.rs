//! Kubernetes client builder with kubeconfig context support.

use anyhow::Result;
use tracing::debug;

use crate::error::KpupError;
use crate::version;

/// Build a Kubernetes client from kubeconfig.
///
/// Uses the specified context if provided, otherwise the current context.
pub async fn build_client(context: Option<&str>) -> Result<kube::Client> {
    let client = match context {
        Some(ctx) => {
            debug!("Using kubeconfig context: {}", ctx);
            let kubeconfig = kube::config::Kubeconfig::read()
                .map_err(|e| KpupError::Kubeconfig(e.to_string()))?;
            let config = kube::Config::from_custom_kubeconfig(
                kubeconfig,
                &kube::config::KubeConfigOptions {
                    context: Some(ctx.to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| KpupError::Kubeconfig(format!("context '{}': {}", ctx, e)))?;
            kube::Client::try_from(config)
                .map_err(|e| KpupError::Kubeconfig(format!("context '{}': {}", ctx, e)))?
        }
        None => {
            debug!("Using default kubeconfig context");
            kube::Client::try_default()
                .await
                .map_err(|e| KpupError::Kubeconfig(e.to_string()))?
        }
    };

    Ok(client)
}

/// Get the current context name from kubeconfig.
pub fn current_context(context: Option<&str>) -> String {
    if let Some(ctx) = context {
        return ctx.to_string();
    }

    kube::config::Kubeconfig::read()
        .ok()
        .and_then(|kc| kc.current_context)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Detect the control plane version (`MAJOR.MINOR`) from the API server.
pub async fn detect_control_plane_version(client: &kube::Client) -> Result<String> {
    let info = client.apiserver_version().await.map_err(|e| {
        KpupError::KubernetesApi(format!("Failed to get API server version: {}", e))
    })?;

    debug!(
        "API server reports major={} minor={} ({})",
        info.major, info.minor, info.git_version
    );

    version::control_plane_version(&info.major, &info.minor)
}
