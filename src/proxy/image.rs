//! Image reference and tag handling.

use anyhow::Result;

use super::KUBE_PROXY;
use crate::error::KpupError;

/// Suffix EKS appends to kube-proxy image tags.
const EKS_BUILD_SUFFIX: &str = "-eksbuild.1";

/// Compute the kube-proxy image tag expected for a control plane version.
pub fn expected_image_tag(control_plane_version: &str) -> Result<String> {
    let version = control_plane_version.trim();
    if version.is_empty() {
        return Err(KpupError::InvalidVersion(control_plane_version.to_string()).into());
    }
    Ok(format!("v{}{}", version, EKS_BUILD_SUFFIX))
}

/// Split an image reference into `(repository, tag)`.
///
/// The reference must contain exactly one `:`. Registries with a port
/// (`host:5000/repo:tag`) are rejected the same way.
pub fn split_image(image: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = image.split(':').collect();
    match parts.as_slice() {
        [repository, tag] => Ok((*repository, *tag)),
        _ => Err(KpupError::ImageFormat {
            image: image.to_string(),
            name: KUBE_PROXY.to_string(),
        }
        .into()),
    }
}

/// Extract the tag of an image reference.
pub fn image_tag(image: &str) -> Result<&str> {
    split_image(image).map(|(_, tag)| tag)
}

/// Rebuild an image reference with a different tag.
pub fn with_tag(image: &str, tag: &str) -> Result<String> {
    let (repository, _) = split_image(image)?;
    Ok(format!("{}:{}", repository, tag))
}
