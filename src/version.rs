//! Kubernetes version parsing and comparison.

use anyhow::Result;

use crate::error::KpupError;

/// Parse a Kubernetes version string into major and minor components.
///
/// Patch components (`1.27.3`) are accepted and ignored.
pub fn parse_k8s_version(version: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.len() < 2 {
        return Err(KpupError::InvalidVersion(version.to_string()).into());
    }

    let major: u32 = parts[0]
        .parse()
        .map_err(|_| KpupError::InvalidVersion(version.to_string()))?;
    let minor: u32 = parts[1]
        .parse()
        .map_err(|_| KpupError::InvalidVersion(version.to_string()))?;

    Ok((major, minor))
}

/// Returns true if `version` is at least `min_version`.
pub fn is_min_version(min_version: &str, version: &str) -> Result<bool> {
    let min = parse_k8s_version(min_version)?;
    let current = parse_k8s_version(version)?;
    Ok(current >= min)
}

/// Build a `MAJOR.MINOR` control plane version from the API server's
/// reported components.
///
/// EKS reports the minor version with a trailing `+` (e.g. `"27+"`).
pub fn control_plane_version(major: &str, minor: &str) -> Result<String> {
    let minor = minor.trim_end_matches(|c: char| !c.is_ascii_digit());
    let version = format!("{}.{}", major.trim(), minor);
    parse_k8s_version(&version)?;
    Ok(version)
}
