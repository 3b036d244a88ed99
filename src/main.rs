//! kpup - kube-proxy DaemonSet upgrade CLI tool for EKS clusters.
//!
//! Keeps kube-system/kube-proxy in line with the control plane:
//! - Image tag `v<version>-eksbuild.1`
//! - Required node affinity admitting arm64 nodes

mod config;
mod error;
mod k8s;
mod output;
mod proxy;
mod version;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing::{debug, error, info};

use config::{Args, Command, Config, OutputFormat};
use error::KpupError;
use k8s::daemonset::KubeDaemonSetStore;
use output::CheckReport;
use proxy::{KUBE_PROXY, KUBE_SYSTEM_NAMESPACE, ProxyAddonManager, ProxyStatus, UpdateOutcome};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = Config::from_args(args);

    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!("Starting kpup - kube-proxy Upgrade Tool");

    if let Err(e) = run(&config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(config: &Config) -> Result<()> {
    let client = k8s::client::build_client(config.context.as_deref()).await?;
    let context_name = k8s::client::current_context(config.context.as_deref());

    let cluster_version = match &config.cluster_version {
        Some(v) => v.clone(),
        None => k8s::client::detect_control_plane_version(&client).await?,
    };
    debug!("Control plane version: {}", cluster_version);

    let manager = ProxyAddonManager::new(KubeDaemonSetStore::new(client, KUBE_SYSTEM_NAMESPACE));

    match &config.command {
        Command::Check { output, exit_code } => {
            run_check(&manager, &context_name, &cluster_version, *output, *exit_code).await
        }
        Command::Update { dry_run, yes } => {
            run_update(&manager, &context_name, &cluster_version, *dry_run, *yes).await
        }
    }
}

/// Show kube-proxy status.
async fn run_check(
    manager: &ProxyAddonManager<KubeDaemonSetStore>,
    context_name: &str,
    cluster_version: &str,
    output: OutputFormat,
    exit_code: bool,
) -> Result<()> {
    let status = manager.status(cluster_version).await?;

    let verdict = if exit_code {
        ensure_up_to_date(status.as_ref(), cluster_version)
    } else {
        Ok(())
    };

    print_check(status, context_name, cluster_version, output)?;
    verdict
}

/// Render `check` output in the requested format.
fn print_check(
    status: Option<ProxyStatus>,
    context_name: &str,
    cluster_version: &str,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Table => output::print_status(status.as_ref(), context_name, cluster_version),
        OutputFormat::Json => {
            let report = CheckReport::new(context_name, cluster_version, status);
            println!("{}", report.to_json()?);
        }
    }
    Ok(())
}

/// Fail if kube-proxy needs an update (image tag or arm64 node affinity).
///
/// A missing DaemonSet has nothing to update.
fn ensure_up_to_date(status: Option<&ProxyStatus>, cluster_version: &str) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };

    if status.is_up_to_date() {
        return Ok(());
    }

    let reason = if !status.is_tag_current() {
        format!(
            "image tag {} does not match {} for control plane {}",
            status.current_tag, status.desired_tag, cluster_version
        )
    } else {
        format!("{} node affinity does not admit arm64", status.arch_label)
    };
    Err(KpupError::NotUpToDate(KUBE_PROXY.to_string(), reason).into())
}

/// Update kube-proxy to match the control plane version.
async fn run_update(
    manager: &ProxyAddonManager<KubeDaemonSetStore>,
    context_name: &str,
    cluster_version: &str,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    // Confirmation is only needed when a write would actually happen.
    if !dry_run && !yes {
        let needs_update = manager
            .status(cluster_version)
            .await?
            .is_some_and(|status| !status.is_up_to_date());
        if !needs_update {
            report_outcome(UpdateOutcome::NoChangeNeeded, cluster_version);
            return Ok(());
        }

        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Update {}/{} to {} in context '{}'?",
                KUBE_SYSTEM_NAMESPACE,
                KUBE_PROXY,
                proxy::image::expected_image_tag(cluster_version)?,
                context_name
            ))
            .default(false)
            .interact()?;

        if !proceed {
            info!("Skipping {} update", KUBE_PROXY);
            return Err(KpupError::UserCancelled.into());
        }
    }

    let outcome = manager.apply(cluster_version, dry_run).await?;
    report_outcome(outcome, cluster_version);
    Ok(())
}

/// Print a one-line summary of an update outcome.
fn report_outcome(outcome: UpdateOutcome, cluster_version: &str) {
    match outcome {
        UpdateOutcome::NoChangeNeeded => println!(
            "{} is already up-to-date for control plane {}",
            KUBE_PROXY.bold(),
            cluster_version
        ),
        UpdateOutcome::ChangePending => println!(
            "{} {} is not up-to-date for control plane {}",
            "[DRY RUN]".yellow(),
            KUBE_PROXY.bold(),
            cluster_version
        ),
        UpdateOutcome::Applied => println!(
            "Updated {} for control plane {}",
            KUBE_PROXY.bold(),
            cluster_version
        ),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize log filter: {}", e))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(current_tag: &str, has_arm64_selector: bool) -> ProxyStatus {
        ProxyStatus {
            namespace: "kube-system".to_string(),
            name: "kube-proxy".to_string(),
            image: format!("public.ecr.aws/eks/kube-proxy:{}", current_tag),
            current_tag: current_tag.to_string(),
            desired_tag: "v1.27-eksbuild.1".to_string(),
            arch_label: "kubernetes.io/arch".to_string(),
            has_arm64_selector,
        }
    }

    #[test]
    fn test_ensure_up_to_date_current() {
        assert!(ensure_up_to_date(Some(&status("v1.27-eksbuild.1", true)), "1.27").is_ok());
    }

    #[test]
    fn test_ensure_up_to_date_missing_daemonset() {
        assert!(ensure_up_to_date(None, "1.27").is_ok());
    }

    #[test]
    fn test_ensure_up_to_date_outdated_tag() {
        let err = ensure_up_to_date(Some(&status("v1.26-eksbuild.1", true)), "1.27").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KpupError>(),
            Some(KpupError::NotUpToDate(_, _))
        ));
        assert!(err.to_string().contains("v1.26-eksbuild.1"));
    }

    #[test]
    fn test_ensure_up_to_date_missing_arm64_selector() {
        let err = ensure_up_to_date(Some(&status("v1.27-eksbuild.1", false)), "1.27").unwrap_err();
        assert_eq!(
            err.to_string(),
            "kube-proxy is not up-to-date: kubernetes.io/arch node affinity does not admit arm64"
        );
    }
}
