//! CLI configuration and argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// kube-proxy DaemonSet upgrade CLI tool for EKS clusters.
///
/// Checks whether kube-system/kube-proxy runs the image tag matching the
/// control plane version and updates it, including the arm64 node affinity.
#[derive(Parser, Debug, Clone)]
#[command(name = "kpup")]
#[command(about = "kube-proxy DaemonSet upgrade CLI tool for EKS clusters")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    /// Kubernetes context to use
    #[arg(long, global = true, env = "KUBECONFIG_CONTEXT")]
    pub context: Option<String>,

    /// Control plane version (e.g., 1.31) [default: detected from API server]
    #[arg(long, global = true, value_name = "VERSION")]
    pub cluster_version: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "KPUP_LOG_LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for the `check` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show whether kube-proxy matches the control plane version
    Check {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Exit with an error if kube-proxy needs an update (tag or arm64 affinity)
        #[arg(long, default_value = "false")]
        exit_code: bool,
    },

    /// Update kube-proxy image tag and arm64 node affinity
    #[command(after_help = r#"Examples:
  kpup update --dry-run                  Show whether an update is pending
  kpup update --cluster-version 1.31 -y  Update without confirmation"#)]
    Update {
        /// Show planned changes without executing
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(short, long, default_value = "false")]
        yes: bool,
    },
}

/// Application configuration derived from CLI args.
#[derive(Debug, Clone)]
pub struct Config {
    pub context: Option<String>,
    pub cluster_version: Option<String>,
    pub log_level: String,
    pub command: Command,
}

impl Config {
    /// Create config from CLI arguments.
    pub fn from_args(args: Args) -> Self {
        let cluster_version = args
            .cluster_version
            .map(|v| v.trim().trim_start_matches('v').to_string())
            .filter(|v| !v.is_empty());

        Self {
            context: args.context,
            cluster_version,
            log_level: args.log_level,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["kpup"];
        argv.extend_from_slice(args);
        Config::from_args(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_check_defaults_to_table() {
        let config = parse(&["check"]);
        assert!(matches!(
            config.command,
            Command::Check {
                output: OutputFormat::Table,
                exit_code: false
            }
        ));
        assert!(config.cluster_version.is_none());
        assert!(config.context.is_none());
    }

    #[test]
    fn test_check_json_output() {
        let config = parse(&["check", "-o", "json", "--exit-code"]);
        assert!(matches!(
            config.command,
            Command::Check {
                output: OutputFormat::Json,
                exit_code: true
            }
        ));
    }

    #[test]
    fn test_update_flags() {
        let config = parse(&["update", "--dry-run"]);
        if let Command::Update { dry_run, yes } = config.command {
            assert!(dry_run);
            assert!(!yes);
        } else {
            panic!("Expected Update command");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let config = parse(&[
            "update",
            "-y",
            "--cluster-version",
            "1.31",
            "--context",
            "prod",
        ]);
        assert_eq!(config.cluster_version.as_deref(), Some("1.31"));
        assert_eq!(config.context.as_deref(), Some("prod"));
        assert!(matches!(config.command, Command::Update { yes: true, .. }));
    }

    #[test]
    fn test_cluster_version_normalized() {
        let config = parse(&["check", "--cluster-version", " v1.30 "]);
        assert_eq!(config.cluster_version.as_deref(), Some("1.30"));

        let config = parse(&["check", "--cluster-version", ""]);
        assert!(config.cluster_version.is_none());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["kpup"]).is_err());
    }
}
