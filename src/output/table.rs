//! Status table rendering.
//!
//! Renders the kube-proxy status as a kubectl-style table.

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::proxy::ProxyStatus;

/// Row for the kube-proxy status table.
#[derive(Tabled)]
struct ProxyRow {
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "DAEMONSET")]
    name: String,
    #[tabled(rename = "CURRENT")]
    current_tag: String,
    #[tabled(rename = "DESIRED")]
    desired_tag: String,
    #[tabled(rename = "ARCH LABEL")]
    arch_label: String,
    #[tabled(rename = "ARM64")]
    arm64: String,
    #[tabled(rename = "STATE")]
    state: String,
}

impl From<&ProxyStatus> for ProxyRow {
    fn from(status: &ProxyStatus) -> Self {
        let arm64 = if status.has_arm64_selector {
            "yes".to_string()
        } else {
            "missing".yellow().to_string()
        };

        let state = if status.is_up_to_date() {
            "UpToDate".green().to_string()
        } else {
            "Outdated".red().to_string()
        };

        Self {
            namespace: status.namespace.clone(),
            name: status.name.clone(),
            current_tag: status.current_tag.clone(),
            desired_tag: status.desired_tag.clone(),
            arch_label: status.arch_label.clone(),
            arm64,
            state,
        }
    }
}

/// Render the status table.
fn render_table(status: &ProxyStatus) -> String {
    let mut table = Table::new([ProxyRow::from(status)]);
    apply_table_style(&mut table);
    table.to_string()
}

/// Print kube-proxy status for a control plane version.
pub fn print_status(status: Option<&ProxyStatus>, context_name: &str, cluster_version: &str) {
    println!(
        "{} (context: {}, control plane: {}):",
        "kube-proxy".bold(),
        context_name,
        cluster_version
    );

    match status {
        Some(status) => {
            println!("{}", render_table(status));
            println!("Image: {}", status.image);
        }
        None => println!("DaemonSet kube-system/kube-proxy not found. Nothing to manage."),
    }
}

fn apply_table_style(table: &mut Table) {
    use tabled::settings::object::Columns;
    use tabled::settings::themes::Theme;
    use tabled::settings::{Modify, Padding};

    let mut theme = Theme::from_style(Style::empty());
    theme.remove_horizontal_lines();
    table.with(theme);
    table.with(Modify::new(Columns::new(..)).with(Padding::new(0, 2, 0, 0)));
}
