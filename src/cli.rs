// Defines the command-line interface for 'setup-fnm'.
// `#[derive(Parser)]` generates the argument parsing code via `clap`.

use clap::Parser;

use crate::libs::mode::{ExecutionContext, ExecutionMode};
use crate::libs::shells::ShellKind;

#[derive(Parser)]
#[command(name = "setup-fnm")]
#[command(version)]
#[command(
    about = "Install fnm and wire automatic Node.js version switching into your shells",
    long_about = None
)]
pub struct Cli {
    /// Shells to configure (comma-separated).
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [ShellKind::PowerShell, ShellKind::Bash, ShellKind::Cmd]
    )]
    pub shells: Vec<ShellKind>,

    /// Node.js version to install once fnm is set up: a version number,
    /// "lts", or "latest".
    #[arg(long)]
    pub node_version: Option<String>,

    /// Only inspect the environment; install and modify nothing.
    #[arg(long)]
    pub detect_only: bool,

    /// Report every change that would be made, without performing any of them.
    #[arg(long)]
    pub dry_run: bool,

    /// Turn debugging information on.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Builds the immutable per-invocation context. Detect-only wins over
    /// dry-run when both flags are given: inspection is the stricter promise.
    pub fn context(&self) -> ExecutionContext {
        let mode = if self.detect_only {
            ExecutionMode::DetectOnly
        } else if self.dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Apply
        };
        ExecutionContext {
            shells: self.shells.clone(),
            mode,
            node_version: self.node_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;
    use crate::libs::mode::ExecutionMode;
    use crate::libs::shells::ShellKind;

    #[test]
    fn defaults_cover_all_shells_in_apply_mode() {
        let cli = Cli::parse_from(["setup-fnm"]);
        let ctx = cli.context();
        assert_eq!(ctx.shells, vec![ShellKind::PowerShell, ShellKind::Bash, ShellKind::Cmd]);
        assert_eq!(ctx.mode, ExecutionMode::Apply);
        assert!(ctx.node_version.is_none());
    }

    #[test]
    fn shell_list_is_comma_separated() {
        let cli = Cli::parse_from(["setup-fnm", "--shells", "bash,cmd"]);
        assert_eq!(cli.context().shells, vec![ShellKind::Bash, ShellKind::Cmd]);
    }

    #[test]
    fn detect_only_outranks_dry_run() {
        let cli = Cli::parse_from(["setup-fnm", "--detect-only", "--dry-run"]);
        assert_eq!(cli.context().mode, ExecutionMode::DetectOnly);
    }

    #[test]
    fn dry_run_flag_selects_dry_run_mode() {
        let cli = Cli::parse_from(["setup-fnm", "--dry-run", "--node-version", "22"]);
        let ctx = cli.context();
        assert_eq!(ctx.mode, ExecutionMode::DryRun);
        assert_eq!(ctx.node_version.as_deref(), Some("22"));
    }
}
