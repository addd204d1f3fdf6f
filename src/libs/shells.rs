// Shell configurators.
//
// Each supported shell is described by a `ShellTemplate`: the mutation targets
// that wire fnm into its startup sequence, plus a post-apply strategy. Adding
// a shell means adding one arm to `template_for` and, if needed, one post-apply
// variant. Templates are pure functions of the resolved user paths: stateless,
// order-independent, and safe to re-apply.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use thiserror::Error;

use crate::libs::mode::ExecutionMode;
use crate::libs::mutators;
use crate::libs::reporter::Reporter;
use crate::libs::store::{KeyValueStore, StoreError};
use crate::log_debug;

/// The activation snippet evaluated by PowerShell profiles on startup.
/// `--use-on-cd` switches versions on directory change; the recursive
/// version-file strategy walks ancestors for a `.node-version`/`.nvmrc` pin.
pub const POWERSHELL_SNIPPET: &str =
    "fnm env --use-on-cd --version-file-strategy=recursive | Out-String | Invoke-Expression";

/// Same activation, wrapped in bash's eval-of-command-substitution form.
pub const BASH_SNIPPET: &str =
    r#"eval "$(fnm env --use-on-cd --version-file-strategy=recursive)""#;

/// Launcher script synthesized for cmd.exe, which has no profile convention.
/// The FNM_AUTORUN sentinel guards against recursion: the FOR /f capture
/// spawns a child cmd, which would otherwise run the AutoRun script again.
pub const CMD_LAUNCHER_SCRIPT: &str = "@echo off\r\n\
if defined FNM_AUTORUN exit /b\r\n\
set FNM_AUTORUN=1\r\n\
FOR /f \"tokens=*\" %%z IN ('fnm env --use-on-cd --version-file-strategy=recursive') DO CALL %%z\r\n";

/// Name of the per-user auto-run value under the Command Processor key.
pub const AUTORUN_KEY: &str = "AutoRun";

/// cmd.exe chains AutoRun statements with `&`.
pub const AUTORUN_DELIMITER: &str = " & ";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    #[value(name = "powershell")]
    PowerShell,
    Bash,
    Cmd,
}

impl ShellKind {
    /// Human-facing name for status messages.
    pub fn label(self) -> &'static str {
        match self {
            ShellKind::PowerShell => "PowerShell",
            ShellKind::Bash => "bash",
            ShellKind::Cmd => "cmd",
        }
    }
}

impl fmt::Display for ShellKind {
    // Matches the clap value names so defaults render correctly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShellKind::PowerShell => "powershell",
            ShellKind::Bash => "bash",
            ShellKind::Cmd => "cmd",
        };
        write!(f, "{name}")
    }
}

/// User roots every template hangs off. Resolved once per run and injected, so
/// tests can point configurators at a sandbox.
#[derive(Debug, Clone)]
pub struct ShellPaths {
    pub home: PathBuf,
    /// The user's document-storage root. PowerShell profiles live under it,
    /// and cloud-sync features can redirect it away from `~/Documents`.
    pub documents: PathBuf,
}

impl ShellPaths {
    /// Resolves the real user paths. The Documents root comes from the OS's
    /// canonical lookup, falling back to the conventional `~/Documents` only
    /// when that lookup yields nothing.
    pub fn discover() -> Option<Self> {
        let home = dirs::home_dir()?;
        let documents = dirs::document_dir().unwrap_or_else(|| home.join("Documents"));
        Some(ShellPaths { home, documents })
    }
}

/// One idempotent-mutator invocation: a location plus the desired content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationTarget {
    LineInFile { path: PathBuf, line: String },
    LauncherScript { path: PathBuf, content: String },
    StoreEntry { key: String, value: String },
}

/// What happens after a shell's targets are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostApply {
    /// Nothing can be reloaded from here; the user must open a new session.
    NoReload,
    /// Dot-source the configured profile in a child shell to verify it
    /// executes cleanly. Best effort, Apply mode only; the user's current
    /// session is out of reach and still needs a restart.
    InPlaceReload,
    /// The auto-run registration takes effect in every new shell instance.
    RegistryAutoRun,
}

pub struct ShellTemplate {
    pub shell: ShellKind,
    pub targets: Vec<MutationTarget>,
    pub post_apply: PostApply,
}

/// Both profile generations: Windows PowerShell 5.x and PowerShell 7+. The
/// user may have either or both installed, so both are configured.
pub fn powershell_profiles(paths: &ShellPaths) -> [PathBuf; 2] {
    [
        paths
            .documents
            .join("WindowsPowerShell")
            .join("Microsoft.PowerShell_profile.ps1"),
        paths
            .documents
            .join("PowerShell")
            .join("Microsoft.PowerShell_profile.ps1"),
    ]
}

/// Path of the synthesized cmd.exe launcher script.
pub fn cmd_launcher_path(paths: &ShellPaths) -> PathBuf {
    paths.home.join("fnm_autorun.cmd")
}

/// The lookup from shell to its mutation targets and post-apply strategy.
pub fn template_for(shell: ShellKind, paths: &ShellPaths) -> ShellTemplate {
    match shell {
        ShellKind::PowerShell => ShellTemplate {
            shell,
            targets: powershell_profiles(paths)
                .into_iter()
                .map(|path| MutationTarget::LineInFile {
                    path,
                    line: POWERSHELL_SNIPPET.to_string(),
                })
                .collect(),
            post_apply: PostApply::InPlaceReload,
        },
        ShellKind::Bash => ShellTemplate {
            shell,
            targets: vec![MutationTarget::LineInFile {
                path: paths.home.join(".bashrc"),
                line: BASH_SNIPPET.to_string(),
            }],
            post_apply: PostApply::NoReload,
        },
        ShellKind::Cmd => {
            let launcher = cmd_launcher_path(paths);
            ShellTemplate {
                shell,
                targets: vec![
                    MutationTarget::LauncherScript {
                        path: launcher.clone(),
                        content: CMD_LAUNCHER_SCRIPT.to_string(),
                    },
                    // Quoted so cmd.exe parses the command unambiguously when
                    // the home directory contains spaces.
                    MutationTarget::StoreEntry {
                        key: AUTORUN_KEY.to_string(),
                        value: format!("\"{}\"", launcher.display()),
                    },
                ],
                post_apply: PostApply::RegistryAutoRun,
            }
        }
    }
}

/// One line per target, for detect-only guidance and dry-run summaries.
pub fn describe_targets(template: &ShellTemplate) -> Vec<String> {
    template
        .targets
        .iter()
        .map(|target| match target {
            MutationTarget::LineInFile { path, line } => {
                format!("{}: ensure `{line}` in {}", template.shell.label(), path.display())
            }
            MutationTarget::LauncherScript { path, .. } => {
                format!("{}: write launcher script {}", template.shell.label(), path.display())
            }
            MutationTarget::StoreEntry { key, value } => {
                format!("{}: register {value} under the {key} auto-run key", template.shell.label())
            }
        })
        .collect()
}

#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies every target of `template` through the idempotent mutators, then
/// runs the shell's post-apply step.
pub fn configure_shell(
    template: &ShellTemplate,
    store: &mut dyn KeyValueStore,
    mode: ExecutionMode,
    reporter: &dyn Reporter,
) -> Result<(), ConfigureError> {
    reporter.info(&format!("Configuring {}...", template.shell.label()));
    for target in &template.targets {
        match target {
            MutationTarget::LineInFile { path, line } => {
                mutators::ensure_line_in_file(path, line, mode, reporter)?;
            }
            MutationTarget::LauncherScript { path, content } => {
                mutators::ensure_file_content(path, content, mode, reporter)?;
            }
            MutationTarget::StoreEntry { key, value } => {
                mutators::ensure_value_in_store(store, key, value, AUTORUN_DELIMITER, mode, reporter)?;
            }
        }
    }
    post_apply(template, mode, reporter);
    Ok(())
}

fn post_apply(template: &ShellTemplate, mode: ExecutionMode, reporter: &dyn Reporter) {
    match template.post_apply {
        PostApply::NoReload => {
            // A running bash in another host session cannot be reached.
            reporter.info(&format!(
                "Open a new {} session for automatic version switching to take effect",
                template.shell.label()
            ));
        }
        PostApply::InPlaceReload => {
            if mode.should_mutate() {
                verify_powershell_profiles(template, reporter);
            } else {
                reporter.info("Would verify the PowerShell profile in a child shell");
            }
        }
        PostApply::RegistryAutoRun => {
            reporter.info(
                "Every new cmd window will run the fnm launcher; open a new window to activate it",
            );
        }
    }
}

/// Best-effort dot-source of each freshly configured profile in a child
/// shell. This proves the profile executes cleanly; it cannot make the change
/// live in the user's current session. Failure is reported, never escalated.
fn verify_powershell_profiles(template: &ShellTemplate, reporter: &dyn Reporter) {
    for target in &template.targets {
        let MutationTarget::LineInFile { path, .. } = target else {
            continue;
        };
        if !path.exists() {
            continue;
        }
        match dot_source_profile(path) {
            Ok(true) => reporter.success(&format!(
                "Verified {} loads cleanly; it takes effect in new PowerShell sessions",
                path.display()
            )),
            Ok(false) => reporter.warn(&format!(
                "{} did not load cleanly in a verification shell; check it before your next session",
                path.display()
            )),
            Err(err) => {
                log_debug!("[Shell] Profile verification spawn failed: {err}");
                reporter.warn(&format!(
                    "Could not verify {} ({err}); it takes effect in new PowerShell sessions",
                    path.display()
                ));
            }
        }
    }
}

fn dot_source_profile(path: &Path) -> io::Result<bool> {
    let status = Command::new("powershell")
        .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"])
        .arg(format!(". '{}'", path.display()))
        .status()?;
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{
        BASH_SNIPPET, MutationTarget, POWERSHELL_SNIPPET, PostApply, ShellKind, ShellPaths,
        cmd_launcher_path, template_for,
    };

    fn paths() -> ShellPaths {
        ShellPaths {
            home: PathBuf::from("/home/dev"),
            documents: PathBuf::from("/home/dev/Documents"),
        }
    }

    #[test]
    fn powershell_targets_both_profile_generations() {
        let template = template_for(ShellKind::PowerShell, &paths());
        assert_eq!(template.post_apply, PostApply::InPlaceReload);
        assert_eq!(template.targets.len(), 2);

        let target_paths: Vec<_> = template
            .targets
            .iter()
            .map(|target| match target {
                MutationTarget::LineInFile { path, line } => {
                    assert_eq!(line, POWERSHELL_SNIPPET);
                    path.clone()
                }
                other => panic!("unexpected target {other:?}"),
            })
            .collect();
        assert!(target_paths[0].starts_with("/home/dev/Documents/WindowsPowerShell"));
        assert!(target_paths[1].starts_with("/home/dev/Documents/PowerShell"));
    }

    #[test]
    fn bash_targets_single_bashrc() {
        let template = template_for(ShellKind::Bash, &paths());
        assert_eq!(template.post_apply, PostApply::NoReload);
        assert_eq!(
            template.targets,
            vec![MutationTarget::LineInFile {
                path: PathBuf::from("/home/dev/.bashrc"),
                line: BASH_SNIPPET.to_string(),
            }]
        );
    }

    #[test]
    fn cmd_targets_launcher_plus_autorun_entry() {
        let template = template_for(ShellKind::Cmd, &paths());
        assert_eq!(template.post_apply, PostApply::RegistryAutoRun);
        assert_eq!(template.targets.len(), 2);

        let launcher = cmd_launcher_path(&paths());
        match &template.targets[1] {
            MutationTarget::StoreEntry { key, value } => {
                assert_eq!(key, "AutoRun");
                assert_eq!(value, &format!("\"{}\"", launcher.display()));
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn autorun_value_is_quoted_for_homes_with_spaces() {
        let paths = ShellPaths {
            home: PathBuf::from("/home/John Doe"),
            documents: PathBuf::from("/home/John Doe/Documents"),
        };
        let template = template_for(ShellKind::Cmd, &paths);
        match &template.targets[1] {
            MutationTarget::StoreEntry { value, .. } => {
                assert!(value.starts_with('"') && value.ends_with('"'), "unquoted: {value}");
                assert!(value.contains("John Doe"));
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn launcher_script_guards_against_recursion() {
        assert!(super::CMD_LAUNCHER_SCRIPT.contains("if defined FNM_AUTORUN exit /b"));
        assert!(super::CMD_LAUNCHER_SCRIPT.contains("fnm env"));
    }
}
