//! # fnm collaborator
//!
//! Black-box wrapper around the fnm binary: presence/version probing plus the
//! three version operations the orchestrator drives (install, set default,
//! activate). The binary's output formats are fnm's own; nothing here parses
//! beyond stripping the `fnm ` prefix from `--version`.

use std::io;
use std::path::Path;
use std::process::Command;

use crate::libs::resolver::{self, ToolPresence};
use crate::log_debug;

/// The interface the orchestrator needs from the version manager. A trait so
/// scenario tests can swap in a fake collaborator.
pub trait VersionManager {
    /// Detects whether the tool is invocable, where it resolved from, and
    /// which version it reports.
    fn presence(&self) -> ToolPresence;
    /// `fnm install <version>`.
    fn install(&self, version: &str) -> io::Result<bool>;
    /// `fnm default <version>`, the version new sessions start on.
    fn set_default(&self, version: &str) -> io::Result<bool>;
    /// `fnm use <version>`: activation in the current session. Expected to
    /// fail until a shell with the activation snippet is running.
    fn activate(&self, version: &str) -> io::Result<bool>;
}

pub struct FnmCli;

impl FnmCli {
    pub const COMMAND: &'static str = "fnm";

    fn install_args(version: &str) -> Vec<String> {
        match version {
            "lts" => vec!["install".into(), "--lts".into()],
            other => vec!["install".into(), other.to_string()],
        }
    }

    /// The alias `fnm default`/`fnm use` understand for a symbolic request.
    fn version_alias(version: &str) -> &str {
        match version {
            "lts" => "lts-latest",
            other => other,
        }
    }

    fn run(args: &[String]) -> io::Result<bool> {
        log_debug!("[fnm] Running fnm {}", args.join(" "));
        let status = Command::new(Self::COMMAND).args(args).status()?;
        Ok(status.success())
    }
}

fn reported_version(binary: &Path) -> Option<String> {
    let output = Command::new(binary).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    let version = trimmed.strip_prefix("fnm ").unwrap_or(trimmed);
    (!version.is_empty()).then(|| version.to_string())
}

impl VersionManager for FnmCli {
    fn presence(&self) -> ToolPresence {
        if let Ok(path) = which::which(Self::COMMAND) {
            let version = reported_version(&path);
            return ToolPresence {
                present: true,
                resolved_path: Some(path),
                reported_version: version,
                on_search_path: true,
            };
        }

        // Not on PATH; a fresh install may still be sitting in a well-known
        // location the spawning shell has not picked up yet. The caller is
        // responsible for extending the search path before spawning by name.
        match resolver::resolve_fallback_path(Self::COMMAND, &resolver::fnm_fallback_candidates()) {
            Some(path) => {
                let version = reported_version(&path);
                ToolPresence {
                    present: true,
                    resolved_path: Some(path),
                    reported_version: version,
                    on_search_path: false,
                }
            }
            None => ToolPresence::default(),
        }
    }

    fn install(&self, version: &str) -> io::Result<bool> {
        Self::run(&Self::install_args(version))
    }

    fn set_default(&self, version: &str) -> io::Result<bool> {
        Self::run(&["default".to_string(), Self::version_alias(version).to_string()])
    }

    fn activate(&self, version: &str) -> io::Result<bool> {
        Self::run(&["use".to_string(), Self::version_alias(version).to_string()])
    }
}
