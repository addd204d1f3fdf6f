// Command and path resolution.
//
// After a fresh install through the package manager, the PATH this process was
// spawned with is frequently stale: the new binary exists on disk but `which`
// cannot see it yet. This module probes a fixed list of well-known install
// locations and, when it finds the binary there, prepends its directory to the
// in-process search path so the rest of the run can invoke it. That extension
// is local to this process and vanishes at exit; it is deliberately not one
// of the persistent shell-startup mutations.

use std::env;
use std::path::{Path, PathBuf};

use crate::libs::mode::ExecutionMode;
use crate::libs::reporter::Reporter;
use crate::log_debug;

/// Result of a detection query for an external tool. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ToolPresence {
    pub present: bool,
    pub resolved_path: Option<PathBuf>,
    pub reported_version: Option<String>,
    /// Whether the binary resolved through the process's search path. False
    /// when it was found at a fallback location only, in which case spawning
    /// it by name fails until the search path is extended.
    pub on_search_path: bool,
}

/// Checks whether `name` resolves to an executable on the current process's
/// search path. Does not spawn anything.
pub fn is_invocable(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Probes each candidate binary location in order and returns the first that
/// exists on disk. The list is fixed: no registry or package-database query
/// happens beyond it.
pub fn resolve_fallback_path(name: &str, candidates: &[PathBuf]) -> Option<PathBuf> {
    log_debug!(
        "[Resolver] '{}' not on PATH; probing {} fallback location(s)",
        name,
        candidates.len()
    );
    candidates.iter().find(|candidate| candidate.exists()).cloned()
}

/// Well-known install locations for the fnm binary, most likely first.
pub fn fnm_fallback_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if cfg!(windows) {
        // winget exposes installed binaries through its Links directory and
        // keeps the payload under Packages.
        if let Some(local) = dirs::data_local_dir() {
            candidates.push(local.join("Microsoft").join("WinGet").join("Links").join("fnm.exe"));
            candidates.push(local.join("fnm").join("fnm.exe"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".fnm").join("fnm.exe"));
            candidates.push(home.join(".cargo").join("bin").join("fnm.exe"));
        }
    } else {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".fnm").join("fnm"));
            candidates.push(home.join(".local").join("bin").join("fnm"));
            candidates.push(home.join(".cargo").join("bin").join("fnm"));
        }
        candidates.push(PathBuf::from("/opt/homebrew/bin/fnm"));
        candidates.push(PathBuf::from("/usr/local/bin/fnm"));
        candidates.push(PathBuf::from("/usr/bin/fnm"));
    }

    candidates
}

/// Prepends `dir` to this process's search path so freshly installed binaries
/// become invocable for the remainder of the run.
///
/// Returns `true` when the path was (or would be) prepended, `false` when the
/// directory is already searched or the extension failed.
pub fn extend_search_path(dir: &Path, mode: ExecutionMode, reporter: &dyn Reporter) -> bool {
    let current = env::var_os("PATH").unwrap_or_default();
    if env::split_paths(&current).any(|entry| entry == dir) {
        log_debug!("[Resolver] {} is already on PATH", dir.display());
        return false;
    }

    if !mode.should_mutate() {
        reporter.info(&format!(
            "Would prepend {} to PATH for the remainder of this run",
            dir.display()
        ));
        return true;
    }

    let mut parts = vec![dir.to_path_buf()];
    parts.extend(env::split_paths(&current));
    match env::join_paths(parts) {
        Ok(joined) => {
            // Single-threaded process, no concurrent env readers.
            unsafe { env::set_var("PATH", &joined) };
            reporter.info(&format!(
                "Prepended {} to PATH for the remainder of this run",
                dir.display()
            ));
            true
        }
        Err(err) => {
            reporter.warn(&format!(
                "Could not extend PATH with {}: {err}. Open a new terminal to pick it up.",
                dir.display()
            ));
            false
        }
    }
}
