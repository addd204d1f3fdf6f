// Read-only environment inspection.
//
// Two independent checks run before anything is touched: is another Node.js
// version manager already installed, and is there a system-wide Node.js that
// would fight with fnm's per-session switching. Findings are advisory; they
// are printed once and never abort the run.
//
// The alternate-manager check deliberately relies on environment markers and
// well-known install paths only. Executing nvm just to see whether it exists
// can trigger its first-run interactive prompt, so it is never spawned.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use crate::libs::reporter::Reporter;
use crate::libs::resolver::{self, ToolPresence};
use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    OtherVersionManager,
    SystemRuntime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// One advisory finding from the detection phase. Never persisted, never
/// blocking.
#[derive(Debug, Clone)]
pub struct ConflictFinding {
    pub source: ConflictSource,
    pub severity: Severity,
    pub message: String,
}

/// Environment variables nvm leaves behind on either platform flavor.
const NVM_ENV_MARKERS: [&str; 3] = ["NVM_HOME", "NVM_SYMLINK", "NVM_DIR"];

fn nvm_install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    // nvm-windows defaults to %APPDATA%\nvm; the POSIX nvm lives in ~/.nvm.
    if let Some(data) = dirs::data_dir() {
        candidates.push(data.join("nvm"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".nvm"));
    }
    candidates
}

fn classify_alternate_manager(env_marker: Option<&str>, install_path: Option<PathBuf>) -> Option<ConflictFinding> {
    let evidence = match (env_marker, install_path) {
        (Some(marker), _) => format!("environment variable {marker} is set"),
        (None, Some(path)) => format!("{} exists", path.display()),
        (None, None) => return None,
    };
    Some(ConflictFinding {
        source: ConflictSource::OtherVersionManager,
        severity: Severity::Warning,
        message: format!(
            "Another Node.js version manager (nvm) appears to be installed ({evidence}). \
             fnm and nvm will fight over the active Node version; consider uninstalling nvm."
        ),
    })
}

/// Checks for a competing version manager without ever executing it.
pub fn detect_alternate_manager() -> Option<ConflictFinding> {
    let env_marker = NVM_ENV_MARKERS
        .iter()
        .copied()
        .find(|marker| env::var_os(marker).is_some());
    let install_path = nvm_install_candidates().into_iter().find(|path| path.exists());
    classify_alternate_manager(env_marker, install_path)
}

/// Checks for a system-wide Node.js install. Only meaningful while fnm itself
/// is absent: once fnm is present its shims shadow the system runtime and a
/// coexisting install is no longer a conflict.
pub fn detect_system_runtime(tool_present: bool) -> Option<ConflictFinding> {
    if tool_present {
        return None;
    }
    if !resolver::is_invocable("node") {
        return None;
    }
    let version = node_version().unwrap_or_else(|| "unknown version".to_string());
    Some(ConflictFinding {
        source: ConflictSource::SystemRuntime,
        severity: Severity::Warning,
        message: format!(
            "A system-wide Node.js ({version}) is already on PATH. It may shadow \
             fnm-managed versions in sessions that load it first; consider removing it \
             once fnm is set up."
        ),
    })
}

fn node_version() -> Option<String> {
    let output = Command::new("node").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

/// Runs the full detection phase and prints every finding once.
pub fn run(tool: &ToolPresence, reporter: &dyn Reporter) -> Vec<ConflictFinding> {
    reporter.info("Inspecting environment for existing Node.js tooling...");

    match (&tool.reported_version, &tool.resolved_path) {
        (Some(version), Some(path)) => {
            reporter.success(&format!("fnm {version} is already installed at {}", path.display()));
        }
        (Some(version), None) => reporter.success(&format!("fnm {version} is already installed")),
        _ if tool.present => reporter.success("fnm is already installed"),
        _ => reporter.info("fnm is not installed yet"),
    }

    let mut findings = Vec::new();
    if let Some(finding) = detect_alternate_manager() {
        findings.push(finding);
    }
    if let Some(finding) = detect_system_runtime(tool.present) {
        findings.push(finding);
    }

    for finding in &findings {
        match finding.severity {
            Severity::Warning => reporter.warn(&finding.message),
            Severity::Info => reporter.info(&finding.message),
        }
    }
    if findings.is_empty() {
        reporter.success("No conflicting Node.js tooling found");
    }
    log_debug!("[Detect] Detection phase produced {} finding(s)", findings.len());

    findings
}
