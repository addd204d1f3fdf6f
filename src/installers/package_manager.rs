//! # System Package Manager
//!
//! Black-box wrapper around the platform package manager used to install the
//! fnm binary itself: winget on Windows, Homebrew elsewhere. The orchestrator
//! only ever asks two questions ("are you invocable?" and "install this
//! identifier") and treats everything past that as opaque.

use std::io;
use std::process::Command;

use crate::libs::resolver;
use crate::{log_debug, log_info};

/// The interface the orchestrator needs from a package manager. A trait so
/// scenario tests can swap in a fake collaborator.
pub trait PackageInstaller {
    /// Command name, for user-facing remedial messages.
    fn command(&self) -> &str;
    /// Whether the package manager is invocable on the current search path.
    fn is_available(&self) -> bool;
    /// Installs the package identified by `package_id`. Returns whether the
    /// installer reported success.
    fn install(&self, package_id: &str) -> io::Result<bool>;
}

/// The platform identifier fnm is published under.
pub fn fnm_package_id() -> &'static str {
    if cfg!(windows) { "Schniz.fnm" } else { "fnm" }
}

/// winget on Windows, brew everywhere else.
pub struct SystemPackageManager;

impl SystemPackageManager {
    fn command_name() -> &'static str {
        if cfg!(windows) { "winget" } else { "brew" }
    }

    fn install_args(package_id: &str) -> Vec<&str> {
        if cfg!(windows) {
            vec![
                "install",
                "--exact",
                "--id",
                package_id,
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements",
            ]
        } else {
            vec!["install", package_id]
        }
    }
}

impl PackageInstaller for SystemPackageManager {
    fn command(&self) -> &str {
        Self::command_name()
    }

    fn is_available(&self) -> bool {
        resolver::is_invocable(Self::command_name())
    }

    fn install(&self, package_id: &str) -> io::Result<bool> {
        let args = Self::install_args(package_id);
        log_info!(
            "[Install] Running {} {}",
            Self::command_name(),
            args.join(" ")
        );
        let status = Command::new(Self::command_name()).args(&args).status()?;
        log_debug!("[Install] {} exited with {status}", Self::command_name());
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::SystemPackageManager;

    #[test]
    fn install_args_name_the_package() {
        let args = SystemPackageManager::install_args("fnm-id");
        assert!(args.contains(&"install"));
        assert!(args.contains(&"fnm-id"));
    }
}
