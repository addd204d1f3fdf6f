// The orchestrator: detection → (detect-only hard stop) → install-if-missing
// → per-shell configuration → optional Node version setup → final validation.
//
// Only two situations end a run with a failure code: the package manager is
// unavailable while fnm is absent, or fnm is still not invocable after an
// install attempt and a search-path refresh. Everything else (conflicting
// tooling, a failed profile reload, a failed activation) is advisory and the
// run completes with exit code 0.

use crate::installers::fnm::VersionManager;
use crate::installers::package_manager::{self, PackageInstaller};
use crate::libs::detection;
use crate::libs::mode::{ExecutionContext, ExecutionMode};
use crate::libs::reporter::Reporter;
use crate::libs::resolver::{self, ToolPresence};
use crate::libs::shells::{self, ShellPaths};
use crate::libs::store::KeyValueStore;
use crate::log_debug;

/// Everything the orchestrator talks to, injected so scenario tests can
/// substitute fakes for the external collaborators.
pub struct SetupDeps<'a> {
    pub reporter: &'a dyn Reporter,
    pub store: &'a mut dyn KeyValueStore,
    pub installer: &'a dyn PackageInstaller,
    pub manager: &'a dyn VersionManager,
    pub paths: ShellPaths,
}

/// Runs the full setup sequence and returns the process exit code.
pub fn run(ctx: &ExecutionContext, deps: &mut SetupDeps) -> i32 {
    log_debug!("[Setup] Starting run: mode {:?}, shells {:?}", ctx.mode, ctx.shells);

    // Step 1: read-only detection, findings printed once.
    let mut presence = deps.manager.presence();
    detection::run(&presence, deps.reporter);

    // Step 2: detect-only is a hard stop; zero mutations past this point.
    if !ctx.mode.should_apply() {
        for shell in &ctx.shells {
            let template = shells::template_for(*shell, &deps.paths);
            for line in shells::describe_targets(&template) {
                deps.reporter.info(&format!("Detected configuration target: {line}"));
            }
        }
        deps.reporter.info("Detect-only mode: nothing was installed or modified");
        return 0;
    }

    // A binary left at a fallback location by a partial prior run is present
    // but not spawnable by name; extend this process's search path so the
    // version operations and final validation below can reach it.
    make_invocable(&presence, ctx.mode, deps.reporter);

    // Step 3: make sure fnm exists. The package manager is the only install
    // path; without it the rest of the run is meaningless.
    if !presence.present {
        if !deps.installer.is_available() {
            deps.reporter.error(&format!(
                "fnm is not installed and {} is not available to install it. \
                 Install {} first, then re-run setup-fnm.",
                deps.installer.command(),
                deps.installer.command()
            ));
            return 1;
        }

        if ctx.mode.should_mutate() {
            deps.reporter.info(&format!(
                "Installing fnm via {}...",
                deps.installer.command()
            ));
            match deps.installer.install(package_manager::fnm_package_id()) {
                Ok(true) => deps.reporter.success("fnm installed"),
                Ok(false) => deps.reporter.warn(&format!(
                    "{} reported a failure while installing fnm",
                    deps.installer.command()
                )),
                Err(err) => deps.reporter.warn(&format!(
                    "Could not run {}: {err}",
                    deps.installer.command()
                )),
            }

            // The spawning shell's PATH predates the install; re-probe, which
            // also covers the well-known fallback locations, then extend the
            // in-process search path so the rest of this run can invoke fnm.
            presence = deps.manager.presence();
            make_invocable(&presence, ctx.mode, deps.reporter);
            if !presence.present {
                // The system mutation succeeded but the new binary is not
                // usable in this session. Recoverable by restart, not silent.
                deps.reporter.error(
                    "fnm was installed but is still not invocable in this session. \
                     Open a new terminal and re-run setup-fnm.",
                );
                return 1;
            }
        } else {
            deps.reporter.info(&format!(
                "Would install fnm ({}) via {}",
                package_manager::fnm_package_id(),
                deps.installer.command()
            ));
        }
    }

    // Step 4: wire each requested shell. Configuration failures are advisory;
    // the remaining shells still get their chance.
    for shell in &ctx.shells {
        let template = shells::template_for(*shell, &deps.paths);
        if let Err(err) = shells::configure_shell(&template, deps.store, ctx.mode, deps.reporter) {
            deps.reporter.warn(&format!(
                "Failed to configure {}: {err}. Fix the underlying issue and re-run setup-fnm.",
                shell.label()
            ));
        }
    }

    // Step 5: optional Node.js version setup. Install and default failures
    // are advisory; activation failure is the expected case (no configured
    // shell is running yet) and only worth an informational note.
    if let Some(version) = &ctx.node_version {
        if ctx.mode.should_mutate() {
            install_node_version(version, deps);
        } else {
            deps.reporter.info(&format!(
                "Would install Node.js {version}, set it as default, and activate it"
            ));
        }
    }

    // Step 6: final validation, never escalated to a process failure.
    let validated = deps.manager.presence();
    match validated.reported_version {
        Some(version) => deps.reporter.success(&format!(
            "fnm {version} is ready; new shell sessions will switch Node.js versions automatically"
        )),
        None if ctx.mode.should_mutate() => deps.reporter.warn(
            "Could not confirm the fnm version in this session. \
             Open a new terminal and run `fnm --version` to verify.",
        ),
        None => deps.reporter.info("Dry run complete; no changes were made"),
    }

    0
}

/// Extends the in-process search path when the tool resolved through a
/// fallback location rather than PATH. No-op for an absent tool or one that
/// is already spawnable by name.
fn make_invocable(presence: &ToolPresence, mode: ExecutionMode, reporter: &dyn Reporter) {
    if !presence.present || presence.on_search_path {
        return;
    }
    if let Some(dir) = presence.resolved_path.as_deref().and_then(|path| path.parent()) {
        resolver::extend_search_path(dir, mode, reporter);
    }
}

fn install_node_version(version: &str, deps: &mut SetupDeps) {
    deps.reporter.info(&format!("Installing Node.js {version} via fnm..."));
    match deps.manager.install(version) {
        Ok(true) => deps.reporter.success(&format!("Node.js {version} installed")),
        Ok(false) => deps.reporter.warn(&format!(
            "fnm could not install Node.js {version}; run `fnm install {version}` manually"
        )),
        Err(err) => deps.reporter.warn(&format!(
            "Could not run fnm install: {err}; run `fnm install {version}` manually"
        )),
    }

    match deps.manager.set_default(version) {
        Ok(true) => deps.reporter.success(&format!("Node.js {version} set as default")),
        Ok(false) => deps.reporter.warn(&format!(
            "fnm could not set Node.js {version} as default; run `fnm default {version}` manually"
        )),
        Err(err) => deps.reporter.warn(&format!("Could not run fnm default: {err}")),
    }

    match deps.manager.activate(version) {
        Ok(true) => deps.reporter.success(&format!("Node.js {version} active in this session")),
        // Expected: activation needs a shell that already evaluates the
        // activation snippet, and this one predates the configuration.
        Ok(false) => deps.reporter.info(&format!(
            "Node.js {version} could not be activated in this session; it will be active in new sessions"
        )),
        Err(err) => deps.reporter.info(&format!(
            "Could not activate Node.js {version} here ({err}); it will be active in new sessions"
        )),
    }
}
