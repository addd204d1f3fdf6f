// Execution mode and the per-invocation context.
//
// The mode is threaded through every mutating operation and decides whether an
// action is performed, only described, or entirely skipped. The context is
// constructed once from the CLI and passed to every component that needs it;
// there is no ambient global state.

use crate::libs::shells::ShellKind;

/// How far a run is allowed to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Perform every mutation and report success or failure.
    Apply,
    /// Compute and report every mutation that would happen, but write nothing.
    DryRun,
    /// Pure inspection. The run terminates right after the detection phase.
    DetectOnly,
}

impl ExecutionMode {
    /// Whether the run proceeds past the detection phase at all.
    ///
    /// `DetectOnly` stops the orchestrator cold; `Apply` and `DryRun` both
    /// walk the full sequence (one for real, one on paper).
    pub fn should_apply(self) -> bool {
        !matches!(self, ExecutionMode::DetectOnly)
    }

    /// Whether mutating primitives actually touch external state.
    /// Only `Apply` does; `DryRun` takes the describe-instead-of-write branch.
    pub fn should_mutate(self) -> bool {
        matches!(self, ExecutionMode::Apply)
    }
}

/// Everything one invocation needs to know, immutable after construction.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Shells to configure. Never empty (clap supplies the full set by default).
    pub shells: Vec<ShellKind>,
    pub mode: ExecutionMode,
    /// Optional Node.js version to install once fnm is set up, e.g. "22",
    /// "lts" or "latest".
    pub node_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ExecutionMode;

    #[test]
    fn apply_proceeds_and_mutates() {
        assert!(ExecutionMode::Apply.should_apply());
        assert!(ExecutionMode::Apply.should_mutate());
    }

    #[test]
    fn dry_run_proceeds_without_mutating() {
        assert!(ExecutionMode::DryRun.should_apply());
        assert!(!ExecutionMode::DryRun.should_mutate());
    }

    #[test]
    fn detect_only_neither_proceeds_nor_mutates() {
        assert!(!ExecutionMode::DetectOnly.should_apply());
        assert!(!ExecutionMode::DetectOnly.should_mutate());
    }
}
