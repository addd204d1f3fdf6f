// The idempotent mutation primitives every shell configurator is built from.
//
// Each primitive follows the same shape: inspect current external state,
// no-op when the desired content is already there, and otherwise either
// perform the write (Apply) or describe it (DryRun). Running any of them
// twice leaves the external state identical to running them once.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::libs::mode::ExecutionMode;
use crate::libs::reporter::Reporter;
use crate::libs::store::{KeyValueStore, StoreError};
use crate::log_debug;

/// What a primitive did (or would have done).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Desired content was already there; external state untouched.
    AlreadyPresent,
    /// The mutation was performed.
    Applied,
    /// Dry run: the mutation was described instead of performed.
    WouldApply,
}

/// Ensures `line` occurs in the file at `path`, appending it if absent.
///
/// A missing file reads as empty content, not an error. The presence check is
/// a literal substring match against the whole file: two snippets differing
/// only in flag order are distinct lines, and re-running after a flag change
/// appends the new variant rather than replacing the old one. That matches
/// how every shell treats its own startup file and is accepted behavior, not
/// something this function second-guesses.
pub fn ensure_line_in_file(
    path: &Path,
    line: &str,
    mode: ExecutionMode,
    reporter: &dyn Reporter,
) -> io::Result<EnsureOutcome> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    if existing.contains(line) {
        reporter.info(&format!("{} is already configured", path.display()));
        return Ok(EnsureOutcome::AlreadyPresent);
    }

    if !mode.should_mutate() {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                reporter.info(&format!("Would create directory {}", parent.display()));
            }
        }
        if !path.exists() {
            reporter.info(&format!("Would create {}", path.display()));
        }
        reporter.info(&format!("Would append to {}: {line}", path.display()));
        return Ok(EnsureOutcome::WouldApply);
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            log_debug!("[Mutate] Creating parent directory {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // Keep the appended line on its own line even when the file does not end
    // with a newline.
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{line}")?;
    reporter.success(&format!("Added activation line to {}", path.display()));
    Ok(EnsureOutcome::Applied)
}

/// Ensures the file at `path` holds exactly `content`, rewriting it only when
/// the current content differs. Used for synthesized launcher scripts.
pub fn ensure_file_content(
    path: &Path,
    content: &str,
    mode: ExecutionMode,
    reporter: &dyn Reporter,
) -> io::Result<EnsureOutcome> {
    if path.exists() && fs::read_to_string(path)? == content {
        reporter.info(&format!("{} is already up to date", path.display()));
        return Ok(EnsureOutcome::AlreadyPresent);
    }

    if !mode.should_mutate() {
        reporter.info(&format!("Would write launcher script {}", path.display()));
        return Ok(EnsureOutcome::WouldApply);
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    reporter.success(&format!("Wrote launcher script {}", path.display()));
    Ok(EnsureOutcome::Applied)
}

/// Ensures `value` is present at `key` in the store.
///
/// Absent or empty values are set directly. A current value equal to, or
/// containing, `value` is left alone. Anything else gets `value` appended
/// behind `delimiter`, preserving every prior entry. Merge, never overwrite.
///
/// The containment check is a plain substring test: a path that happens to be
/// a substring of an unrelated registered entry would be misread as already
/// present. Known limitation, kept as-is.
pub fn ensure_value_in_store(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &str,
    delimiter: &str,
    mode: ExecutionMode,
    reporter: &dyn Reporter,
) -> Result<EnsureOutcome, StoreError> {
    let current = store.read(key)?.unwrap_or_default();

    if !current.is_empty() && (current == value || current.contains(value)) {
        reporter.info(&format!("{key} in {} already references {value}", store.describe()));
        return Ok(EnsureOutcome::AlreadyPresent);
    }

    if !mode.should_mutate() {
        if current.is_empty() {
            reporter.info(&format!("Would set {key} in {} to: {value}", store.describe()));
        } else {
            reporter.info(&format!(
                "Would merge {value} into existing {key} in {} (keeping \"{current}\")",
                store.describe()
            ));
        }
        return Ok(EnsureOutcome::WouldApply);
    }

    if current.is_empty() {
        store.write(key, value)?;
        reporter.success(&format!("Set {key} in {}", store.describe()));
    } else {
        let merged = format!("{current}{delimiter}{value}");
        store.write(key, &merged)?;
        reporter.success(&format!("Merged {value} into {key} in {}", store.describe()));
    }
    Ok(EnsureOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{EnsureOutcome, ensure_file_content, ensure_line_in_file, ensure_value_in_store};
    use crate::libs::mode::ExecutionMode;
    use crate::libs::reporter::Reporter;
    use crate::libs::store::{FileStore, KeyValueStore};

    struct Silent;

    impl Reporter for Silent {
        fn info(&self, _message: &str) {}
        fn success(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, _message: &str) {}
    }

    const LINE: &str = r#"eval "$(fnm env --use-on-cd)""#;

    #[test]
    fn creates_missing_file_and_parent_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("profile").join(".bashrc");

        let outcome =
            ensure_line_in_file(&path, LINE, ExecutionMode::Apply, &Silent).expect("ensure");

        assert_eq!(outcome, EnsureOutcome::Applied);
        assert_eq!(fs::read_to_string(&path).expect("read"), format!("{LINE}\n"));
    }

    #[test]
    fn file_containing_line_is_left_byte_identical() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".bashrc");
        let original = format!("# prelude\n{LINE}\nexport FOO=1\n");
        fs::write(&path, &original).expect("seed file");

        let outcome =
            ensure_line_in_file(&path, LINE, ExecutionMode::Apply, &Silent).expect("ensure");

        assert_eq!(outcome, EnsureOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(&path).expect("read"), original);
    }

    #[test]
    fn appends_on_its_own_line_when_file_lacks_trailing_newline() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".bashrc");
        fs::write(&path, "export FOO=1").expect("seed file");

        ensure_line_in_file(&path, LINE, ExecutionMode::Apply, &Silent).expect("ensure");

        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            format!("export FOO=1\n{LINE}\n")
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("profile").join(".bashrc");

        let outcome =
            ensure_line_in_file(&path, LINE, ExecutionMode::DryRun, &Silent).expect("ensure");

        assert_eq!(outcome, EnsureOutcome::WouldApply);
        assert!(!path.exists());
        assert!(!dir.path().join("profile").exists());
    }

    #[test]
    fn launcher_script_rewritten_only_when_content_differs() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fnm_autorun.cmd");

        let first = ensure_file_content(&path, "@echo off\r\n", ExecutionMode::Apply, &Silent)
            .expect("write");
        assert_eq!(first, EnsureOutcome::Applied);

        let second = ensure_file_content(&path, "@echo off\r\n", ExecutionMode::Apply, &Silent)
            .expect("re-run");
        assert_eq!(second, EnsureOutcome::AlreadyPresent);

        let changed = ensure_file_content(&path, "@echo on\r\n", ExecutionMode::Apply, &Silent)
            .expect("rewrite");
        assert_eq!(changed, EnsureOutcome::Applied);
        assert_eq!(fs::read_to_string(&path).expect("read"), "@echo on\r\n");
    }

    #[test]
    fn store_merge_keeps_prior_entries() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("autorun.json"));
        store.write("AutoRun", "X").expect("seed");

        let outcome = ensure_value_in_store(
            &mut store,
            "AutoRun",
            "Y",
            " & ",
            ExecutionMode::Apply,
            &Silent,
        )
        .expect("merge");

        assert_eq!(outcome, EnsureOutcome::Applied);
        assert_eq!(store.read("AutoRun").expect("read").as_deref(), Some("X & Y"));
    }

    #[test]
    fn store_value_already_exact_is_untouched() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("autorun.json"));
        store.write("AutoRun", "X").expect("seed");

        let outcome = ensure_value_in_store(
            &mut store,
            "AutoRun",
            "X",
            " & ",
            ExecutionMode::Apply,
            &Silent,
        )
        .expect("no-op");

        assert_eq!(outcome, EnsureOutcome::AlreadyPresent);
        assert_eq!(store.read("AutoRun").expect("read").as_deref(), Some("X"));
    }

    #[test]
    fn store_empty_value_is_set_directly() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("autorun.json"));

        let outcome = ensure_value_in_store(
            &mut store,
            "AutoRun",
            "X",
            " & ",
            ExecutionMode::Apply,
            &Silent,
        )
        .expect("set");

        assert_eq!(outcome, EnsureOutcome::Applied);
        assert_eq!(store.read("AutoRun").expect("read").as_deref(), Some("X"));
    }

    #[test]
    fn store_dry_run_never_writes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("autorun.json"));
        store.write("AutoRun", "X").expect("seed");

        let outcome = ensure_value_in_store(
            &mut store,
            "AutoRun",
            "Y",
            " & ",
            ExecutionMode::DryRun,
            &Silent,
        )
        .expect("dry run");

        assert_eq!(outcome, EnsureOutcome::WouldApply);
        assert_eq!(store.read("AutoRun").expect("read").as_deref(), Some("X"));
    }
}
