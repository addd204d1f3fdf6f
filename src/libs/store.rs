// Persistent key-value store backing the cmd.exe AutoRun registration.
//
// On Windows the real store is the per-user registry key
// `HKCU\Software\Microsoft\Command Processor`, whose `AutoRun` value cmd.exe
// executes for every new instance. On other platforms (and in tests) the same
// contract is served by a small JSON map on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::log_debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A registry-like persistent map. Reads of absent keys yield `None`; writes
/// replace the whole value at the key (merge policy lives in the mutators,
/// not here).
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Human-readable location, for status messages.
    fn describe(&self) -> String;
}

/// JSON-file-backed store. One flat map of string keys to string values.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore { path }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        log_debug!("[Store] Writing '{}' to {}", key, self.path.display());
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The per-user Command Processor key that cmd.exe consults on startup.
#[cfg(windows)]
pub struct CommandProcessorStore;

#[cfg(windows)]
const COMMAND_PROCESSOR_SUBKEY: &str = r"Software\Microsoft\Command Processor";

#[cfg(windows)]
impl KeyValueStore for CommandProcessorStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let subkey = match hkcu.open_subkey_with_flags(COMMAND_PROCESSOR_SUBKEY, KEY_READ) {
            Ok(subkey) => subkey,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match subkey.get_value::<String, _>(key) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (subkey, _) = hkcu.create_subkey(COMMAND_PROCESSOR_SUBKEY)?;
        subkey.set_value(key, &value)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(r"HKCU\{COMMAND_PROCESSOR_SUBKEY}")
    }
}

/// The store the real orchestrator uses on this platform.
pub fn platform_store(home: &std::path::Path) -> Box<dyn KeyValueStore> {
    #[cfg(windows)]
    {
        let _ = home;
        Box::new(CommandProcessorStore)
    }
    #[cfg(not(windows))]
    {
        Box::new(FileStore::new(home.join(".setup-fnm").join("autorun.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore};

    #[test]
    fn absent_key_reads_as_none() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileStore::new(dir.path().join("autorun.json"));
        assert!(store.read("AutoRun").expect("read").is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("nested").join("autorun.json"));
        store.write("AutoRun", r"C:\Users\dev\fnm_autorun.cmd").expect("write");
        assert_eq!(
            store.read("AutoRun").expect("read").as_deref(),
            Some(r"C:\Users\dev\fnm_autorun.cmd")
        );
    }

    #[test]
    fn writes_preserve_other_keys() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileStore::new(dir.path().join("autorun.json"));
        store.write("AutoRun", "first").expect("write");
        store.write("Other", "second").expect("write");
        assert_eq!(store.read("AutoRun").expect("read").as_deref(), Some("first"));
        assert_eq!(store.read("Other").expect("read").as_deref(), Some("second"));
    }
}
