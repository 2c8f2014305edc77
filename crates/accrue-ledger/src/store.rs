// crates/accrue-ledger/src/store.rs
//
// Snapshot persistence.
//
//   - `MemoryStore`: keeps the serialized JSON in memory. Used by tests and
//     embedders that persist elsewhere.
//   - `JsonFileStore`: one pretty-printed JSON document on disk, written to
//     `<path>.tmp` and renamed over the target so a crash mid-write never
//     leaves a torn file.
//
// Both run loaded documents through `snapshot::migrate`, so older schema
// versions are upgraded on read.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use accrue_core::AccrueError;

use crate::snapshot::{migrate, LedgerSnapshot};

/// Where ledger snapshots live.
pub trait StateStore: Send + Sync {
    /// Load the stored snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<LedgerSnapshot>, AccrueError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), AccrueError>;
}

/// In-memory snapshot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, AccrueError> {
        self.document
            .lock()
            .map_err(|_| AccrueError::Storage("memory store lock poisoned".to_string()))
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, AccrueError> {
        match self.lock()?.as_deref() {
            None => Ok(None),
            Some(json) => Ok(Some(migrate(serde_json::from_str(json)?)?)),
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), AccrueError> {
        let json = serde_json::to_string(snapshot)?;
        *self.lock()? = Some(json);
        Ok(())
    }
}

/// Snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, AccrueError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let snapshot = migrate(value)?;
        tracing::debug!("Loaded ledger snapshot from {}", self.path.display());
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), AccrueError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!("Saved ledger snapshot to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use accrue_core::AccountId;

    use crate::access::StaticRoles;
    use crate::config::LedgerConfig;
    use crate::ledger::RebasingLedger;

    #[test]
    fn test_memory_store_empty_then_saved() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let ledger = RebasingLedger::new(
            LedgerConfig::new(AccountId::repeat_byte(7)),
            Arc::new(StaticRoles::new()),
        )
        .unwrap();
        store.save(&ledger.snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(ledger.snapshot()));
    }

    #[test]
    fn test_tmp_path_appends_suffix() {
        let store = JsonFileStore::new("/var/lib/accrue/ledger.json");
        assert_eq!(store.tmp_path(), PathBuf::from("/var/lib/accrue/ledger.json.tmp"));
    }
}
