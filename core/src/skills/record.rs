use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRecord {
    pub name: String,
    pub base_dir: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

/// Audit trail of loaded skills, mirrored to a single JSON file.
///
/// The whole mapping is rewritten after every change. There is no file
/// locking: concurrent processes race and the last writer wins.
pub struct LoadRecordStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, LoadRecord>>,
}

impl LoadRecordStore {
    /// Read the persisted mapping. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = read_records(&path).unwrap_or_default();

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert the record for `name`, then rewrite the file.
    pub fn record(&self, name: &str, base_dir: &Path) -> Result<LoadRecord> {
        let entry = LoadRecord {
            name: name.to_string(),
            base_dir: base_dir.to_path_buf(),
            loaded_at: Utc::now(),
        };

        let mut records = self.lock();
        records.insert(name.to_string(), entry.clone());
        self.persist(&records)?;

        Ok(entry)
    }

    pub fn get(&self, name: &str) -> Option<LoadRecord> {
        self.lock().get(name).cloned()
    }

    pub fn entries(&self) -> Vec<LoadRecord> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn persist(&self, records: &BTreeMap<String, LoadRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, LoadRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_records(path: &Path) -> Option<BTreeMap<String, LoadRecord>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(records) => Some(records),
        Err(e) => {
            tracing::debug!(path = %path.display(), "ignoring unreadable load records: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/loaded_skills.json");
        let base = tmp.path().join("skills/pdf");

        let store = LoadRecordStore::open(&path);
        assert!(store.is_empty());
        store.record("pdf", &base).unwrap();

        let reopened = LoadRecordStore::open(&path);
        let entry = reopened.get("pdf").unwrap();
        assert_eq!(entry.name, "pdf");
        assert_eq!(entry.base_dir, base);
    }

    #[test]
    fn record_overwrites_previous_entry() {
        let tmp = TempDir::new().unwrap();
        let store = LoadRecordStore::open(tmp.path().join("loaded.json"));

        let first = store.record("pdf", Path::new("/a/pdf")).unwrap();
        let second = store.record("pdf", Path::new("/b/pdf")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("pdf").unwrap().base_dir, PathBuf::from("/b/pdf"));
        assert!(second.loaded_at >= first.loaded_at);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("loaded.json");
        fs::write(&path, "{ not json").unwrap();

        let store = LoadRecordStore::open(&path);
        assert!(store.is_empty());

        store.record("docs", Path::new("/skills/docs")).unwrap();
        assert_eq!(LoadRecordStore::open(&path).len(), 1);
    }

    #[test]
    fn persisted_format_is_flat_camel_case_map() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("loaded.json");
        let store = LoadRecordStore::open(&path);
        store.record("pdf", Path::new("/skills/pdf")).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &value["pdf"];
        assert_eq!(entry["name"], "pdf");
        assert_eq!(entry["baseDir"], "/skills/pdf");
        assert!(entry["loadedAt"].is_string());
    }

    #[test]
    fn deleted_file_is_recreated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("loaded.json");
        let store = LoadRecordStore::open(&path);
        store.record("a", Path::new("/a")).unwrap();

        fs::remove_file(&path).unwrap();
        store.record("b", Path::new("/b")).unwrap();

        let reopened = LoadRecordStore::open(&path);
        assert_eq!(reopened.len(), 2);
    }
}
