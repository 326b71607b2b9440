//! Wallet history kept between invocations

use anyhow::{Context, Result};
use common::HistoryEntry;
use std::fs;
use std::path::{Path, PathBuf};

const HISTORY_FILE: &str = "history.json";

/// JSON file of every history entry recorded so far
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries saved by earlier runs; none when the file does not exist yet
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history: {:?}", self.path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history: {:?}", self.path))
    }

    /// Replace the file with `entries`
    pub fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {:?}", dir))?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history: {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{utils, HistoryKind};
    use session::StateHandle;

    fn entry(kind: HistoryKind, name: &str, cost: f64) -> HistoryEntry {
        HistoryEntry {
            date: utils::now(),
            file_name: name.to_string(),
            file_cid: format!("bafy-{}", name),
            file_size: 2048,
            file_cost: cost,
            kind,
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(&dir.path().join("nested"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_history_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(&dir.path().join("client_data"));

        // first run buys a file
        let first = StateHandle::new();
        first.update(|s| s.record_history(HistoryKind::Buy, "ocean.mp4", "bafy1", 3 << 20, 3.0));
        store.save(&first.read(|s| s.history().to_vec())).unwrap();

        // second run starts empty, loads, then uploads
        let second = StateHandle::new();
        second.update(|s| s.restore_history(store.load().unwrap()));
        second.update(|s| s.record_history(HistoryKind::Uploaded, "notes.txt", "bafy2", 11, 1.0));
        store.save(&second.read(|s| s.history().to_vec())).unwrap();

        let saved = store.load().unwrap();
        let kinds: Vec<HistoryKind> = saved.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![HistoryKind::Buy, HistoryKind::Uploaded]);
        assert_eq!(saved[0].file_name, "ocean.mp4");
        assert_eq!(saved[0].file_cost, 3.0);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_err());

        store.save(&[entry(HistoryKind::Sell, "a.bin", 2.0)]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
