use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tokio::sync::Mutex;

use super::json_file::{self, StoreResult};
use crate::vision::Gesture;

/// Charts keyed by sanitized song key, in insertion order.
pub type PatternMap = IndexMap<String, Vec<Gesture>>;

/// JSON-file store of generated gesture charts.
///
/// Charts are write-once: the first chart stored for a song key wins, so a
/// song always plays the same way it did the first time it was selected.
pub struct PatternStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PatternStore {
    /// Build a store over the given JSON file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored chart.
    pub async fn all(&self) -> PatternMap {
        json_file::load_or_default(&self.path).await
    }

    /// Load the chart for one song key.
    pub async fn get(&self, key: &str) -> Option<Vec<Gesture>> {
        self.all().await.swap_remove(key)
    }

    /// Store a chart unless one already exists for the key.
    ///
    /// Returns whether the chart was actually written.
    pub async fn ensure(&self, key: &str, pattern: Vec<Gesture>) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;

        let mut charts = self.all().await;
        if charts.contains_key(key) {
            return Ok(false);
        }

        charts.insert(key.to_owned(), pattern);
        json_file::persist(&self.path, &charts).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> PatternStore {
        PatternStore::new(dir.path().join("patterns.json"))
    }

    #[tokio::test]
    async fn stored_charts_survive_reload() {
        let dir = TempDir::new().unwrap();
        let chart = vec![Gesture::Fist, Gesture::Peace];

        let written = store_in(&dir).ensure("song", chart.clone()).await.unwrap();
        assert!(written);

        let reopened = store_in(&dir);
        assert_eq!(reopened.get("song").await, Some(chart));
    }

    #[tokio::test]
    async fn first_chart_wins() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let original = vec![Gesture::Fist];

        store.ensure("song", original.clone()).await.unwrap();
        let written = store.ensure("song", vec![Gesture::OpenHand]).await.unwrap();

        assert!(!written);
        assert_eq!(store.get("song").await, Some(original));
    }

    #[tokio::test]
    async fn unknown_key_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).get("missing").await, None);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_and_recovers_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns.json");
        std::fs::write(&path, b"][").unwrap();

        let store = store_in(&dir);
        assert!(store.all().await.is_empty());

        let written = store.ensure("song", vec![Gesture::Index]).await.unwrap();
        assert!(written);
        assert_eq!(store.get("song").await, Some(vec![Gesture::Index]));
    }
}
