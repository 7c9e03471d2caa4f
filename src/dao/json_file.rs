use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised while persisting a JSON store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The value could not be serialized.
    #[error("failed to serialize {}", path.display())]
    Serialize {
        /// Store file involved.
        path: PathBuf,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing or replacing the store file failed.
    #[error("failed to write {}", path.display())]
    Write {
        /// Store file involved.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Load a JSON store file, falling back to the default value.
///
/// A missing file is the normal first-run case and stays silent; an
/// unreadable or corrupt file is logged and treated as empty so the server
/// keeps running on whatever state it can.
pub async fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(err) => {
            warn!("failed to read {}: {err}", path.display());
            return T::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!("ignoring corrupt store file {}: {err}", path.display());
            T::default()
        }
    }
}

/// Persist a value as pretty JSON, replacing the file atomically.
///
/// The value is written to a uniquely named sibling first and renamed over
/// the target, so readers never observe a half-written file.
pub async fn persist<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store");
    let scratch = path.with_file_name(format!("{file_name}.{}.tmp", Uuid::new_v4()));

    let write_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(&scratch, &bytes).await.map_err(write_error)?;
    if let Err(source) = tokio::fs::rename(&scratch, path).await {
        let _ = tokio::fs::remove_file(&scratch).await;
        return Err(write_error(source));
    }

    debug!("persisted {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn persist_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");

        persist(&path, &vec![1u32, 2, 3]).await.unwrap();
        let loaded: Vec<u32> = load_or_default(&path).await;
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let loaded: Vec<u32> = load_or_default(&dir.path().join("absent.json")).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{not json").unwrap();

        let loaded: Vec<u32> = load_or_default(&path).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn persist_leaves_no_scratch_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        persist(&path, &vec![1u32]).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["values.json".to_owned()]);
    }
}
