use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageError;

use super::{KeyValueStore, StoredValues};

/// Durable store backed by a single JSON object file.
///
/// Every call re-reads the file, so separate processes (or reloaded pages)
/// observe each other's writes. A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let parsed: Value = serde_json::from_str(&content).map_err(|err| StorageError::Json {
            path: self.path.clone(),
            source: err,
        })?;
        match parsed {
            Value::Object(map) => Ok(map),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                Err(StorageError::NotAnObject {
                    path: self.path.clone(),
                })
            }
        }
    }

    async fn write_all(&self, map: Map<String, Value>) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(&Value::Object(map)).map_err(|err| StorageError::Json {
                path: self.path.clone(),
                source: err,
            })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::Io {
                    path: parent.to_path_buf(),
                    source: err,
                })?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|err| StorageError::Io {
                path: self.path.clone(),
                source: err,
            })
    }
}

#[async_trait(?Send)]
impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut map = self.read_all().await?;
        map.insert(key.to_owned(), value);
        self.write_all(map).await
    }

    async fn get(&self, keys: &[String]) -> Result<StoredValues, StorageError> {
        let mut map = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|key| map.remove(key).map(|value| (key.clone(), value)))
            .collect())
    }
}
