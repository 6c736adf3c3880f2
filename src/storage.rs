use crate::error::{storage_error, ClientResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Storage key constants
pub mod keys {
    pub const AUTH_TOKEN: &str = "token";
    pub const SELECTED_COURSE: &str = "selected_course_id";
}

/// Persistent string key-value storage, the device-local store of the client
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> ClientResult<()>;
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// In-memory store, used by tests and when no storage path is wanted
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        self.data.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.data.lock().await.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// Every write replaces the whole file through a temp file and rename; the lock serializes
/// writers within the process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> ClientResult<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                storage_error(&format!("Failed to parse {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, data: &HashMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        // A crash mid-write leaves only the sibling file torn
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_all().await?;
        data.insert(key.to_string(), value);
        self.write_all(&data).await
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_all().await?;
        if data.remove(key).is_some() {
            self.write_all(&data).await?;
        }
        Ok(())
    }
}
