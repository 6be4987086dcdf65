use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::config::OmagServerConfig;
use crate::error::OmagError;

const CONFIG_SUFFIX: &str = ".config.json";

/// Persists server configuration documents, keyed by server name.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, server_name: &str) -> Result<Option<OmagServerConfig>, OmagError>;

    async fn save(&self, config: &OmagServerConfig) -> Result<(), OmagError>;

    /// Deleting an unknown server is not an error.
    async fn delete(&self, server_name: &str) -> Result<(), OmagError>;

    /// Names of every stored server, sorted.
    async fn list(&self) -> Result<Vec<String>, OmagError>;
}

/// One `<server>.config.json` document per server in a directory.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    directory: PathBuf,
}

impl FileConfigStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, server_name: &str) -> PathBuf {
        self.directory.join(format!("{server_name}{CONFIG_SUFFIX}"))
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> OmagError {
    OmagError::PropertyServer(format!("failed to {action} {}: {e}", path.display()))
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self, server_name: &str) -> Result<Option<OmagServerConfig>, OmagError> {
        let path = self.path_for(server_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    async fn save(&self, config: &OmagServerConfig) -> Result<(), OmagError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| io_error("create", &self.directory, e))?;
        let path = self.path_for(&config.local_server_name);
        let document = serde_json::to_vec_pretty(config)?;

        // Write a sibling file, then rename it over the document
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, document)
            .await
            .map_err(|e| io_error("write", &staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error("replace", &path, e))?;
        tracing::debug!(
            server = %config.local_server_name,
            path = %path.display(),
            "Configuration saved"
        );
        Ok(())
    }

    async fn delete(&self, server_name: &str) -> Result<(), OmagError> {
        let path = self.path_for(server_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", &path, e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, OmagError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &self.directory, e)),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", &self.directory, e))?
        {
            let file_name = entry.file_name();
            if let Some(name) = file_name
                .to_str()
                .and_then(|f| f.strip_suffix(CONFIG_SUFFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Keeps configuration documents in memory only.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: Mutex<BTreeMap<String, OmagServerConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn configs(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, OmagServerConfig>> {
        self.configs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self, server_name: &str) -> Result<Option<OmagServerConfig>, OmagError> {
        Ok(self.configs().get(server_name).cloned())
    }

    async fn save(&self, config: &OmagServerConfig) -> Result<(), OmagError> {
        self.configs()
            .insert(config.local_server_name.clone(), config.clone());
        Ok(())
    }

    async fn delete(&self, server_name: &str) -> Result<(), OmagError> {
        self.configs().remove(server_name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, OmagError> {
        Ok(self.configs().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("servers"));

        assert!(store.load("cocoMDS1").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());

        let mut config = OmagServerConfig::new("cocoMDS1");
        config.organization_name = Some("Coco Pharmaceuticals".into());
        store.save(&config).await.unwrap();
        store.save(&OmagServerConfig::new("cocoMDS2")).await.unwrap();

        let loaded = store.load("cocoMDS1").await.unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(store.list().await.unwrap(), vec!["cocoMDS1", "cocoMDS2"]);

        store.delete("cocoMDS1").await.unwrap();
        store.delete("cocoMDS1").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["cocoMDS2"]);
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.config.json"), b"{not json").unwrap();
        let store = FileConfigStore::new(dir.path());
        assert!(matches!(
            store.load("broken").await,
            Err(OmagError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryConfigStore::new();
        store.save(&OmagServerConfig::new("b")).await.unwrap();
        store.save(&OmagServerConfig::new("a")).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);
        store.delete("a").await.unwrap();
        assert!(store.load("a").await.unwrap().is_none());
    }
}
