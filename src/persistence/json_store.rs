use super::PersistenceGateway;
use crate::config::PersistenceConfig;
use crate::transform::settings::TransformSettings;
use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RECORD_FILE: &str = "settings.json";
const PREFERENCE_FILE: &str = "preference.json";

/// The persistence preference under its own key, mirroring the
/// `persistSettings` storage key the popup writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceRecord {
    persist_settings: bool,
}

/// JSON-file-backed gateway. One file per key: the flat
/// `{angle, zoom, fill, panX, panY}` record and the boolean preference.
pub struct JsonFileStore {
    record_path: PathBuf,
    preference_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> Self {
        let dir = storage_dir.as_ref();
        Self {
            record_path: dir.join(RECORD_FILE),
            preference_path: dir.join(PREFERENCE_FILE),
        }
    }

    /// Resolves the storage directory from config, falling back to the
    /// platform data directory.
    pub fn from_config(config: &PersistenceConfig) -> Self {
        let dir = config.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("video-overlay")
        });
        Self::new(dir)
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_file(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl PersistenceGateway for JsonFileStore {
    async fn save(&self, settings: &TransformSettings) -> Result<()> {
        Self::write_json(&self.record_path, settings).await
    }

    async fn load(&self) -> Result<Option<TransformSettings>> {
        Self::read_json(&self.record_path).await
    }

    async fn clear(&self) -> Result<()> {
        Self::remove_file(&self.record_path).await
    }

    async fn save_preference(&self, enabled: bool) -> Result<()> {
        let record = PreferenceRecord {
            persist_settings: enabled,
        };
        Self::write_json(&self.preference_path, &record).await
    }

    async fn load_preference(&self) -> Result<Option<bool>> {
        let record: Option<PreferenceRecord> = Self::read_json(&self.preference_path).await?;
        Ok(record.map(|r| r.persist_settings))
    }
}
