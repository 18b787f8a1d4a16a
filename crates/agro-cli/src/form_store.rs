//! Local persistence of the latest form values

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

use agro_core::{Error, FormDraft, Result};

/// Storage key the draft is saved under
pub const FORM_STORAGE_KEY: &str = "crop-yield-form";

/// Key-value JSON file holding the last edited form.
///
/// Only the latest draft is kept; every save overwrites it.
#[derive(Debug, Clone)]
pub struct FormStore {
    file_path: PathBuf,
}

impl FormStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Load the saved draft. A missing file or key yields `None`; a corrupt
    /// file is logged and ignored.
    pub async fn load(&self) -> Result<Option<FormDraft>> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(Error::Serialization(e)) => {
                tracing::warn!(path = %self.file_path.display(), error = %e, "ignoring unreadable saved form");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match entries.remove(FORM_STORAGE_KEY) {
            Some(value) => match serde_json::from_value(value) {
                Ok(draft) => Ok(Some(draft)),
                Err(e) => {
                    tracing::warn!(error = %e, "saved form has an unexpected shape");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Save the draft, replacing the previous one
    pub async fn save(&self, draft: &FormDraft) -> Result<()> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(FORM_STORAGE_KEY.to_string(), serde_json::to_value(draft)?);

        let json = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.file_path, json).await?;
        Ok(())
    }

    async fn read_entries(&self) -> Result<Map<String, Value>> {
        let content = match fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(Error::Serialization("saved form file is not a JSON object".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::Field;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FormStore::new(dir.path().join("form.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_latest() {
        let dir = TempDir::new().unwrap();
        let store = FormStore::new(dir.path().join("form.json"));

        let mut draft = FormDraft::default();
        draft.set(Field::Temperature, "25");
        store.save(&draft).await.unwrap();

        draft.set(Field::Temperature, "31.5");
        draft.set(Field::Humidity, "40");
        store.save(&draft).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(draft));
    }

    #[tokio::test]
    async fn test_other_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FormStore::new(&path);
        store.save(&FormDraft::default()).await.unwrap();

        let content: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["theme"], "dark");
        assert_eq!(content[FORM_STORAGE_KEY]["soil_type"], "loamy");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FormStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&FormDraft::default()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(FormDraft::default()));
    }
}
