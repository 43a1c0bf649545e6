//! Profile file read/write with atomic replace and backup rotation.

use std::path::{Path, PathBuf};

use ambassador_core::ProfileDocument;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::ProfileError;

/// Number of rolling backups kept next to the profile file.
pub const DEFAULT_BACKUPS: usize = 3;

/// Owns the on-disk profile document for one configured creator.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    creator: String,
    backups: usize,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>, creator: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            creator: creator.into(),
            backups: DEFAULT_BACKUPS,
        }
    }

    pub fn with_backups(mut self, backups: usize) -> Self {
        self.backups = backups;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// The document substituted whenever the persisted one is unusable.
    pub fn default_document(&self) -> ProfileDocument {
        ProfileDocument::default_for(&self.creator)
    }

    /// Load the persisted document, degrading to the default on any failure.
    pub async fn load(&self) -> ProfileDocument {
        match self.try_load().await {
            Ok(doc) => doc,
            Err(ProfileError::NotFound(path)) => {
                info!(path = %path.display(), "Profile file not found; using default profile");
                self.default_document()
            }
            Err(e @ ProfileError::CreatorMismatch { .. }) => {
                warn!(path = %self.path.display(), error = %e, "Unauthorized profile changes detected; resetting to default");
                self.default_document()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Profile unreadable or corrupted; using default profile");
                self.default_document()
            }
        }
    }

    /// Load and verify the persisted document without any fallback.
    pub async fn try_load(&self) -> Result<ProfileDocument, ProfileError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProfileError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(ProfileError::Io { op: "read", path: self.path.clone(), source });
            }
        };

        let doc: ProfileDocument = serde_json::from_str(&raw)?;
        if doc.creator() != Some(self.creator.as_str()) {
            return Err(ProfileError::CreatorMismatch {
                expected: self.creator.clone(),
                found: doc.creator().map(str::to_string),
            });
        }

        debug!(path = %self.path.display(), fields = doc.len(), "Loaded profile");
        Ok(doc)
    }

    /// Persist the document, forcing `Creator` back to the configured identity.
    ///
    /// Writes a temp file then renames it over the target, so readers see
    /// either the old or the new document, never a partial one.
    pub async fn save(&self, doc: &mut ProfileDocument) -> Result<(), ProfileError> {
        doc.set_creator(&self.creator);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| ProfileError::Io {
                op: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if self.backups > 0 && fs::try_exists(&self.path).await.unwrap_or(false) {
            self.rotate_backups().await;
        }

        let json = doc.to_pretty_json()?;
        let tmp_path = self.sibling("tmp");
        fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|source| ProfileError::Io { op: "write", path: tmp_path.clone(), source })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| ProfileError::Io { op: "rename", path: self.path.clone(), source })?;

        info!(path = %self.path.display(), "Profile saved");
        Ok(())
    }

    /// my_info.json.bak.1 → .bak.2 → ... → .bak.N, then copy current to .bak.1
    async fn rotate_backups(&self) {
        for i in (1..self.backups).rev() {
            let old = self.sibling(&format!("bak.{i}"));
            let new = self.sibling(&format!("bak.{}", i + 1));
            if fs::try_exists(&old).await.unwrap_or(false) {
                if let Err(e) = fs::rename(&old, &new).await {
                    warn!("Failed to rotate profile backup {}: {}", old.display(), e);
                }
            }
        }

        let bak = self.sibling("bak.1");
        if let Err(e) = fs::copy(&self.path, &bak).await {
            warn!("Failed to create profile backup {}: {}", bak.display(), e);
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambassador_core::ProfileValue;

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join("my_info.json"), "Shreyash")
    }

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(store.try_load().await, Err(ProfileError::NotFound(_))));
        assert_eq!(store.load().await, store.default_document());
    }

    #[tokio::test]
    async fn corrupted_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.try_load().await, Err(ProfileError::Malformed(_))));
        assert_eq!(store.load().await, store.default_document());
    }

    #[tokio::test]
    async fn foreign_creator_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"Creator": "Mallory", "Name": "Mallory"}"#).unwrap();
        assert!(matches!(
            store.try_load().await,
            Err(ProfileError::CreatorMismatch { .. })
        ));
        assert_eq!(store.load().await.creator(), Some("Shreyash"));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut doc = store.load().await;
        doc.insert("DOB", ProfileValue::Scalar("02/05/2005".into()));
        store.save(&mut doc).await.unwrap();

        let reloaded = store.try_load().await.unwrap();
        assert_eq!(reloaded, doc);

        let mut again = reloaded.clone();
        store.save(&mut again).await.unwrap();
        assert_eq!(store.try_load().await.unwrap(), reloaded);
    }

    #[tokio::test]
    async fn save_forces_creator() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut doc = store.default_document();
        doc.insert("Creator", ProfileValue::Scalar("Mallory".into()));
        store.save(&mut doc).await.unwrap();
        assert_eq!(doc.creator(), Some("Shreyash"));
        assert_eq!(store.try_load().await.unwrap().creator(), Some("Shreyash"));
    }

    #[tokio::test]
    async fn save_rotates_backups() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).with_backups(2);
        let mut doc = store.default_document();
        for _ in 0..3 {
            store.save(&mut doc).await.unwrap();
        }
        assert!(dir.path().join("my_info.json.bak.1").exists());
        assert!(dir.path().join("my_info.json.bak.2").exists());
        assert!(!dir.path().join("my_info.json.bak.3").exists());
        assert!(!dir.path().join("my_info.json.tmp").exists());
    }

    #[tokio::test]
    async fn save_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let store = ProfileStore::new(blocker.join("my_info.json"), "Shreyash");
        let mut doc = store.default_document();
        assert!(matches!(store.save(&mut doc).await, Err(ProfileError::Io { .. })));
    }
}
