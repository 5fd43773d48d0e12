//! Upload storage.
//!
//! Uploaded workbooks live on disk under the configured directory, named
//! `{timestamp}_{id}_{original_name}` so an upload's id and metadata can
//! be recovered from a directory scan without a database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use bomline_utils::{BomlineError, BomlineResult, StorageConfig};

const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// A stored upload recovered from the storage directory.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub file_id: String,
    pub original_name: String,
    pub stored_path: PathBuf,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Disk-backed store for uploaded workbooks.
#[derive(Debug, Clone)]
pub struct UploadStore {
    config: StorageConfig,
}

impl UploadStore {
    pub fn new(config: StorageConfig) -> BomlineResult<Self> {
        fs::create_dir_all(&config.upload_dir)?;
        Ok(Self { config })
    }

    /// Validate and persist an upload; invalid files are not retained.
    pub fn save(&self, original_name: &str, data: &[u8]) -> BomlineResult<StoredFile> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(BomlineError::validation(
                "file",
                format!("invalid file type '.{extension}', allowed: .xlsx, .xls"),
            ));
        }
        if data.is_empty() {
            return Err(BomlineError::validation("file", "file is empty"));
        }
        if data.len() as u64 > self.config.max_file_size {
            return Err(BomlineError::validation(
                "file",
                format!(
                    "file too large: {} bytes > {} bytes",
                    data.len(),
                    self.config.max_file_size
                ),
            ));
        }

        let id = Uuid::new_v4().simple().to_string();
        let file_id = id[..8].to_string();
        let uploaded_at = Utc::now();
        let stored_name = format!(
            "{}_{}_{}",
            uploaded_at.format("%Y%m%d_%H%M%S"),
            file_id,
            original_name
        );
        let stored_path = self.config.upload_dir.join(&stored_name);

        fs::write(&stored_path, data)?;

        tracing::info!(
            file_id = %file_id,
            name = %original_name,
            size = data.len(),
            "upload stored"
        );

        Ok(StoredFile {
            file_id,
            original_name: original_name.to_string(),
            stored_path,
            file_size: data.len() as u64,
            uploaded_at,
        })
    }

    /// Find a stored upload by id via directory scan.
    pub fn find(&self, file_id: &str) -> BomlineResult<Option<StoredFile>> {
        for entry in fs::read_dir(&self.config.upload_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(stored) = parse_stored_name(&path) {
                if stored.file_id == file_id {
                    return Ok(Some(stored));
                }
            }
        }
        Ok(None)
    }

    /// All stored uploads, newest first.
    pub fn list(&self) -> BomlineResult<Vec<StoredFile>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.config.upload_dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(stored) = parse_stored_name(&path) {
                    files.push(stored);
                }
            }
        }
        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(files)
    }

    /// Remove uploads older than the configured retention window.
    /// Returns how many files were removed.
    pub fn cleanup(&self) -> BomlineResult<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(self.config.retention_days as i64);
        let mut removed = 0;
        for file in self.list()? {
            if file.uploaded_at < cutoff {
                fs::remove_file(&file.stored_path)?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "old uploads cleaned up");
        }
        Ok(removed)
    }
}

/// Recover upload metadata from a `{date}_{time}_{id}_{name}` filename.
fn parse_stored_name(path: &Path) -> Option<StoredFile> {
    let file_name = path.file_name()?.to_str()?;
    let extension = path.extension()?.to_str()?.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    let mut parts = file_name.splitn(4, '_');
    let date = parts.next()?;
    let time = parts.next()?;
    let file_id = parts.next()?;
    let original_name = parts.next()?;

    let uploaded_at = match chrono::NaiveDateTime::parse_from_str(
        &format!("{date}_{time}"),
        "%Y%m%d_%H%M%S",
    ) {
        Ok(naive) => naive.and_utc(),
        Err(_) => {
            let modified = path.metadata().ok()?.modified().ok()?;
            DateTime::<Utc>::from(modified)
        }
    };
    let file_size = path.metadata().ok()?.len();

    Some(StoredFile {
        file_id: file_id.to_string(),
        original_name: original_name.to_string(),
        stored_path: path.to_path_buf(),
        file_size,
        uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(StorageConfig {
            upload_dir: dir.to_path_buf(),
            max_file_size: 1024,
            retention_days: 7,
        })
        .unwrap()
    }

    #[test]
    fn save_then_find_round_trips_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let saved = store.save("bom.xlsx", b"data").unwrap();
        let found = store.find(&saved.file_id).unwrap().unwrap();

        assert_eq!(found.original_name, "bom.xlsx");
        assert_eq!(found.file_size, 4);
        assert!(found.stored_path.exists());
    }

    #[test]
    fn rejects_wrong_extension_empty_and_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(store.save("bom.pdf", b"data").is_err());
        assert!(store.save("bom.xlsx", b"").is_err());
        assert!(store.save("bom.xlsx", &[0u8; 2048]).is_err());

        // Nothing invalid is retained.
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.save("bom.xlsx", b"data").unwrap();
        assert!(store.find("ffffffff").unwrap().is_none());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn cleanup_keeps_recent_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.save("bom.xlsx", b"data").unwrap();
        assert_eq!(store.cleanup().unwrap(), 0);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
