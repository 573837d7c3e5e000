use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::repository::StoredFile;

/// Allowed image extensions
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Allowed learning material extensions
const MATERIAL_EXTENSIONS: &[&str] = &["pdf", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Material,
}

impl UploadKind {
    fn subdir(&self) -> &'static str {
        match self {
            UploadKind::Image => "images",
            UploadKind::Material => "materials",
        }
    }

    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => IMAGE_EXTENSIONS,
            UploadKind::Material => MATERIAL_EXTENSIONS,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Material => "file",
        }
    }
}

/// A file received from a multipart form, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Stores uploads on the local filesystem under a single root directory.
/// Paths handed out are relative to the root, e.g. `materials/<uuid>.pdf`.
pub struct FileStore {
    root: PathBuf,
    max_file_size: usize,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, max_file_size: usize) -> Self {
        Self {
            root: root.into(),
            max_file_size,
        }
    }

    /// Validate and write an uploaded file, returning where it landed.
    pub async fn save(&self, kind: UploadKind, upload: &UploadedFile) -> Result<StoredFile> {
        if upload.data.is_empty() {
            return Err(AppError::Validation(format!("Uploaded {} is empty", kind.label())));
        }

        if upload.data.len() > self.max_file_size {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size: {}MB",
                self.max_file_size / 1024 / 1024
            )));
        }

        let extension = file_extension(&upload.file_name).ok_or_else(|| {
            AppError::Validation("Invalid filename".to_string())
        })?;

        if !kind.allowed_extensions().contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid {} type. Allowed: {}",
                kind.label(),
                kind.allowed_extensions().join(", ")
            )));
        }

        let dir = self.root.join(kind.subdir());
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create uploads directory: {}", e))
        })?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let mut file = fs::File::create(dir.join(&stored_name)).await.map_err(|e| {
            AppError::Internal(format!("Failed to create file: {}", e))
        })?;

        file.write_all(&upload.data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;
        file.flush().await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;

        Ok(StoredFile {
            path: format!("{}/{}", kind.subdir(), stored_name),
            file_name: original_name(&upload.file_name),
            size: upload.data.len() as i64,
        })
    }

    /// Absolute location of a stored file, or `None` for paths this store
    /// never produced.
    pub fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        let relative = Path::new(stored_path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));

        if stored_path.is_empty() || !is_plain {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Delete a stored file. Missing files are not an error.
    pub async fn delete(&self, stored_path: &str) -> Result<()> {
        let Some(path) = self.resolve(stored_path) else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {}", e))),
        }
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

// Browsers may send full client paths; keep only the last segment.
fn original_name(file_name: &str) -> String {
    file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(max: usize) -> (FileStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("courseboard-uploads-{}", Uuid::new_v4()));
        (FileStore::new(root.clone(), max), root)
    }

    fn upload(name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn saves_material_under_its_subdirectory() {
        let (store, root) = temp_store(1024);

        let stored = store
            .save(UploadKind::Material, &upload("notes/Week 1.PDF", b"%PDF-1.4"))
            .await
            .unwrap();

        assert!(stored.path.starts_with("materials/"));
        assert!(stored.path.ends_with(".pdf"));
        assert_eq!(stored.file_name, "Week 1.PDF");
        assert_eq!(stored.size, 8);
        assert!(store.resolve(&stored.path).unwrap().exists());

        store.delete(&stored.path).await.unwrap();
        assert!(!store.resolve(&stored.path).unwrap().exists());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn rejects_wrong_type_for_kind() {
        let (store, _) = temp_store(1024);

        let err = store
            .save(UploadKind::Image, &upload("slides.pdf", b"data"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = store
            .save(UploadKind::Material, &upload("README", b"data"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let (store, _) = temp_store(4);

        let err = store
            .save(UploadKind::Material, &upload("big.txt", b"12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn resolve_refuses_paths_outside_the_root() {
        let (store, _) = temp_store(1);

        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("").is_none());
        assert!(store.resolve("images/a.png").is_some());
    }

    #[tokio::test]
    async fn deleting_missing_file_is_ok() {
        let (store, _) = temp_store(1);
        store.delete("images/missing.png").await.unwrap();
    }
}
