use axum::body::Bytes;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "webm"];
const UPLOADS_DIR: &str = "uploads";
const VIDEOS_DIR: &str = "videos";

/// A file received with a review submission
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lower-cased extension of the client file name, if any
    fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
    }
}

/// Stores review media below the web root and hands out public paths
#[derive(Debug, Clone)]
pub struct MediaStorage {
    web_root: PathBuf,
}

impl MediaStorage {
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
        }
    }

    /// Directory served at `/uploads`
    pub fn uploads_dir(&self) -> PathBuf {
        self.web_root.join(UPLOADS_DIR)
    }

    /// Saves an image after checking its extension; empty uploads are ignored
    ///
    /// Uploads are served from the API origin, so only image extensions are
    /// ever written.
    pub async fn save_image(&self, file: &UploadedFile) -> AppResult<Option<String>> {
        if file.is_empty() {
            return Ok(None);
        }

        let extension = file
            .extension()
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::Validation(
                    "Invalid image format. Allowed: JPG, JPEG, PNG, GIF, WEBP".to_string(),
                )
            })?;

        self.write(&[UPLOADS_DIR], &extension, &file.data)
            .await
            .map(Some)
    }

    /// Saves a video after checking its extension and size
    pub async fn save_video(&self, file: &UploadedFile) -> AppResult<Option<String>> {
        if file.is_empty() {
            return Ok(None);
        }

        let extension = file
            .extension()
            .filter(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::Validation(
                    "Invalid video format. Allowed: MP4, AVI, MOV, WMV, WEBM".to_string(),
                )
            })?;

        if file.data.len() > MAX_VIDEO_BYTES {
            return Err(AppError::Validation(
                "Video file is too large. Maximum size is 50MB".to_string(),
            ));
        }

        self.write(&[UPLOADS_DIR, VIDEOS_DIR], &extension, &file.data)
            .await
            .map(Some)
    }

    /// Deletes the file behind a public path; missing files are not an error
    pub async fn remove(&self, public_path: &str) -> AppResult<()> {
        let Some(path) = self.resolve(public_path) else {
            tracing::warn!(path = %public_path, "Refusing to remove media outside the web root");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Maps `/uploads/...` back to a file below the web root
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.trim().trim_start_matches('/');
        if relative.is_empty() || relative.split(['/', '\\']).any(|part| part == "..") {
            return None;
        }
        Some(self.web_root.join(relative))
    }

    async fn write(&self, dirs: &[&str], extension: &str, data: &[u8]) -> AppResult<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        let dir = dirs.iter().fold(self.web_root.clone(), |acc, d| acc.join(d));
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), data).await?;

        let public_path = format!("/{}/{}", dirs.join("/"), file_name);
        tracing::debug!(path = %public_path, bytes = data.len(), "Saved media file");
        Ok(public_path)
    }
}
