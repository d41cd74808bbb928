//! Photo uploads: allow-list, size limit and data-URL preview

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use tracing::debug;

use crate::registration::error::PhotoError;

/// 5 MiB.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A selected photo file: its name, declared MIME type and content.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl PhotoUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn has_accepted_type(&self) -> bool {
        ACCEPTED_IMAGE_TYPES.contains(&self.content_type.as_str())
    }

    pub fn within_size_limit(&self) -> bool {
        self.size() <= MAX_PHOTO_BYTES
    }

    /// File extension used when storing the photo.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/jpeg" | "image/jpg" => "jpg",
            _ => "bin",
        }
    }

    /// Data-URL encoding of the photo. Consumes the upload, so a preview can
    /// only be produced once per selection. An empty file yields an empty
    /// payload.
    pub async fn preview(self) -> String {
        let PhotoUpload {
            file_name,
            content_type,
            data,
        } = self;

        let encoded = STANDARD.encode(&data);
        debug!("Encoded preview for '{}' ({} chars)", file_name, encoded.len());
        format!("data:{};base64,{}", content_type, encoded)
    }
}

/// Reads a photo from disk, guessing its MIME type from the extension.
pub async fn read_photo(path: impl AsRef<Path>) -> Result<PhotoUpload, PhotoError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data = tokio::fs::read(path)
        .await
        .map_err(|source| PhotoError::UnreadableFile {
            name: path.display().to_string(),
            source,
        })?;

    Ok(PhotoUpload::new(file_name, content_type_for(path), data))
}

/// Reads the file at `path` and returns its data-URL preview.
pub async fn preview_photo(path: impl AsRef<Path>) -> Result<String, PhotoError> {
    Ok(read_photo(path).await?.preview().await)
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
