//! Screenshot hosting.
//!
//! Tickets reference the screenshot by URL. When a host is configured the
//! image is uploaded there; otherwise, or when the upload fails, the image is
//! embedded as a `data:` URL.

pub mod imgbb;

pub use imgbb::ImgbbHost;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image types accepted for analysis.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Error, Debug)]
pub enum HostingError {
    #[error("Failed to read screenshot at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported image type: {0}. Allowed types: png, jpeg, gif, webp")]
    UnsupportedType(String),

    #[error("Upload request failed: {0}")]
    Request(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

/// An uploaded screenshot held in memory for the lifetime of its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ScreenshotUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Read an image file, rejecting extensions outside [`ALLOWED_EXTENSIONS`].
    pub async fn from_path(path: &Path) -> Result<Self, HostingError> {
        let mime_type = mime_type_for_path(path).ok_or_else(|| {
            HostingError::UnsupportedType(
                path.extension()
                    .and_then(std::ffi::OsStr::to_str)
                    .unwrap_or("<none>")
                    .to_string(),
            )
        })?;

        let bytes = tokio::fs::read(path).await.map_err(|source| HostingError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
            file_name: path
                .file_name()
                .and_then(std::ffi::OsStr::to_str)
                .map(str::to_string),
        })
    }

    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

/// Media type for an allowed image extension.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload the image and return its public URL.
    async fn upload(&self, image: &ScreenshotUpload) -> Result<String, HostingError>;
}

/// Public URL of the screenshot, or a `data:` URL when hosting is unavailable.
///
/// Never fails: a hosting error only downgrades the result to the embedded form.
pub async fn host_or_embed(host: Option<&dyn ImageHost>, image: &ScreenshotUpload) -> String {
    let Some(host) = host else {
        tracing::debug!("No image host configured, embedding screenshot as data URL");
        return image.data_url();
    };

    match host.upload(image).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "Screenshot upload failed, falling back to data URL");
            image.data_url()
        }
    }
}
