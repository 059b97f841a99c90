use crate::error::AppError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Camera,
    File,
}

/// Photo chosen by the user, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
    pub format: ImageFormat,
    pub source: CaptureSource,
}

/// Wrap bytes handed over by the camera or file input. Only image media is
/// accepted; the type is sniffed from the content, not the name.
pub fn captured_from_bytes(
    file_name: Option<String>,
    bytes: Vec<u8>,
    source: CaptureSource,
) -> Result<CapturedImage, AppError> {
    if bytes.is_empty() {
        return Err(AppError::input("selected file is empty"));
    }

    let format = image::guess_format(&bytes)
        .map_err(|_| AppError::input("selected file is not a supported image"))?;

    let file_name = file_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_file_name(format, source));

    tracing::debug!(
        file = %file_name,
        size = bytes.len(),
        format = ?format,
        source = ?source,
        "Image captured"
    );

    Ok(CapturedImage {
        mime: format.to_mime_type(),
        bytes,
        file_name,
        format,
        source,
    })
}

/// Read a picked file from disk.
pub async fn captured_from_path(path: &Path, source: CaptureSource) -> Result<CapturedImage, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::input(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string());
    captured_from_bytes(file_name, bytes, source)
}

fn default_file_name(format: ImageFormat, source: CaptureSource) -> String {
    let stem = match source {
        CaptureSource::Camera => "camera",
        CaptureSource::File => "upload",
    };
    let ext = format.extensions_str().first().copied().unwrap_or("img");
    format!("{}.{}", stem, ext)
}
