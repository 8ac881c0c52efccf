// SPDX-License-Identifier: MPL-2.0

//! Storage for captured check-in photos
//!
//! Saving to disk stands in for the upload sink: the payload is written as
//! is, with a timestamped filename, into the configured photo directory.

use crate::errors::{AppError, AppResult};
use crate::surface::ImagePayload;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default folder name for saving photos
const DEFAULT_SAVE_FOLDER: &str = "FaceCapture";

/// Get default photo directory
pub fn default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}

/// Filename for a payload: `CHECKIN_<timestamp>_<id prefix>.<ext>`
pub fn payload_filename(payload: &ImagePayload) -> String {
    let id = payload.id.simple().to_string();
    format!(
        "CHECKIN_{}_{}.{}",
        payload.captured_at.format("%Y%m%d_%H%M%S"),
        &id[..8],
        payload.format.extension()
    )
}

/// Save a payload into `output_dir`, creating the directory if needed
pub async fn save_payload(payload: ImagePayload, output_dir: PathBuf) -> AppResult<PathBuf> {
    let filepath = output_dir.join(payload_filename(&payload));

    info!(path = %filepath.display(), size = payload.data.len(), "Saving check-in photo");

    // Write to disk in background task (I/O-bound)
    let filepath_clone = filepath.clone();
    tokio::task::spawn_blocking(move || write_payload(&payload, &filepath_clone))
        .await
        .map_err(|e| AppError::Storage(format!("Save task error: {}", e)))??;

    info!(path = %filepath.display(), "Photo saved successfully");
    Ok(filepath)
}

/// Save a payload to an exact path
pub async fn save_payload_to(payload: ImagePayload, path: PathBuf) -> AppResult<PathBuf> {
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_payload(&payload, &target))
        .await
        .map_err(|e| AppError::Storage(format!("Save task error: {}", e)))??;
    Ok(path)
}

fn write_payload(payload: &ImagePayload, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, &payload.data[..])
        .map_err(|e| AppError::Storage(format!("Failed to save photo: {}", e)))?;
    debug!(path = %path.display(), "Payload written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::EncodingFormat;
    use std::sync::Arc;

    fn payload() -> ImagePayload {
        ImagePayload {
            id: uuid::Uuid::new_v4(),
            data: Arc::from(vec![0xFF, 0xD8, 0xFF, 0xD9]),
            width: 2,
            height: 2,
            format: EncodingFormat::Jpeg,
            captured_at: chrono::Local::now(),
        }
    }

    #[test]
    fn test_filename_shape() {
        let name = payload_filename(&payload());
        assert!(name.starts_with("CHECKIN_"));
        assert!(name.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("nested").join("photos");

        let path = save_payload(payload(), target.clone()).await.expect("saved");
        assert!(path.starts_with(&target));
        assert_eq!(std::fs::read(&path).expect("read back"), vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }
}
