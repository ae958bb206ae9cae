//! Multipart upload handling
//!
//! Streams the `video_file` and `subtitle_file` fields straight to disk
//! under the request's id prefix.

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::burn::{remove_if_exists, sanitize_filename, BurnArtifacts, UploadRole};
use crate::error::BurnError;
use crate::http::handlers::HttpError;

pub const VIDEO_FIELD: &str = "video_file";
pub const SUBTITLE_FIELD: &str = "subtitle_file";

/// A file written to the upload directory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client filename reduced to its final component
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// State of one expected field after the body has been read
#[derive(Debug, Clone, Default)]
enum Slot {
    #[default]
    Missing,
    /// Present without a usable filename
    Unnamed,
    Saved(UploadedFile),
}

impl Slot {
    fn saved_path(&self) -> Option<&Path> {
        match self {
            Slot::Saved(file) => Some(&file.path),
            _ => None,
        }
    }
}

/// Both uploads of a burn request
#[derive(Debug, Clone)]
pub struct Uploads {
    pub video: UploadedFile,
    pub subtitle: UploadedFile,
}

/// Read the multipart body, saving the two expected files.
///
/// Anything already written is removed again when the request turns out
/// to be invalid.
pub async fn receive_uploads(
    mut multipart: Multipart,
    upload_dir: &Path,
    request_id: &str,
) -> Result<Uploads, HttpError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(BurnError::from)?;

    let mut video = Slot::Missing;
    let mut subtitle = Slot::Missing;

    let result = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::BadRequest(e.body_text()))?
        {
            let (role, slot) = match field.name() {
                Some(VIDEO_FIELD) => (UploadRole::Video, &mut video),
                Some(SUBTITLE_FIELD) => (UploadRole::Subtitle, &mut subtitle),
                _ => continue,
            };
            if !matches!(slot, Slot::Missing) {
                tracing::debug!("Ignoring duplicate upload field");
                continue;
            }

            let Some(filename) = field.file_name().and_then(sanitize_filename) else {
                *slot = Slot::Unnamed;
                continue;
            };
            let path = BurnArtifacts::upload_path(upload_dir, request_id, role, &filename);
            // Registered before writing so a failed write is cleaned up too.
            *slot = Slot::Saved(UploadedFile {
                filename,
                path: path.clone(),
                size: 0,
            });
            let size = save_field(field, &path).await?;
            if let Slot::Saved(file) = slot {
                file.size = size;
            }
        }
        Ok::<(), HttpError>(())
    }
    .await;

    let outcome = result.and_then(|()| match (&video, &subtitle) {
        (Slot::Missing, _) | (_, Slot::Missing) => Err(HttpError::BadRequest(
            "Missing video_file or subtitle_file".to_string(),
        )),
        (Slot::Saved(v), Slot::Saved(s)) => Ok(Uploads {
            video: v.clone(),
            subtitle: s.clone(),
        }),
        _ => Err(HttpError::BadRequest("No selected file".to_string())),
    });

    if outcome.is_err() {
        for path in [video.saved_path(), subtitle.saved_path()].into_iter().flatten() {
            remove_if_exists(path).await;
        }
    }

    outcome
}

async fn save_field(mut field: Field<'_>, path: &Path) -> Result<u64, HttpError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(BurnError::from)?;
    let mut size = 0u64;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| HttpError::BadRequest(e.body_text()))?
    {
        file.write_all(&chunk).await.map_err(BurnError::from)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(BurnError::from)?;

    tracing::debug!(path = %path.display(), size, "Saved upload");
    Ok(size)
}
