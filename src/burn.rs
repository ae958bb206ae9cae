//! Burn pipeline
//!
//! Per-request artifact naming, SRT -> ASS conversion, the encoder run and
//! read-back of the burned video. Every file a request touches is prefixed
//! with its request id, so concurrent requests never share a path.

use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ffmpeg::BurnJob;
use crate::state::{AppState, JobGuard, JobStage};
use crate::subtitle;

/// Fresh request identifier (uuid v4, simple hex form)
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Reduce a client-supplied filename to its final path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable
/// is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Which upload a stored file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRole {
    Video,
    Subtitle,
}

impl UploadRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadRole::Video => "video",
            UploadRole::Subtitle => "subtitle",
        }
    }
}

/// Files belonging to one request
#[derive(Debug, Clone)]
pub struct BurnArtifacts {
    pub request_id: String,
    pub video_filename: String,
    /// Uploaded video
    pub video: PathBuf,
    /// Uploaded subtitle
    pub subtitle: PathBuf,
    /// Generated ASS script
    pub ass: PathBuf,
    /// Burned output video
    pub output: PathBuf,
}

impl BurnArtifacts {
    pub fn new(
        upload_dir: &Path,
        request_id: &str,
        video_filename: &str,
        subtitle_filename: &str,
    ) -> Self {
        Self {
            request_id: request_id.to_string(),
            video_filename: video_filename.to_string(),
            video: Self::upload_path(upload_dir, request_id, UploadRole::Video, video_filename),
            subtitle: Self::upload_path(
                upload_dir,
                request_id,
                UploadRole::Subtitle,
                subtitle_filename,
            ),
            ass: upload_dir.join(format!("{}.ass", request_id)),
            output: upload_dir.join(format!("burned_{}_{}", request_id, video_filename)),
        }
    }

    /// Where an uploaded file is stored.
    ///
    /// The role is part of the name, so a video and a subtitle sharing a
    /// client filename never overwrite each other.
    pub fn upload_path(
        upload_dir: &Path,
        request_id: &str,
        role: UploadRole,
        filename: &str,
    ) -> PathBuf {
        upload_dir.join(format!("{}_{}_{}", request_id, role.as_str(), filename))
    }

    /// Filename offered to the client for the burned video
    pub fn output_filename(&self) -> String {
        format!("burned_{}_{}", self.request_id, self.video_filename)
    }

    pub fn paths(&self) -> [&Path; 4] {
        [
            self.video.as_path(),
            self.subtitle.as_path(),
            self.ass.as_path(),
            self.output.as_path(),
        ]
    }

    /// Remove whichever artifacts exist
    pub async fn cleanup(&self) {
        for path in self.paths() {
            remove_if_exists(path).await;
        }
    }
}

/// Remove a file, ignoring one that is not there
pub async fn remove_if_exists(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed artifact"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "Failed to remove artifact: {}", e),
    }
}

/// Convert, encode and read back the burned video.
///
/// The uploads must already be in place at `artifacts.video` and
/// `artifacts.subtitle`. No encoder is started when conversion fails.
pub async fn run(state: &AppState, job: &JobGuard<'_>, artifacts: &BurnArtifacts) -> Result<Bytes> {
    job.set_stage(JobStage::Converting);
    let report =
        subtitle::write_ass_file(&artifacts.subtitle, &artifacts.ass, state.annotator.as_ref())
            .await?;
    if report.skipped > 0 {
        state.metrics.record_skipped(report.skipped as u64);
    }
    tracing::info!(
        request_id = %artifacts.request_id,
        segments = report.segments,
        skipped = report.skipped,
        "Subtitle converted"
    );

    if let Some(parent) = artifacts.output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    job.set_stage(JobStage::Encoding);
    let burn = BurnJob {
        video: artifacts.video.clone(),
        ass: artifacts.ass.clone(),
        fonts_dir: state.fonts_dir(),
        output: artifacts.output.clone(),
    };
    state.encoder.run(&burn).await?;

    let data = tokio::fs::read(&artifacts.output).await?;
    Ok(Bytes::from(data))
}

/// [`run`], followed by artifact cleanup unless retention is configured.
pub async fn run_and_cleanup(
    state: &AppState,
    job: &JobGuard<'_>,
    artifacts: &BurnArtifacts,
) -> Result<Bytes> {
    let result = run(state, job, artifacts).await;
    if let Err(e) = &result {
        tracing::debug!(
            request_id = %artifacts.request_id,
            kind = e.kind(),
            "Burn pipeline failed: {}",
            e
        );
    }
    if !state.config.storage.retain_artifacts {
        artifacts.cleanup().await;
    }
    result
}

/// Content type for the returned video, by extension
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",
        _ => "application/octet-stream",
    }
}
