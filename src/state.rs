//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - The phonetic annotator and encoder shared by all requests
//! - In-flight burn jobs (for the debug endpoint)
//! - Metrics counters

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ffmpeg::Encoder;
use crate::metrics::Metrics;
use crate::subtitle::phonetic::{PhoneticAnnotator, PinyinAnnotator};

/// Processing stage of an in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Uploading,
    Converting,
    Encoding,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Uploading => "uploading",
            JobStage::Converting => "converting",
            JobStage::Encoding => "encoding",
        }
    }
}

/// An in-flight burn request
#[derive(Debug, Clone)]
pub struct JobInfo {
    pub request_id: String,
    pub video_filename: Option<String>,
    pub stage: JobStage,
    pub started_at: DateTime<Utc>,
}

/// Application state shared across all handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Text -> phonetic tokens
    pub annotator: Arc<dyn PhoneticAnnotator>,

    /// External encoder
    pub encoder: Encoder,

    /// In-flight jobs (request_id -> JobInfo)
    pub jobs: DashMap<String, JobInfo>,

    pub metrics: Metrics,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let annotator = Arc::new(PinyinAnnotator::new(config.phonetic.style));
        Self::with_annotator(config, annotator)
    }

    /// Create AppState with a custom annotator
    pub fn with_annotator(config: ServerConfig, annotator: Arc<dyn PhoneticAnnotator>) -> Self {
        Self {
            encoder: Encoder::new(config.encoder.clone()),
            annotator,
            jobs: DashMap::new(),
            metrics: Metrics::new(),
            config,
        }
    }

    /// Create AppState with default configuration
    #[cfg(test)]
    pub fn with_defaults() -> Self {
        Self::new(ServerConfig::default())
    }

    /// Upload directory as an absolute path
    pub fn upload_dir(&self) -> PathBuf {
        absolutize(&self.config.storage.upload_dir)
    }

    /// Font directory as an absolute path
    pub fn fonts_dir(&self) -> PathBuf {
        absolutize(&self.config.fonts.fonts_dir())
    }

    /// Track a new request until the returned guard is dropped
    pub fn begin_job(&self, request_id: &str) -> JobGuard<'_> {
        self.jobs.insert(
            request_id.to_string(),
            JobInfo {
                request_id: request_id.to_string(),
                video_filename: None,
                stage: JobStage::Uploading,
                started_at: Utc::now(),
            },
        );
        JobGuard {
            state: self,
            request_id: request_id.to_string(),
        }
    }

    /// Number of in-flight jobs
    pub fn active_job_count(&self) -> usize {
        self.jobs.len()
    }
}

/// Removes its job from [`AppState::jobs`] when dropped
pub struct JobGuard<'a> {
    state: &'a AppState,
    request_id: String,
}

impl JobGuard<'_> {
    pub fn set_stage(&self, stage: JobStage) {
        if let Some(mut job) = self.state.jobs.get_mut(&self.request_id) {
            job.stage = stage;
        }
    }

    pub fn set_video_filename(&self, name: &str) {
        if let Some(mut job) = self.state.jobs.get_mut(&self.request_id) {
            job.video_filename = Some(name.to_string());
        }
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.state.jobs.remove(&self.request_id);
    }
}

/// Resolve a path against the current directory
pub fn absolutize(path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let joined = cwd.join(path);
    // Drop `.` components so ffmpeg sees a clean path.
    joined
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
