//! FFmpeg process invocation
//!
//! Burns an ASS script into a video by running the external `ffmpeg`
//! binary. The call is awaited to completion; nothing is streamed back.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::EncoderConfig;
use crate::error::{BurnError, Result};
use crate::ffmpeg::filter::{subtitles_filter, to_forward_slashes};

/// Inputs and output of a single burn-in run. All paths should be absolute.
#[derive(Debug, Clone)]
pub struct BurnJob {
    pub video: PathBuf,
    pub ass: PathBuf,
    pub fonts_dir: PathBuf,
    pub output: PathBuf,
}

/// Runs ffmpeg with the configured codec settings
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn binary(&self) -> &str {
        &self.config.binary
    }

    /// Build the full argument list for a job.
    ///
    /// Input and output paths only get forward slashes; the paths inside
    /// the `-vf` expression are filter-escaped.
    pub fn command_args(&self, job: &BurnJob) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            to_forward_slashes(&job.video.to_string_lossy()),
            "-vf".to_string(),
            subtitles_filter(&job.ass, &job.fonts_dir),
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-c:a".to_string(),
            self.config.audio_codec.clone(),
            to_forward_slashes(&job.output.to_string_lossy()),
        ]
    }

    /// Run the encoder and check that it produced the output file.
    pub async fn run(&self, job: &BurnJob) -> Result<()> {
        let args = self.command_args(job);
        tracing::info!("Executing encoder: {} {}", self.config.binary, args.join(" "));

        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BurnError::EncoderSpawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        let output = match self.config.timeout_secs {
            Some(secs) => {
                let limit = Duration::from_secs(secs);
                // Dropping the future on timeout drops the child, which kills it.
                tokio::time::timeout(limit, child.wait_with_output())
                    .await
                    .map_err(|_| BurnError::EncoderTimeout(limit))??
            }
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = %output.status, "Encoder stderr: {}", stderr);
            tracing::debug!(
                "Encoder stdout: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            return Err(BurnError::EncoderFailed {
                status: output.status,
                stderr,
            });
        }

        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(BurnError::MissingOutput(job.output.clone()));
        }

        tracing::info!(output = %job.output.display(), "Burned video created");
        Ok(())
    }

    /// First line of `<binary> -version`
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| BurnError::EncoderSpawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BurnError::EncoderFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}
