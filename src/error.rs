use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Main error type for the burn service
#[derive(Error, Debug)]
pub enum BurnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Subtitle document is empty")]
    EmptySubtitle,

    #[error("No subtitle segments could be parsed")]
    NoSegments,

    #[error("No dialogue events were produced")]
    NoDialogue,

    #[error("Subtitle conversion failed: {0}")]
    Conversion(String),

    #[error("Phonetic annotation failed: {0}")]
    Phonetic(String),

    #[error("Failed to start encoder {binary}: {source}")]
    EncoderSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoder exited with {status}: {stderr}")]
    EncoderFailed { status: ExitStatus, stderr: String },

    #[error("Encoder timed out after {0:?}")]
    EncoderTimeout(Duration),

    #[error("Output video file was not created: {}", .0.display())]
    MissingOutput(PathBuf),
}

impl BurnError {
    /// True for failures of the SRT -> ASS conversion stage.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            BurnError::EmptySubtitle
                | BurnError::NoSegments
                | BurnError::NoDialogue
                | BurnError::Conversion(_)
        )
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            BurnError::Io(_) => "io",
            BurnError::Config(_) => "config",
            BurnError::InvalidTimestamp(_) => "invalid_timestamp",
            BurnError::EmptySubtitle
            | BurnError::NoSegments
            | BurnError::NoDialogue
            | BurnError::Conversion(_) => "conversion",
            BurnError::Phonetic(_) => "phonetic",
            BurnError::EncoderSpawn { .. } => "encoder_spawn",
            BurnError::EncoderFailed { .. } => "encoder",
            BurnError::EncoderTimeout(_) => "encoder_timeout",
            BurnError::MissingOutput(_) => "missing_output",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BurnError>;
