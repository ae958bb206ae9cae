//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::subtitle::phonetic::PinyinStyle;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that receives uploads and generated files
    pub upload_dir: PathBuf,

    /// Keep uploads, the ASS script and the output after a request
    pub retain_artifacts: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./burn_service"),
            retain_artifacts: false,
        }
    }
}

/// Font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font file referenced by the ASS styles
    pub font_file: PathBuf,

    /// Directory handed to libass; defaults to the font file's directory
    pub font_dir: Option<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_file: PathBuf::from("./fonts/SourceHanSansSC-Bold.otf"),
            font_dir: None,
        }
    }
}

impl FontConfig {
    /// Directory ffmpeg should search for fonts
    pub fn fonts_dir(&self) -> PathBuf {
        match &self.font_dir {
            Some(dir) => dir.clone(),
            None => self
                .font_file
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Encoder (ffmpeg) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder executable, looked up in PATH when not absolute
    pub binary: String,

    /// Video codec for the re-encoded stream
    pub video_codec: String,

    /// Constant rate factor
    pub crf: u32,

    /// Encoder preset
    pub preset: String,

    /// Audio codec; `copy` passes the source audio through
    pub audio_codec: String,

    /// Kill the encoder after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            crf: 18,
            preset: "slow".to_string(),
            audio_codec: "copy".to_string(),
            timeout_secs: None,
        }
    }
}

/// Phonetic annotation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneticConfig {
    pub style: PinyinStyle,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Maximum request body size in megabytes
    pub max_upload_mb: usize,

    pub storage: StorageConfig,

    pub fonts: FontConfig,

    pub encoder: EncoderConfig,

    pub phonetic: PhoneticConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            max_upload_mb: 1024,
            storage: StorageConfig::default(),
            fonts: FontConfig::default(),
            encoder: EncoderConfig::default(),
            phonetic: PhoneticConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Maximum request body size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}
