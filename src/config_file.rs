//! Configuration file support
//!
//! Loads server configuration from sectioned TOML files. Every section
//! other than `[server]` may be omitted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{EncoderConfig, FontConfig, PhoneticConfig, ServerConfig, StorageConfig};
use crate::subtitle::phonetic::PinyinStyle;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Upload directory settings
    pub storage: Option<StorageSettings>,
    /// Font settings
    pub fonts: Option<FontSettings>,
    /// FFmpeg settings
    pub encoder: Option<EncoderSettings>,
    /// Pinyin rendering
    pub phonetic: Option<PhoneticSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Limits settings
    pub limits: Option<LimitsSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: Option<PathBuf>,
    pub retain_artifacts: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSettings {
    pub font_file: Option<PathBuf>,
    pub font_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// FFmpeg executable
    pub binary: Option<String>,
    pub video_codec: Option<String>,
    pub crf: Option<u32>,
    pub preset: Option<String>,
    pub audio_codec: Option<String>,
    /// Kill the encoder after this many seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneticSettings {
    /// tone, tone_number or plain
    pub style: Option<PinyinStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSettings {
    /// Maximum request body size in MB
    pub max_upload_mb: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = ServerConfig::default();
        Self {
            server: ServerSettings {
                host: defaults.host,
                port: defaults.port,
                cors_enabled: Some(defaults.cors_enabled),
            },
            storage: Some(StorageSettings {
                upload_dir: Some(defaults.storage.upload_dir),
                retain_artifacts: Some(defaults.storage.retain_artifacts),
            }),
            fonts: Some(FontSettings {
                font_file: Some(defaults.fonts.font_file),
                font_dir: defaults.fonts.font_dir,
            }),
            encoder: Some(EncoderSettings {
                binary: Some(defaults.encoder.binary),
                video_codec: Some(defaults.encoder.video_codec),
                crf: Some(defaults.encoder.crf),
                preset: Some(defaults.encoder.preset),
                audio_codec: Some(defaults.encoder.audio_codec),
                timeout_secs: defaults.encoder.timeout_secs,
            }),
            phonetic: Some(PhoneticSettings {
                style: Some(defaults.phonetic.style),
            }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
            limits: Some(LimitsSettings {
                max_upload_mb: Some(defaults.max_upload_mb),
            }),
        }
    }

    /// Convert to ServerConfig, filling gaps with defaults
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();

        let storage = match self.storage {
            Some(s) => StorageConfig {
                upload_dir: s.upload_dir.unwrap_or(defaults.storage.upload_dir),
                retain_artifacts: s
                    .retain_artifacts
                    .unwrap_or(defaults.storage.retain_artifacts),
            },
            None => defaults.storage,
        };

        let fonts = match self.fonts {
            Some(f) => FontConfig {
                font_file: f.font_file.unwrap_or(defaults.fonts.font_file),
                font_dir: f.font_dir,
            },
            None => defaults.fonts,
        };

        let encoder = match self.encoder {
            Some(e) => EncoderConfig {
                binary: e.binary.unwrap_or(defaults.encoder.binary),
                video_codec: e.video_codec.unwrap_or(defaults.encoder.video_codec),
                crf: e.crf.unwrap_or(defaults.encoder.crf),
                preset: e.preset.unwrap_or(defaults.encoder.preset),
                audio_codec: e.audio_codec.unwrap_or(defaults.encoder.audio_codec),
                timeout_secs: e.timeout_secs,
            },
            None => defaults.encoder,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            cors_enabled: self.server.cors_enabled.unwrap_or(defaults.cors_enabled),
            log_level,
            log_format,
            max_upload_mb: self
                .limits
                .and_then(|l| l.max_upload_mb)
                .unwrap_or(defaults.max_upload_mb),
            storage,
            fonts,
            encoder,
            phonetic: PhoneticConfig {
                style: self
                    .phonetic
                    .and_then(|p| p.style)
                    .unwrap_or(defaults.phonetic.style),
            },
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
