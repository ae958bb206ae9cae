//! Test fixtures for integration tests
//!
//! Provides SRT documents, multipart request bodies and isolated server
//! state without real media files.

use axum::body::Body;
use axum::http::{header, Request};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::ServerConfig;
use crate::state::AppState;

pub const BOUNDARY: &str = "burn-test-boundary";

/// A subtitle document with what a conversion should make of it
#[derive(Debug, Clone)]
pub struct SrtFixture {
    pub name: &'static str,
    pub content: &'static str,
    pub expected_segments: usize,
    pub expected_skipped: usize,
}

impl SrtFixture {
    /// One well-formed caption
    pub fn single() -> Self {
        Self {
            name: "single",
            content: "1\n00:00:01,000 --> 00:00:03,000\n你好\n\n",
            expected_segments: 1,
            expected_skipped: 0,
        }
    }

    /// Windows line endings, a BOM and a two-line caption
    pub fn crlf_multiline() -> Self {
        Self {
            name: "crlf_multiline",
            content: "\u{feff}1\r\n00:00:01,000 --> 00:00:02,500\r\n我们\r\n走吧\r\n\r\n\
                      2\r\n00:00:03,000 --> 00:00:04,000\r\n好\r\n",
            expected_segments: 2,
            expected_skipped: 0,
        }
    }

    /// Broken blocks surrounded by good ones
    pub fn partially_broken() -> Self {
        Self {
            name: "partially_broken",
            content: "1\n00:00:01,000 --> 00:00:02,000\n一\n\n\
                      2\n00:00:02\n二\n\n\
                      3\n\n\
                      4\n00:00:04,000 --> 00:00:05,000\n四\n",
            expected_segments: 2,
            expected_skipped: 2,
        }
    }

    /// Nothing a parser can use
    pub fn garbage() -> Self {
        Self {
            name: "garbage",
            content: "this is not\na subtitle file\n",
            expected_segments: 0,
            expected_skipped: 1,
        }
    }

    pub fn all_valid() -> Vec<Self> {
        vec![Self::single(), Self::crlf_multiline(), Self::partially_broken()]
    }
}

/// One part of a multipart/form-data body
#[derive(Debug, Clone)]
pub struct Part {
    pub name: &'static str,
    pub filename: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn file(name: &'static str, filename: &'static str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            filename: Some(filename),
            data: data.into(),
        }
    }

    pub fn text(name: &'static str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            filename: None,
            data: data.into(),
        }
    }
}

/// Encode parts as a multipart/form-data body
pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST /burn_subtitle with the given parts
pub fn burn_request(parts: &[Part]) -> Request<Body> {
    Request::post("/burn_subtitle")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// The usual video + subtitle pair
pub fn burn_parts(subtitle: &str) -> Vec<Part> {
    vec![
        Part::file("video_file", "clip.mp4", b"not really a video".to_vec()),
        Part::file("subtitle_file", "subs.srt", subtitle.as_bytes().to_vec()),
    ]
}

/// Stand-in encoder: copies the `-i` input to the last argument.
#[cfg(unix)]
const COPY_ENCODER_SCRIPT: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "copy-encoder version 1"
    exit 0
fi
input=""
prev=""
last=""
for arg in "$@"; do
    if [ "$prev" = "-i" ]; then
        input="$arg"
    fi
    prev="$arg"
    last="$arg"
done
cp "$input" "$last"
"#;

/// Write the copy encoder into `dir` and return its path.
///
/// Runs it once with `-version`, retrying while the freshly written file
/// is still busy (ETXTBSY), so the server never sees that error.
#[cfg(unix)]
pub fn write_copy_encoder(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("copy-encoder");
    std::fs::write(&path, COPY_ENCODER_SCRIPT).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..50 {
        match std::process::Command::new(&path).arg("-version").output() {
            Ok(output) if output.status.success() => return path,
            Err(e) if e.raw_os_error() == Some(26) => {
                std::thread::sleep(std::time::Duration::from_millis(20));
            }
            other => panic!("copy encoder unusable: {:?}", other),
        }
    }
    panic!("copy encoder stayed busy");
}

/// Server state writing into its own temporary directory
pub struct TestServer {
    pub dir: TempDir,
    pub state: Arc<AppState>,
}

impl TestServer {
    /// `encoder` replaces the ffmpeg binary
    pub fn new(encoder: &str) -> Self {
        Self::with_config(encoder, |_| {})
    }

    pub fn with_config(encoder: &str, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        Self::build(tempfile::tempdir().unwrap(), encoder, adjust)
    }

    /// Server whose encoder copies the video through unchanged
    #[cfg(unix)]
    pub fn with_copy_encoder() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let encoder = write_copy_encoder(dir.path());
        Self::build(dir, &encoder.to_string_lossy(), |_| {})
    }

    fn build(dir: TempDir, encoder: &str, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let mut config = ServerConfig::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.fonts.font_dir = Some(dir.path().join("fonts"));
        config.encoder.binary = encoder.to_string();
        adjust(&mut config);

        Self {
            dir,
            state: Arc::new(AppState::new(config)),
        }
    }

    pub fn router(&self) -> axum::Router {
        crate::http::create_router(self.state.clone())
    }

    /// Files left in the upload directory
    pub fn leftover_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.state.upload_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
