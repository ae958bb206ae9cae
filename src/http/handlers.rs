//! HTTP request handlers
//!
//! Implements the burn endpoint plus health, version and debug endpoints.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::burn::{self, BurnArtifacts};
use crate::error::BurnError;
use crate::http::upload::receive_uploads;
use crate::state::AppState;

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Conversion(String),
    Encoder(String),
    Timeout(String),
    Internal(String),
}

impl HttpError {
    /// Label used for the error metrics
    pub fn kind(&self) -> &'static str {
        match self {
            HttpError::BadRequest(_) => "bad_request",
            HttpError::Conversion(_) => "conversion",
            HttpError::Encoder(_) => "encoder",
            HttpError::Timeout(_) => "encoder_timeout",
            HttpError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            HttpError::Conversion(_) | HttpError::Encoder(_) | HttpError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::Conversion(msg)
            | HttpError::Encoder(msg)
            | HttpError::Timeout(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

impl From<BurnError> for HttpError {
    fn from(err: BurnError) -> Self {
        match err {
            e if e.is_conversion() => {
                tracing::error!("Subtitle conversion failed: {}", e);
                HttpError::Conversion("Failed to convert SRT to ASS".to_string())
            }
            BurnError::EncoderFailed { stderr, .. } => {
                HttpError::Encoder(format!("FFmpeg failed: {}", stderr))
            }
            e @ BurnError::EncoderTimeout(_) => HttpError::Timeout(e.to_string()),
            e => HttpError::Internal(e.to_string()),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "encoder": state.encoder.binary(),
    }))
}

/// Burn endpoint
/// POST /burn_subtitle (multipart: video_file, subtitle_file)
pub async fn burn_subtitle(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpError> {
    state.metrics.record_request();
    let request_id = burn::new_request_id();

    let result = process_burn(&state, &request_id, multipart).await;
    match &result {
        Ok(response) => {
            tracing::info!(request_id = %request_id, status = %response.status(), "Burn completed");
        }
        Err(e) => {
            state.metrics.record_error(e.kind());
            tracing::warn!(request_id = %request_id, kind = e.kind(), "Burn failed: {}", e.message());
        }
    }
    result
}

async fn process_burn(
    state: &AppState,
    request_id: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Multipart rejected: {}", e);
        HttpError::BadRequest("Missing video_file or subtitle_file".to_string())
    })?;

    let job = state.begin_job(request_id);
    let upload_dir = state.upload_dir();
    let uploads = receive_uploads(multipart, &upload_dir, request_id).await?;
    job.set_video_filename(&uploads.video.filename);
    tracing::info!(
        request_id = %request_id,
        video = %uploads.video.filename,
        video_bytes = uploads.video.size,
        subtitle = %uploads.subtitle.filename,
        subtitle_bytes = uploads.subtitle.size,
        "Received uploads"
    );

    let artifacts = BurnArtifacts::new(
        &upload_dir,
        request_id,
        &uploads.video.filename,
        &uploads.subtitle.filename,
    );
    let data = burn::run_and_cleanup(state, &job, &artifacts).await?;
    state.metrics.record_completed(data.len() as u64);

    let filename = artifacts.output_filename();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(burn::content_type_for(&filename)),
    );
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((StatusCode::OK, headers, data).into_response())
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Debug endpoint - in-flight burn jobs
pub async fn active_jobs(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let now = chrono::Utc::now();
    let jobs: Vec<_> = state
        .jobs
        .iter()
        .map(|r| {
            serde_json::json!({
                "request_id": r.request_id,
                "video_filename": r.video_filename,
                "stage": r.stage.as_str(),
                "started_at": r.started_at.to_rfc3339(),
                "elapsed_secs": (now - r.started_at).num_milliseconds() as f64 / 1000.0,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": state.active_job_count(),
        "jobs": jobs,
    }))
}
