//! End-to-end integration tests

use axum::http::{header, StatusCode};
use tower::util::ServiceExt;

use crate::integration::fixtures::{burn_parts, burn_request, Part, SrtFixture, TestServer};
use crate::subtitle::{self, phonetic::PinyinAnnotator};

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn dialogue_lines(ass: &str) -> Vec<&str> {
    ass.lines().filter(|l| l.starts_with("Dialogue:")).collect()
}

#[test]
fn test_single_caption_produces_two_tracks() {
    let ass =
        subtitle::convert_srt_to_ass(SrtFixture::single().content, &PinyinAnnotator::default())
            .unwrap();

    assert!(ass.starts_with("[Script Info]"));
    assert!(ass.contains("PlayResX: 480"));
    assert!(ass.contains("PlayResY: 848"));
    assert!(ass.contains("Style: Default,"));
    assert!(ass.contains("Style: Pinyin,"));
    assert_eq!(
        dialogue_lines(&ass),
        vec![
            "Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,你好",
            "Dialogue: 0,0:00:01.00,0:00:03.00,Pinyin,,0,0,0,,nǐ hǎo",
        ]
    );
}

#[test]
fn test_fixture_reports() {
    let annotator = PinyinAnnotator::default();
    for fixture in SrtFixture::all_valid() {
        let (ass, report) = subtitle::convert(fixture.content, &annotator).unwrap();
        assert_eq!(report.segments, fixture.expected_segments, "{}", fixture.name);
        assert_eq!(report.skipped, fixture.expected_skipped, "{}", fixture.name);
        assert_eq!(
            dialogue_lines(&ass).len(),
            2 * fixture.expected_segments,
            "{}",
            fixture.name
        );
    }
}

#[test]
fn test_tracks_share_timing() {
    let ass = subtitle::convert_srt_to_ass(
        SrtFixture::crlf_multiline().content,
        &PinyinAnnotator::default(),
    )
    .unwrap();

    let lines = dialogue_lines(&ass);
    for pair in lines.chunks(2) {
        let timing = |line: &str| line.split(',').skip(1).take(2).collect::<Vec<_>>().join(",");
        assert_eq!(timing(pair[0]), timing(pair[1]));
        assert!(pair[0].contains(",Default,"));
        assert!(pair[1].contains(",Pinyin,"));
    }
    assert!(lines[0].ends_with(",,我们 走吧"));
    assert!(lines[0].contains("0:00:02.50"));
}

#[test]
fn test_conversion_is_deterministic() {
    let annotator = PinyinAnnotator::default();
    let content = SrtFixture::partially_broken().content;
    let first = subtitle::convert_srt_to_ass(content, &annotator).unwrap();
    let second = subtitle::convert_srt_to_ass(content, &annotator).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_garbage_has_no_segments() {
    let fixture = SrtFixture::garbage();
    let err = subtitle::convert(fixture.content, &PinyinAnnotator::default()).unwrap_err();
    assert!(err.is_conversion());
}

#[tokio::test]
async fn test_missing_subtitle_field() {
    let server = TestServer::new("true");
    let request = burn_request(&[Part::file("video_file", "clip.mp4", b"v".to_vec())]);

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Missing video_file or subtitle_file"
    );
    assert!(server.leftover_files().is_empty());
    assert_eq!(server.state.metrics.error_count("bad_request"), 1);
}

#[tokio::test]
async fn test_empty_filename_is_rejected() {
    let server = TestServer::new("true");
    let request = burn_request(&[
        Part::file("video_file", "", b"v".to_vec()),
        Part::file("subtitle_file", "subs.srt", SrtFixture::single().content),
    ]);

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No selected file");
    assert!(server.leftover_files().is_empty());
}

#[tokio::test]
async fn test_non_multipart_request() {
    let server = TestServer::new("true");
    let request = axum::http::Request::post("/burn_subtitle")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparsable_subtitle_returns_conversion_error() {
    // Never reached: conversion fails first.
    let server = TestServer::new("/nonexistent/ffmpeg-binary");
    let mut parts = burn_parts(SrtFixture::garbage().content);
    parts.push(Part::text("comment", "ignored"));

    let response = server.router().oneshot(burn_request(&parts)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "Failed to convert SRT to ASS"
    );
    assert!(server.leftover_files().is_empty());
    assert_eq!(server.state.metrics.error_count("conversion"), 1);
    assert_eq!(server.state.active_job_count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_encoder_without_output() {
    let server = TestServer::new("true");
    let request = burn_request(&burn_parts(SrtFixture::single().content));

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.contains("not created"), "{}", error);
    assert!(server.leftover_files().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_encoder_keeps_retained_artifacts() {
    let server = TestServer::with_config("false", |config| {
        config.storage.retain_artifacts = true;
    });
    let request = burn_request(&burn_parts(SrtFixture::single().content));

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.starts_with("FFmpeg failed"), "{}", error);

    let files = server.leftover_files();
    assert_eq!(files.len(), 3, "{:?}", files);
    assert!(files.iter().any(|f| f.ends_with("_clip.mp4")));
    assert!(files.iter().any(|f| f.ends_with("_subs.srt")));
    assert!(files.iter().any(|f| f.ends_with(".ass")));

    let ass_file = files.iter().find(|f| f.ends_with(".ass")).unwrap();
    let ass = std::fs::read_to_string(server.state.upload_dir().join(ass_file)).unwrap();
    assert!(ass.contains("Pinyin,,0,0,0,,nǐ hǎo"));
    assert_eq!(server.state.metrics.error_count("encoder"), 1);
}

#[tokio::test]
async fn test_uploaded_path_components_are_stripped() {
    let server = TestServer::with_config("/nonexistent/ffmpeg-binary", |config| {
        config.storage.retain_artifacts = true;
    });
    let request = burn_request(&[
        Part::file("video_file", "../../escape.mp4", b"v".to_vec()),
        Part::file("subtitle_file", "subs.srt", SrtFixture::single().content),
    ]);

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server
        .leftover_files()
        .iter()
        .any(|f| f.ends_with("_escape.mp4")));
    assert!(!server.dir.path().join("escape.mp4").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_burn_returns_video() {
    let server = TestServer::with_copy_encoder();
    let request = burn_request(&burn_parts(SrtFixture::single().content));

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"burned_"), "{}", disposition);
    assert!(disposition.contains("_clip.mp4\""), "{}", disposition);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"not really a video");

    assert!(server.leftover_files().is_empty());
    assert_eq!(server.state.active_job_count(), 0);
    let metrics = server.state.metrics.render();
    assert!(metrics.contains("burn_completed_total 1"), "{}", metrics);
}

#[cfg(unix)]
#[tokio::test]
async fn test_same_filename_for_both_uploads() {
    let server = TestServer::with_copy_encoder();
    let request = burn_request(&[
        Part::file("video_file", "same.bin", b"video bytes".to_vec()),
        Part::file("subtitle_file", "same.bin", SrtFixture::single().content),
    ]);

    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"video bytes");
    assert!(server.leftover_files().is_empty());
}
