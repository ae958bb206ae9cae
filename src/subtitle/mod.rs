//! Subtitle conversion module
//!
//! This module turns an uploaded SRT document into the ASS script that is
//! burned into the video:
//! - SRT block parsing with per-block skip outcomes
//! - SRT -> ASS timestamp normalization
//! - Pinyin annotation of caption text
//! - ASS document generation with an original and a pinyin track

pub mod ass;
pub mod phonetic;
pub mod srt;
pub mod timing;

use std::path::Path;

use crate::error::{BurnError, Result};
use crate::subtitle::ass::AssBuilder;
use crate::subtitle::phonetic::PhoneticAnnotator;

/// Summary of one SRT -> ASS conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Segments accepted by the parser
    pub segments: usize,
    /// Blocks rejected by the parser plus segments dropped by the builder
    pub skipped: usize,
    /// Dialogue lines written
    pub events: usize,
}

/// Convert an SRT document into a rendered ASS script and a report.
pub fn convert(
    content: &str,
    annotator: &dyn PhoneticAnnotator,
) -> Result<(String, ConversionReport)> {
    let (segments, skipped_blocks) = srt::collect_segments(srt::parse_blocks(content)?);
    if segments.is_empty() {
        return Err(BurnError::NoSegments);
    }

    let doc = AssBuilder::new(annotator).build(&segments)?;
    let report = ConversionReport {
        segments: segments.len(),
        skipped: skipped_blocks + segments.len() - doc.events.len() / 2,
        events: doc.events.len(),
    };
    tracing::debug!(
        segments = report.segments,
        skipped = report.skipped,
        events = report.events,
        "Converted SRT to ASS"
    );

    Ok((doc.render(), report))
}

/// Convert an SRT document into a rendered ASS script.
#[cfg(test)]
pub fn convert_srt_to_ass(content: &str, annotator: &dyn PhoneticAnnotator) -> Result<String> {
    convert(content, annotator).map(|(ass, _)| ass)
}

/// Read an SRT file, convert it, and write the ASS script to `ass_path`.
pub async fn write_ass_file(
    srt_path: &Path,
    ass_path: &Path,
    annotator: &dyn PhoneticAnnotator,
) -> Result<ConversionReport> {
    let raw = tokio::fs::read(srt_path).await?;
    let content = match String::from_utf8(raw) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %srt_path.display(), "Subtitle is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let (ass, report) = convert(&content, annotator)?;

    if let Some(parent) = ass_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(ass_path, ass.as_bytes()).await?;

    let written = tokio::fs::metadata(ass_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if written == 0 {
        return Err(BurnError::Conversion(format!(
            "ASS file was not written: {}",
            ass_path.display()
        )));
    }

    Ok(report)
}
