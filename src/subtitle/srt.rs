//! SubRip (SRT) parser
//!
//! Splits a document into blank-line separated blocks and turns each block
//! into a [`SubtitleSegment`]. A bad block never fails the whole document;
//! it becomes a [`BlockOutcome::Skipped`] and parsing moves on.

use crate::error::{BurnError, Result};
use crate::subtitle::timing::{parse_time_range, Timestamp};

/// One timed caption from the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleSegment {
    /// Ordinal from the block's first line, or the 1-based block position
    /// when that line is not a number. Not used downstream.
    pub index: u32,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Caption lines joined with a single space
    pub text: String,
}

/// Why a block was not turned into a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewLines(usize),
    InvalidTiming(String),
    EmptyText,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SkipReason::TooFewLines(n) => write!(f, "expected at least 3 lines, found {}", n),
            SkipReason::InvalidTiming(msg) => write!(f, "invalid time range: {}", msg),
            SkipReason::EmptyText => write!(f, "empty caption text"),
        }
    }
}

/// Result of parsing a single block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Segment(SubtitleSegment),
    Skipped {
        /// 1-based block position in the document
        block: usize,
        reason: SkipReason,
    },
}

/// Parse every block of an SRT document.
///
/// Fails only when the document is empty after trimming.
pub fn parse_blocks(content: &str) -> Result<Vec<BlockOutcome>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let normalized = content.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Err(BurnError::EmptySubtitle);
    }

    let outcomes = trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(i, block)| parse_block(i + 1, block))
        .collect();

    Ok(outcomes)
}

/// Parse an SRT document into segments, logging skipped blocks.
///
/// The returned list may be empty; callers decide whether that is fatal.
#[cfg(test)]
pub fn parse(content: &str) -> Result<Vec<SubtitleSegment>> {
    Ok(collect_segments(parse_blocks(content)?).0)
}

/// Keep the accepted segments and count the skipped blocks.
pub fn collect_segments(outcomes: Vec<BlockOutcome>) -> (Vec<SubtitleSegment>, usize) {
    let mut segments = Vec::new();
    let mut skipped = 0;

    for outcome in outcomes {
        match outcome {
            BlockOutcome::Segment(segment) => segments.push(segment),
            BlockOutcome::Skipped {
                block,
                reason: SkipReason::EmptyText,
            } => {
                skipped += 1;
                tracing::debug!(block, "Skipping subtitle block with empty text");
            }
            BlockOutcome::Skipped { block, reason } => {
                skipped += 1;
                tracing::warn!(block, %reason, "Skipping malformed subtitle block");
            }
        }
    }

    (segments, skipped)
}

fn parse_block(position: usize, block: &str) -> BlockOutcome {
    let skip = |reason| BlockOutcome::Skipped {
        block: position,
        reason,
    };

    let lines: Vec<&str> = block.lines().collect();
    if lines.len() < 3 {
        return skip(SkipReason::TooFewLines(lines.len()));
    }

    let text = lines[2..]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if text.is_empty() {
        return skip(SkipReason::EmptyText);
    }

    let (start, end) = match parse_time_range(lines[1]) {
        Ok(range) => range,
        Err(e) => return skip(SkipReason::InvalidTiming(e.to_string())),
    };

    let index = lines[0]
        .trim()
        .parse::<u32>()
        .unwrap_or(position as u32);

    BlockOutcome::Segment(SubtitleSegment {
        index,
        start,
        end,
        text,
    })
}
