//! ASS document generation
//!
//! Produces an Advanced SubStation Alpha script with two caption tracks:
//! the original text (`Default` style) and its phonetic reading (`Pinyin`
//! style) stacked above it. Both events of a segment share one time window.

use std::fmt;

use crate::error::{BurnError, Result};
use crate::subtitle::phonetic::{render_line, PhoneticAnnotator};
use crate::subtitle::srt::SubtitleSegment;
use crate::subtitle::timing::Timestamp;

/// Canvas width the styles are laid out for
pub const PLAY_RES_X: u32 = 480;
/// Canvas height the styles are laid out for
pub const PLAY_RES_Y: u32 = 848;

const SCRIPT_TITLE: &str = "Burned Subtitle";
const FONT_NAME: &str = "Source Han Sans SC";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// The two caption tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStyle {
    Default,
    Pinyin,
}

impl TrackStyle {
    pub fn name(&self) -> &'static str {
        match self {
            TrackStyle::Default => "Default",
            TrackStyle::Pinyin => "Pinyin",
        }
    }
}

/// A `[V4+ Styles]` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssStyle {
    pub name: &'static str,
    pub font_name: &'static str,
    pub font_size: u32,
    pub primary_colour: &'static str,
    pub secondary_colour: &'static str,
    pub outline_colour: &'static str,
    pub back_colour: &'static str,
    pub bold: bool,
    pub italic: bool,
    pub border_style: u8,
    pub outline: u32,
    pub shadow: u32,
    /// Numpad alignment, 2 = bottom centre
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    pub encoding: u8,
}

impl AssStyle {
    /// Original caption text, large white
    pub const fn original() -> Self {
        Self {
            name: "Default",
            font_name: FONT_NAME,
            font_size: 60,
            primary_colour: "&H00FFFFFF",
            secondary_colour: "&H000000FF",
            outline_colour: "&H00000000",
            back_colour: "&H00000000",
            bold: false,
            italic: false,
            border_style: 1,
            outline: 2,
            shadow: 2,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 212,
            encoding: 1,
        }
    }

    /// Pinyin reading, half size, placed above the original line
    pub const fn pinyin() -> Self {
        Self {
            name: "Pinyin",
            font_name: FONT_NAME,
            font_size: 30,
            primary_colour: "&H00FFFF00",
            secondary_colour: "&H000000FF",
            outline_colour: "&H00000000",
            back_colour: "&H00000000",
            bold: false,
            italic: false,
            border_style: 1,
            outline: 1,
            shadow: 1,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 252,
            encoding: 1,
        }
    }
}

impl fmt::Display for AssStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // ScaleX, ScaleY = 100; Underline, StrikeOut, Spacing, Angle = 0
        write!(
            f,
            "Style: {},{},{},{},{},{},{},{},{},0,0,100,100,0,0,{},{},{},{},{},{},{},{}",
            self.name,
            self.font_name,
            self.font_size,
            self.primary_colour,
            self.secondary_colour,
            self.outline_colour,
            self.back_colour,
            self.bold as u8,
            self.italic as u8,
            self.border_style,
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.encoding,
        )
    }
}

/// One `Dialogue:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    pub start: Timestamp,
    pub end: Timestamp,
    pub style: TrackStyle,
    pub text: String,
}

impl fmt::Display for DialogueEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            self.start.to_ass(),
            self.end.to_ass(),
            self.style.name(),
            self.text
        )
    }
}

/// A complete script: fixed header followed by events in segment order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssDocument {
    pub events: Vec<DialogueEvent>,
}

impl AssDocument {
    /// Header shared by every generated document
    pub fn header() -> String {
        let mut out = String::new();
        out.push_str("[Script Info]\n");
        out.push_str(&format!("Title: {}\n", SCRIPT_TITLE));
        out.push_str("ScriptType: v4.00+\n");
        out.push_str("Collisions: Normal\n");
        out.push_str(&format!("PlayResX: {}\n", PLAY_RES_X));
        out.push_str(&format!("PlayResY: {}\n", PLAY_RES_Y));
        out.push('\n');
        out.push_str("[V4+ Styles]\n");
        out.push_str(STYLE_FORMAT);
        out.push('\n');
        out.push_str(&format!("{}\n", AssStyle::original()));
        out.push_str(&format!("{}\n", AssStyle::pinyin()));
        out.push('\n');
        out.push_str("[Events]\n");
        out.push_str(EVENT_FORMAT);
        out.push('\n');
        out
    }

    pub fn render(&self) -> String {
        let mut out = Self::header();
        for event in &self.events {
            out.push_str(&event.to_string());
            out.push('\n');
        }
        out
    }
}

/// Per-segment result of annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Original line first, phonetic line second
    Emitted([DialogueEvent; 2]),
    Skipped { index: u32, reason: String },
}

/// Builds an [`AssDocument`] from parsed segments.
///
/// A segment whose annotation fails is skipped with a warning; the rest of
/// the document is still produced.
pub struct AssBuilder<'a> {
    annotator: &'a dyn PhoneticAnnotator,
}

impl<'a> AssBuilder<'a> {
    pub fn new(annotator: &'a dyn PhoneticAnnotator) -> Self {
        Self { annotator }
    }

    /// Produce the dialogue pair for one segment
    pub fn annotate(&self, segment: &SubtitleSegment) -> SegmentOutcome {
        match self.annotator.annotate(&segment.text) {
            Ok(tokens) => SegmentOutcome::Emitted(dialogue_pair(segment, render_line(&tokens))),
            Err(e) => SegmentOutcome::Skipped {
                index: segment.index,
                reason: e.to_string(),
            },
        }
    }

    pub fn build(&self, segments: &[SubtitleSegment]) -> Result<AssDocument> {
        let mut doc = AssDocument::default();

        for segment in segments {
            match self.annotate(segment) {
                SegmentOutcome::Emitted(pair) => doc.events.extend(pair),
                SegmentOutcome::Skipped { index, reason } => {
                    tracing::warn!(
                        index,
                        start = %segment.start,
                        %reason,
                        "Skipping subtitle segment"
                    );
                }
            }
        }

        if doc.events.is_empty() {
            return Err(BurnError::NoDialogue);
        }

        Ok(doc)
    }
}

/// The two events for a segment, sharing its time window
pub fn dialogue_pair(segment: &SubtitleSegment, phonetic: String) -> [DialogueEvent; 2] {
    [
        DialogueEvent {
            start: segment.start,
            end: segment.end,
            style: TrackStyle::Default,
            text: segment.text.clone(),
        },
        DialogueEvent {
            start: segment.start,
            end: segment.end,
            style: TrackStyle::Pinyin,
            text: phonetic,
        },
    ]
}
