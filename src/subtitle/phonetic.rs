//! Phonetic annotation of caption text

use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Maps caption text to an ordered sequence of phonetic tokens.
pub trait PhoneticAnnotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Vec<String>>;
}

/// How pinyin syllables are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinyinStyle {
    /// Tone marks, `nǐ hǎo`
    #[default]
    Tone,
    /// Trailing tone numbers, `ni3 hao3`
    ToneNumber,
    /// No tones, `ni hao`
    Plain,
}

/// Pinyin annotator backed by the `pinyin` character table.
///
/// Every character with a reading becomes one token. A run of characters
/// without a reading (Latin text, digits, punctuation) is kept verbatim as
/// a single token.
///
/// Characters are read in isolation, so a heteronym always gets its first
/// listed reading (`银行` becomes `yín xíng`).
#[derive(Debug, Clone, Default)]
pub struct PinyinAnnotator {
    style: PinyinStyle,
}

impl PinyinAnnotator {
    pub fn new(style: PinyinStyle) -> Self {
        Self { style }
    }
}

impl PhoneticAnnotator for PinyinAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut run = String::new();

        for ch in text.chars() {
            match ch.to_pinyin() {
                Some(py) => {
                    flush_run(&mut run, &mut tokens);
                    let syllable = match self.style {
                        PinyinStyle::Tone => py.with_tone(),
                        PinyinStyle::ToneNumber => py.with_tone_num_end(),
                        PinyinStyle::Plain => py.plain(),
                    };
                    tokens.push(syllable.to_string());
                }
                None => run.push(ch),
            }
        }
        flush_run(&mut run, &mut tokens);

        Ok(tokens)
    }
}

fn flush_run(run: &mut String, tokens: &mut Vec<String>) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
    run.clear();
}

/// Join tokens into the rendered phonetic line.
pub fn render_line<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
