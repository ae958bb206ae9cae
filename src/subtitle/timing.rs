//! SRT timestamp parsing and ASS timestamp rendering

use std::fmt;

use crate::error::{BurnError, Result};

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// A subtitle timestamp.
///
/// Components are stored as parsed; values outside their nominal range
/// (e.g. `minutes >= 60`) are kept and rendered unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// Fractional second, truncated or padded to three digits.
    pub millis: u32,
}

impl Timestamp {
    /// Parse `H:MM:SS,fff` or `H:MM:SS.fff`.
    ///
    /// The fractional part may have any number of digits, or be absent.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let caps = regex!(r"^(\d+):(\d+):(\d+)(?:[,.](\d*))?$")
            .captures(s)
            .ok_or_else(|| BurnError::InvalidTimestamp(s.to_string()))?;

        let field = |i: usize| -> Result<u32> {
            caps[i]
                .parse::<u32>()
                .map_err(|_| BurnError::InvalidTimestamp(s.to_string()))
        };

        let fraction = caps.get(4).map(|m| m.as_str()).unwrap_or("");
        let millis = fixed_digits(fraction, 3)
            .parse::<u32>()
            .map_err(|_| BurnError::InvalidTimestamp(s.to_string()))?;

        Ok(Self {
            hours: field(1)?,
            minutes: field(2)?,
            seconds: field(3)?,
            millis,
        })
    }

    /// Centisecond part (truncated, never rounded)
    pub fn centis(&self) -> u32 {
        self.millis / 10
    }

    /// Render as an ASS timestamp, `H:MM:SS.cc`
    pub fn to_ass(&self) -> String {
        format!(
            "{}:{:02}:{:02}.{:02}",
            self.hours,
            self.minutes,
            self.seconds,
            self.centis()
        )
    }
}

/// SRT rendering, `HH:MM:SS,mmm`
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

impl std::str::FromStr for Timestamp {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self> {
        Timestamp::parse(s)
    }
}

// Truncate or right-pad a digit string with '0' to exactly `width` digits.
fn fixed_digits(digits: &str, width: usize) -> String {
    let mut out: String = digits.chars().take(width).collect();
    while out.len() < width {
        out.push('0');
    }
    out
}

/// Convert an SRT timestamp string straight into ASS form.
#[cfg(test)]
pub fn normalize(s: &str) -> Result<String> {
    Ok(Timestamp::parse(s)?.to_ass())
}

/// Parse an SRT time range line, `<start> --> <end>`.
///
/// Anything after the end timestamp (SRT position coordinates) is ignored.
pub fn parse_time_range(line: &str) -> Result<(Timestamp, Timestamp)> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| BurnError::InvalidTimestamp(line.trim().to_string()))?;
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| BurnError::InvalidTimestamp(line.trim().to_string()))?;

    Ok((Timestamp::parse(start)?, Timestamp::parse(end)?))
}
