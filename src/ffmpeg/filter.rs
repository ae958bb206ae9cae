//! Filter-graph path escaping
//!
//! Paths embedded in a `-vf` expression go through ffmpeg's filter parser,
//! where `:` separates options. Plain `-i` / output arguments do not, and
//! must only get their separators normalized.

use std::path::Path;

/// Normalize directory separators to `/`.
///
/// This is all a positional input/output argument needs.
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Escape a path for use inside a quoted filter option value.
///
/// A leading drive designator (`C:`) has its colon escaped; nothing else
/// is touched.
pub fn escape_filter_path(path: &str) -> String {
    let path = to_forward_slashes(path);
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("{}\\:{}", drive, &path[2..])
        }
        _ => path,
    }
}

/// The `ass` filter expression with its font directory
pub fn subtitles_filter(ass_path: &Path, fonts_dir: &Path) -> String {
    format!(
        "ass='{}':fontsdir='{}'",
        escape_filter_path(&ass_path.to_string_lossy()),
        escape_filter_path(&fonts_dir.to_string_lossy())
    )
}
