//! Inline file-reference markers.
//!
//! A chat line may embed `[name.jpg]` / `[name.png]` tokens. The
//! outbound pipeline replaces each one with the transfer's destination
//! alias (or an error annotation) before the line is sent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches one bracketed file reference with a recognized image extension.
static FILE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\[\]]+\.(?:jpg|png)\]").expect("valid marker pattern"));

/// Matches a recognized image extension at the end of a filename.
static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:jpg|png)$").expect("valid extension pattern"));

/// Returns every file-reference marker in `text`, brackets included.
pub fn find_markers(text: &str) -> Vec<&str> {
    FILE_MARKER.find_iter(text).map(|m| m.as_str()).collect()
}

/// Strips the surrounding brackets from a marker.
pub fn marker_filename(marker: &str) -> &str {
    marker.trim_matches(|c| c == '[' || c == ']')
}

/// Returns the recognized image extension of `filename`, dot included.
pub fn image_extension(filename: &str) -> Option<&str> {
    IMAGE_EXT.find(filename).map(|m| m.as_str())
}

/// Returns `filename` with its recognized image extension removed.
pub fn base_name(filename: &str) -> &str {
    match IMAGE_EXT.find(filename) {
        Some(m) => &filename[..m.start()],
        None => filename,
    }
}
