//! Filename segment sanitization.
//!
//! Total over its input: every string (and every JSON value, via its textual
//! form) maps to a segment that is safe to use as a single path component on
//! Linux, macOS and Windows. Unsafe content is removed, never rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Longest segment the sanitizer will emit.
pub const MAX_SEGMENT_BYTES: usize = 255;

const ILLEGAL_CHARS: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

static WINDOWS_RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$")
        .expect("reserved-name pattern is a valid regex")
});

/// Sanitize one name segment.
#[must_use]
pub fn sanitize_segment(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !is_control(*c))
        .collect();

    truncate_on_char_boundary(&mut cleaned, MAX_SEGMENT_BYTES);
    // Also empties dot-only segments such as "." and "..".
    let kept = cleaned.trim_end_matches(['.', ' ']).len();
    cleaned.truncate(kept);
    if WINDOWS_RESERVED.is_match(&cleaned) {
        cleaned.clear();
    }
    cleaned
}

/// Sanitize an arbitrary title value. Non-strings are stringified first:
/// `null` becomes `"null"`, numbers and booleans use their literal text.
#[must_use]
pub fn sanitize_value(value: &Value) -> String {
    match value {
        Value::String(text) => sanitize_segment(text),
        other => sanitize_segment(&other.to_string()),
    }
}

/// Split on either path separator, keeping empty pieces.
pub fn split_separators(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(['/', '\\'])
}

// C0 and C1 control ranges.
fn is_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{80}'..='\u{9f}')
}

fn truncate_on_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}
