//! Line classification for question-paper text.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s").expect("valid regex"));
static SUB_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z)ivx]+\)\s").expect("valid regex"));

/// Visual role of one line of a question paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// All-caps line, or one starting with SECTION / PART
    Heading,
    /// `1. ...` or `1) ...`
    Numbered,
    /// `a) ...`, `ii) ...`
    SubPart,
    Body,
}

/// Classify a single line. Returns `None` for blank lines.
pub fn classify_line(line: &str) -> Option<LineStyle> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let style = if is_heading(line) {
        LineStyle::Heading
    } else if NUMBERED.is_match(line) {
        LineStyle::Numbered
    } else if SUB_PART.is_match(&line.to_lowercase()) {
        LineStyle::SubPart
    } else {
        LineStyle::Body
    };
    Some(style)
}

/// Trimmed, non-empty lines of `text` with their styles, in order.
pub fn classify_lines(text: &str) -> Vec<(LineStyle, &str)> {
    text.lines()
        .filter_map(|line| classify_line(line).map(|style| (style, line.trim())))
        .collect()
}

fn is_heading(line: &str) -> bool {
    if line.starts_with("SECTION") || line.starts_with("PART") {
        return true;
    }
    let has_upper = line.chars().any(char::is_uppercase);
    let has_lower = line.chars().any(char::is_lowercase);
    has_upper && !has_lower
}
