//! Recursive character splitter.
//!
//! Works on char positions so every cut lands on a UTF-8 boundary. Each
//! separator level contributes a sorted list of candidate cut points (the
//! position just after the separator). For a window the splitter takes the
//! last candidate from the highest-priority level that still leaves room
//! for the overlap, and falls back to a hard cut at the window end.

use unicode_segmentation::UnicodeSegmentation;

/// Separator levels, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitLevel {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl SplitLevel {
    pub const ALL: [SplitLevel; 4] = [
        SplitLevel::Paragraph,
        SplitLevel::Line,
        SplitLevel::Sentence,
        SplitLevel::Word,
    ];
}

/// A span of the source text, in char and byte coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_char: usize,
    pub end_char: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    /// Callers validate `chunk_overlap < chunk_size` and `chunk_size >= 1`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into overlapping spans.
    pub fn split(&self, text: &str) -> Vec<Span> {
        if text.is_empty() {
            return Vec::new();
        }

        let byte_at: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = byte_at.len() - 1;

        let candidates: Vec<Vec<usize>> = SplitLevel::ALL
            .iter()
            .map(|level| cut_points(text, *level, &byte_at))
            .collect();

        let mut spans = Vec::new();
        let mut pos = 0;

        loop {
            if total - pos <= self.chunk_size {
                spans.push(span(&byte_at, pos, total));
                break;
            }

            let window_end = pos + self.chunk_size;
            let floor = pos + self.chunk_overlap;
            let cut = candidates
                .iter()
                .find_map(|points| last_cut_in(points, floor, window_end))
                .unwrap_or(window_end);

            spans.push(span(&byte_at, pos, cut));
            pos = cut - self.chunk_overlap;
        }

        spans
    }
}

fn span(byte_at: &[usize], start: usize, end: usize) -> Span {
    Span {
        start_char: start,
        end_char: end,
        start_byte: byte_at[start],
        end_byte: byte_at[end],
    }
}

/// Last point `p` with `floor < p <= ceiling`.
fn last_cut_in(points: &[usize], floor: usize, ceiling: usize) -> Option<usize> {
    let idx = points.partition_point(|&p| p <= ceiling);
    if idx == 0 {
        return None;
    }
    let p = points[idx - 1];
    (p > floor).then_some(p)
}

/// Sorted char positions just after each separator of `level`.
fn cut_points(text: &str, level: SplitLevel, byte_at: &[usize]) -> Vec<usize> {
    let chars: Vec<char> = text.chars().collect();

    match level {
        SplitLevel::Paragraph => chars
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] == '\n' && w[1] == '\n')
            .map(|(i, _)| i + 2)
            .collect(),
        SplitLevel::Line => chars
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '\n')
            .map(|(i, _)| i + 1)
            .collect(),
        SplitLevel::Sentence => text
            .split_sentence_bound_indices()
            .map(|(byte, _)| byte)
            .filter(|&byte| byte > 0)
            .filter_map(|byte| byte_at.binary_search(&byte).ok())
            .collect(),
        SplitLevel::Word => chars
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, _)| i + 1)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces<'a>(text: &'a str, spans: &[Span]) -> Vec<&'a str> {
        spans
            .iter()
            .map(|s| &text[s.start_byte..s.end_byte])
            .collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(RecursiveSplitter::new(10, 2).split("").is_empty());
    }

    #[test]
    fn test_short_text_is_one_span() {
        let spans = RecursiveSplitter::new(100, 10).split("short");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end_char, 5);
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = "aaaa bbbb\n\ncccc dddd eeee";
        let spans = RecursiveSplitter::new(16, 2).split(text);
        let parts = pieces(text, &spans);
        assert_eq!(parts[0], "aaaa bbbb\n\n");
        assert!(parts[1].starts_with("\n\n"));
    }

    #[test]
    fn test_falls_back_to_words() {
        let text = "alpha beta gamma delta epsilon";
        let spans = RecursiveSplitter::new(12, 0).split(text);
        let parts = pieces(text, &spans);
        assert_eq!(parts[0], "alpha beta ");
        assert!(parts.iter().all(|p| p.chars().count() <= 12));
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let text = "x".repeat(25);
        let spans = RecursiveSplitter::new(10, 3).split(&text);
        let lens: Vec<usize> = spans.iter().map(|s| s.end_char - s.start_char).collect();
        assert_eq!(lens, vec![10, 10, 10, 4]);
        assert_eq!(spans[1].start_char, 7);
    }

    #[test]
    fn test_multibyte_boundaries() {
        let text = "é".repeat(30);
        let spans = RecursiveSplitter::new(8, 2).split(&text);
        for s in &spans {
            assert!(text.is_char_boundary(s.start_byte));
            assert!(text.is_char_boundary(s.end_byte));
            assert!(s.end_char - s.start_char <= 8);
        }
    }
}
