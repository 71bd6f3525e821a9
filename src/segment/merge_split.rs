use super::{is_short_caps, parse_page_marker, Segment, Segmenter};
use crate::book::parse_page_label;

const CONTINUATION_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "in", "on", "at", "by", "for", "with", "from", "and", "or", "but",
    "as", "if", "be", "this", "that", "which",
];

/// Line-per-paragraph OCR output where paragraphs are split mid-sentence.
///
/// Short fragments and running heads are dropped first, then each line is
/// merged into the previous one while [`should_merge_with_next`] says the
/// sentence continues.
pub struct MergeSplitSegmenter {
    min_chars: usize,
}

impl MergeSplitSegmenter {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    fn is_noise(&self, text: &str) -> bool {
        text.chars().count() < self.min_chars
            || is_short_caps(text)
            || parse_page_label(text).is_ok()
    }
}

impl Segmenter for MergeSplitSegmenter {
    fn segment(&self, lines: &[String]) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut current_page = None;
        let mut current: Option<Segment> = None;

        for line in lines {
            let text = line.trim();

            if let Some(page) = parse_page_marker(text) {
                current_page = Some(page);
                continue;
            }
            if self.is_noise(text) {
                continue;
            }

            match current.as_mut() {
                Some(para) if should_merge_with_next(&para.content, text) => {
                    let trimmed = para.content.trim_end();
                    if let Some(stem) = trimmed.strip_suffix('-') {
                        para.content = format!("{}{}", stem, text);
                    } else {
                        para.content.push(' ');
                        para.content.push_str(text);
                    }
                }
                _ => {
                    segments.extend(current.take());
                    current = Some(Segment::new(current_page, text));
                }
            }
        }

        segments.extend(current);
        segments
    }
}

/// Whether `next` continues the sentence left open at the end of `current`
pub fn should_merge_with_next(current: &str, next: &str) -> bool {
    let current = current.trim_end();
    let next = next.trim_start();

    if current.ends_with('-') {
        return true;
    }

    if next.chars().next().is_some_and(char::is_lowercase) {
        return true;
    }

    let last_word = current
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_matches(|c| ".,;:!?\"'".contains(c))
        .to_lowercase();
    if CONTINUATION_WORDS.contains(&last_word.as_str()) {
        return true;
    }

    let ends_sentence = matches!(current.chars().last(), Some('.' | '!' | '?' | '"' | '”'));
    if !ends_sentence {
        let next_upper = next.chars().next().is_some_and(char::is_uppercase);
        return !(next_upper && current.chars().count() > 100);
    }

    false
}
