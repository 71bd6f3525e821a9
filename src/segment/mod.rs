mod blank_line;
mod indented;
mod merge_split;
mod page_marker;

use regex::Regex;
use std::sync::LazyLock;

use crate::book::{distribute_pages, parse_page_label, ChapterMeta};
use crate::config::{SegmentationConfig, SegmentationStrategy};

pub use blank_line::BlankLineSegmenter;
pub use indented::IndentedSegmenter;
pub use merge_split::{should_merge_with_next, MergeSplitSegmenter};
pub use page_marker::PageMarkerSegmenter;

static RE_STAR_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\*—\s*Page\s+(\d+|[ivxlcdm]+)\s*—\*$").expect("valid page marker regex")
});
static RE_DASH_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^--(\d+|[ivxlcdm]+)--$").expect("valid page marker regex")
});

/// A paragraph produced by a segmenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub page_number: Option<u32>,
    pub content: String,
}

impl Segment {
    pub fn new(page_number: Option<u32>, content: impl Into<String>) -> Self {
        Self {
            page_number,
            content: content.into(),
        }
    }
}

pub trait Segmenter {
    /// Split the lines of one chapter into paragraphs, in reading order
    fn segment(&self, lines: &[String]) -> Vec<Segment>;
}

pub fn segmenter_for(strategy: SegmentationStrategy, config: &SegmentationConfig) -> Box<dyn Segmenter> {
    match strategy {
        SegmentationStrategy::PageMarker => Box::new(PageMarkerSegmenter),
        SegmentationStrategy::BlankLine => Box::new(BlankLineSegmenter),
        SegmentationStrategy::Indented => Box::new(IndentedSegmenter::new(config.header_lines)),
        SegmentationStrategy::MergeSplit => {
            Box::new(MergeSplitSegmenter::new(config.min_paragraph_chars))
        }
    }
}

/// Page number announced by a `*— Page 12 —*` or `--xiv--` line
pub fn parse_page_marker(line: &str) -> Option<u32> {
    let line = line.trim();
    let caps = RE_STAR_MARKER
        .captures(line)
        .or_else(|| RE_DASH_MARKER.captures(line))?;
    parse_page_label(&caps[1]).ok()
}

/// Printed page furniture: bare page numbers, roman numerals, tabbed running
/// heads such as `"xii\tPREFACE"` and short all-caps headings
pub fn is_page_furniture(text: &str) -> bool {
    let text = text.trim_matches(|c| c == ' ' || c == '\r' || c == '\n');
    if text.is_empty() {
        return true;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if text.len() <= 8 && text.chars().all(|c| matches!(c, 'i' | 'v' | 'x' | 'l' | 'c')) {
        return true;
    }
    if text.contains('\t') {
        return true;
    }
    is_short_caps(text)
}

/// All-caps line under 60 chars, the shape of a section heading
pub(crate) fn is_short_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
        && !text.chars().any(char::is_lowercase)
        && text.chars().count() < 60
}

/// Attach page numbers and drop paragraphs that are too short or only repeat
/// the chapter title.
///
/// Segments without a page inherit the previous segment's page. When no
/// segment carries a page at all, pages are distributed evenly over the
/// chapter's page range.
pub fn assign_pages(segments: Vec<Segment>, meta: &ChapterMeta, min_chars: usize) -> Vec<(u32, String)> {
    let kept: Vec<Segment> = segments
        .into_iter()
        .filter(|s| s.content.trim().chars().count() >= min_chars)
        .filter(|s| !s.content.trim().eq_ignore_ascii_case(meta.title.trim()))
        .collect();

    if kept.iter().all(|s| s.page_number.is_none()) {
        let pages = distribute_pages(kept.len(), meta.page_range);
        return pages
            .into_iter()
            .zip(kept)
            .map(|(page, s)| (page, s.content))
            .collect();
    }

    let mut current = meta.page_range.first;
    kept.into_iter()
        .map(|s| {
            if let Some(page) = s.page_number {
                current = page;
            }
            (current, s.content)
        })
        .collect()
}

/// Ends with sentence punctuation, so the next line starts a new paragraph
pub(crate) fn is_complete_sentence(text: &str) -> bool {
    matches!(text.trim().chars().last(), Some('.' | '!' | '?' | ':'))
}
