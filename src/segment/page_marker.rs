use super::{is_complete_sentence, parse_page_marker, Segment, Segmenter};

/// Markdown-style text with explicit page markers.
///
/// A line continues the current paragraph until the paragraph ends with
/// sentence punctuation. Headings, `**Pages` lines and table-of-contents lines
/// close the current paragraph. Nothing before the first marker is kept.
pub struct PageMarkerSegmenter;

impl Segmenter for PageMarkerSegmenter {
    fn segment(&self, lines: &[String]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current_page: Option<u32> = None;
        let mut current: Option<Segment> = None;

        for line in lines {
            let trimmed = line.trim();

            if let Some(page) = parse_page_marker(trimmed) {
                segments.extend(current.take());
                current_page = Some(page);
                continue;
            }

            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("**Pages")
                || trimmed.contains("Table of Contents")
            {
                segments.extend(current.take());
                continue;
            }

            let Some(page) = current_page else {
                continue;
            };

            match current.as_mut() {
                Some(para) if !is_complete_sentence(&para.content) => {
                    para.content.push(' ');
                    para.content.push_str(trimmed);
                    if is_complete_sentence(&para.content) {
                        segments.extend(current.take());
                    }
                }
                _ => {
                    segments.extend(current.take());
                    current = Some(Segment::new(Some(page), trimmed));
                }
            }
        }

        segments.extend(current);
        segments
    }
}
