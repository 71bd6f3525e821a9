use super::{parse_page_marker, Segment, Segmenter};

/// One paragraph per line, as in a clean reference transcript where each
/// paragraph sits on a single indented line.
///
/// The first `header_lines` lines hold the title block and are skipped. A
/// heading-bounded slice already starts after the heading line, so for
/// `Chapter N` / blank / title only the blank and the title remain.
pub struct IndentedSegmenter {
    header_lines: usize,
}

impl IndentedSegmenter {
    pub fn new(header_lines: usize) -> Self {
        Self { header_lines }
    }
}

impl Segmenter for IndentedSegmenter {
    fn segment(&self, lines: &[String]) -> Vec<Segment> {
        let mut current_page = None;
        let mut segments = Vec::new();

        for line in lines.iter().skip(self.header_lines) {
            let text = line.trim();
            if text.is_empty() || text.starts_with("Chapter ") {
                continue;
            }

            if let Some(page) = parse_page_marker(text) {
                current_page = Some(page);
                continue;
            }

            let indented = line.starts_with("    ") || line.starts_with('\t');
            if indented || text.chars().count() > 10 {
                segments.push(Segment::new(current_page, text));
            }
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_one_paragraph_per_line() {
        let input = lines(
            "Bill's Story\n\
             Chapter 1\n\
             \n\
             \x20   WAR FEVER ran high in the New England town.\n\
             Chapter 1 recap\n\
             \x20   Yes.\n\
             short\n\
             We were flattered when the first citizens took us to their homes.",
        );

        let segments = IndentedSegmenter::new(3).segment(&input);

        assert_eq!(
            segments,
            vec![
                Segment::new(None, "WAR FEVER ran high in the New England town."),
                Segment::new(None, "Yes."),
                Segment::new(None, "We were flattered when the first citizens took us to their homes."),
            ]
        );
    }

    #[test]
    fn test_markers_set_page() {
        let input = lines("--1--\n\tFirst paragraph of the story.\n--2--\n\tSecond paragraph of the story.");
        let segments = IndentedSegmenter::new(0).segment(&input);
        assert_eq!(segments[0].page_number, Some(1));
        assert_eq!(segments[1].page_number, Some(2));
    }
}
