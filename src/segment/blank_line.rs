use super::{is_page_furniture, parse_page_marker, Segment, Segmenter};
use crate::utils::merge_lines;

/// Blank lines separate paragraphs; the lines between them are one paragraph
pub struct BlankLineSegmenter;

impl Segmenter for BlankLineSegmenter {
    fn segment(&self, lines: &[String]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current_page: Option<u32> = None;
        let mut para_page: Option<u32> = None;
        let mut buffer: Vec<&str> = Vec::new();

        for line in lines {
            let text = line.trim();

            if let Some(page) = parse_page_marker(text) {
                current_page = Some(page);
                continue;
            }

            if text.is_empty() {
                flush(&mut segments, &mut buffer, para_page);
                continue;
            }

            // a tab inside the line marks a running head, so test the untrimmed text
            if is_page_furniture(line.trim_matches(' ')) {
                continue;
            }

            if buffer.is_empty() {
                para_page = current_page;
            }
            buffer.push(text);
        }

        flush(&mut segments, &mut buffer, para_page);
        segments
    }
}

fn flush(segments: &mut Vec<Segment>, buffer: &mut Vec<&str>, page: Option<u32>) {
    if buffer.is_empty() {
        return;
    }
    let merged = merge_lines(buffer);
    if !merged.is_empty() {
        segments.push(Segment::new(page, merged));
    }
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        let input = lines(
            "THERE IS A SOLUTION\n\
             \n\
             WE, OF Alcoholics Anonymous, know thou- sands\n\
             of men and women.\n\
             17\n\
             \n\
             \n\
             The tremendous fact for every one of us--\n\
             is that we have discovered a common solution.",
        );

        let segments = BlankLineSegmenter.segment(&input);

        assert_eq!(
            segments,
            vec![
                Segment::new(None, "WE, OF Alcoholics Anonymous, know thousands of men and women."),
                Segment::new(
                    None,
                    "The tremendous fact for every one of us— is that we have discovered a common solution."
                ),
            ]
        );
    }

    #[test]
    fn test_markers_attach_page_to_paragraph_start() {
        let input = lines("--17--\nFirst paragraph starts here\n--18--\nand ends here.\n\nSecond paragraph.");
        let segments = BlankLineSegmenter.segment(&input);
        assert_eq!(segments[0].page_number, Some(17));
        assert_eq!(segments[0].content, "First paragraph starts here and ends here.");
        assert_eq!(segments[1].page_number, Some(18));
    }

    #[test]
    fn test_running_heads_skipped() {
        let input = lines("xii\tPREFACE\nActual text of the preface.");
        let segments = BlankLineSegmenter.segment(&input);
        assert_eq!(segments, vec![Segment::new(None, "Actual text of the preface.")]);
    }
}
