use crate::book::PageRange;
use crate::config::ChapterBounds;

use super::book_loader::SourceDocument;

/// Render the marker line the page-marker segmenter understands
pub fn page_marker_line(page: u32) -> String {
    format!("*— Page {} —*", page)
}

/// Where `bounds` starts inside `lines`, searching from `from`.
///
/// Returns `(boundary, content_start)`: the line that ends the previous
/// chapter and the first line of this chapter's content.
fn locate<S: AsRef<str>>(lines: &[S], bounds: &ChapterBounds, from: usize) -> Option<(usize, usize)> {
    match bounds {
        ChapterBounds::Lines { start, .. } => (*start < lines.len()).then_some((*start, *start)),
        ChapterBounds::Heading(heading) => {
            let heading = heading.trim();
            lines
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, line)| line.as_ref().trim().eq_ignore_ascii_case(heading))
                .map(|(idx, _)| (idx, idx + 1))
        }
        ChapterBounds::PdfPages(_) => None,
    }
}

/// Cut one chapter's lines out of a document.
///
/// `next` is the following chapter's bounds, used when this chapter has no
/// explicit end. Returns `None` when the chapter cannot be located.
pub fn slice_chapter(
    document: &SourceDocument,
    bounds: &ChapterBounds,
    next: Option<&ChapterBounds>,
    page_range: PageRange,
) -> Option<Vec<String>> {
    if let ChapterBounds::PdfPages([first, last]) = bounds {
        return slice_pdf_pages(document, *first, *last, page_range);
    }

    let lines = &document.lines;
    let (_, start) = locate(lines, bounds, 0)?;

    let explicit_end = match bounds {
        ChapterBounds::Lines { end, .. } => *end,
        _ => None,
    };

    let end = explicit_end
        .or_else(|| {
            next.and_then(|n| locate(lines, n, start))
                .map(|(boundary, _)| boundary)
                .filter(|boundary| *boundary >= start)
        })
        .unwrap_or(lines.len())
        .min(lines.len());

    Some(lines[start..end.max(start)].to_vec())
}

/// Concatenate PDF pages, each preceded by a marker carrying its book page
fn slice_pdf_pages(
    document: &SourceDocument,
    first: usize,
    last: usize,
    page_range: PageRange,
) -> Option<Vec<String>> {
    if document.pages.is_empty() || first == 0 || first > document.pages.len() {
        return None;
    }

    let end = last.min(document.pages.len());
    let mut lines = Vec::new();

    for (offset, page) in document.pages[first - 1..end].iter().enumerate() {
        let book_page = (page_range.first + offset as u32).min(page_range.last);
        lines.push(page_marker_line(book_page));
        lines.extend(page.lines().map(str::to_string));
        lines.push(String::new());
    }

    Some(lines)
}
