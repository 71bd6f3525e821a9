use anyhow::{Context, Result};
use pdf_extract::extract_text;
use std::path::Path;
use tracing::{info, warn};

/// Text extracted from a PDF, one entry per page
#[derive(Debug, Clone)]
pub struct PdfContent {
    pub pages: Vec<String>,
    pub has_text: bool,
}

impl PdfContent {
    pub fn from_text(text: &str) -> Self {
        let has_text = !text.trim().is_empty();

        // pdf-extract separates pages with form feeds
        let pages: Vec<String> = text.split('\x0C').map(|s| s.to_string()).collect();

        Self { pages, has_text }
    }
}

/// Extract text from a PDF file
pub fn extract_text_from_pdf(path: &Path) -> Result<PdfContent> {
    info!("Extracting text from PDF: {:?}", path);

    let text = extract_text(path)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    let content = PdfContent::from_text(&text);

    if !content.has_text {
        warn!("PDF appears to be scanned or has no extractable text: {:?}", path);
    }

    info!("Extracted {} pages from PDF", content.pages.len());

    Ok(content)
}

/// Heuristic to detect if a line is likely a heading
pub fn is_likely_heading(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }

    let has_letters = line.chars().any(|c| c.is_alphabetic());

    let patterns = [
        line.starts_with("Chapter "),
        line.starts_with("CHAPTER "),
        line.starts_with("Appendix "),
        line.starts_with("APPENDIX "),
        line.starts_with("Foreword"),
        line.starts_with("FOREWORD"),
        has_letters
            && line.chars().all(|c| !c.is_lowercase())
            && line.chars().count() < 80,
    ];

    patterns.iter().any(|&p| p)
}

/// Candidate chapter headings with their line index
pub fn find_headings<S: AsRef<str>>(lines: &[S]) -> Vec<(usize, String)> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.as_ref().trim();
            is_likely_heading(trimmed).then(|| (idx, trimmed.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_likely_heading() {
        assert!(is_likely_heading("Chapter 1"));
        assert!(is_likely_heading("BILL'S STORY"));
        assert!(is_likely_heading("THE DOCTOR'S OPINION"));
        assert!(!is_likely_heading("This is a normal paragraph with some text."));
        assert!(!is_likely_heading("1934"));
        assert!(!is_likely_heading(""));
    }

    #[test]
    fn test_find_headings() {
        let lines = vec!["", "A VISION FOR YOU", "For most normal folks, drinking means", "Chapter 11"];
        let headings = find_headings(&lines);
        assert_eq!(
            headings,
            vec![(1, "A VISION FOR YOU".to_string()), (3, "Chapter 11".to_string())]
        );
    }

    #[test]
    fn test_pages_split_on_form_feed() {
        let content = PdfContent::from_text("one\x0Ctwo\x0Cthree");
        assert!(content.has_text);
        assert_eq!(content.pages, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_blank_pdf_has_no_text() {
        assert!(!PdfContent::from_text("  \x0C \n").has_text);
    }
}
