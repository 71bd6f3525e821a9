use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::utils::{clean_page_text, extract_paragraphs_from_docx, extract_text_from_pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Docx,
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "docx" => Some(SourceKind::Docx),
            "txt" | "md" | "text" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// A book document flattened to lines.
///
/// PDF sources also keep their cleaned per-page text so chapters can be cut
/// by page index.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: Option<PathBuf>,
    pub kind: SourceKind,
    pub lines: Vec<String>,
    pub pages: Vec<String>,
}

impl SourceDocument {
    /// Load a PDF, Word or plain-text document
    pub fn load(path: &Path, running_headers: &[String]) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Source document not found: {:?}", path);
        }

        let kind = SourceKind::from_path(path)
            .with_context(|| format!("Unsupported file format: {:?}", path))?;

        let mut document = match kind {
            SourceKind::Pdf => {
                let content = extract_text_from_pdf(path)?;

                if !content.has_text {
                    anyhow::bail!("PDF has no extractable text (may need OCR): {:?}", path);
                }

                let pages: Vec<String> = content
                    .pages
                    .iter()
                    .map(|page| clean_page_text(page, running_headers))
                    .collect();
                Self::from_pages(pages)
            }
            SourceKind::Docx => {
                let paragraphs = extract_paragraphs_from_docx(path)
                    .with_context(|| format!("Failed to read Word document: {:?}", path))?;
                Self::from_lines(SourceKind::Docx, paragraphs)
            }
            SourceKind::Text => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read text file: {:?}", path))?;
                Self::from_text(&text)
            }
        };

        info!(
            "Loaded {:?} ({} lines, {} pages)",
            path,
            document.lines.len(),
            document.pages.len()
        );

        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_lines(SourceKind::Text, text.lines().map(str::to_string).collect())
    }

    pub fn from_lines(kind: SourceKind, lines: Vec<String>) -> Self {
        Self {
            path: None,
            kind,
            lines,
            pages: Vec::new(),
        }
    }

    /// Pages become the line list with a blank line between pages
    pub fn from_pages(pages: Vec<String>) -> Self {
        let mut lines = Vec::new();
        for page in &pages {
            lines.extend(page.lines().map(str::to_string));
            lines.push(String::new());
        }

        Self {
            path: None,
            kind: SourceKind::Pdf,
            lines,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/BigBook.DOCX")), Some(SourceKind::Docx));
        assert_eq!(SourceKind::from_path(Path::new("aa.pdf")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("aa.txt")), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_path(Path::new("aa.epub")), None);
    }

    #[test]
    fn test_load_text_file() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "Chapter 1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "    WAR FEVER ran high in the little town.").unwrap();

        let document = SourceDocument::load(file.path(), &[]).unwrap();
        assert_eq!(document.kind, SourceKind::Text);
        assert_eq!(document.lines.len(), 3);
        assert_eq!(document.lines[2], "    WAR FEVER ran high in the little town.");
        assert!(document.pages.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(SourceDocument::load(Path::new("/nonexistent/book.txt"), &[]).is_err());
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        let file = Builder::new().suffix(".epub").tempfile().unwrap();
        assert!(SourceDocument::load(file.path(), &[]).is_err());
    }

    #[test]
    fn test_from_pages_separates_pages() {
        let document = SourceDocument::from_pages(vec!["a\nb".to_string(), "c".to_string()]);
        assert_eq!(document.lines, vec!["a", "b", "", "c", ""]);
        assert_eq!(document.pages.len(), 2);
    }
}
