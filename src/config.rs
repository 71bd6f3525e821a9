use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::book::{ChapterMeta, PageRange};
use crate::error::BookError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentPolicy {
    /// Minimum similarity for a reference paragraph to replace a corrupted one
    pub accept_threshold: f64,
    /// Accepted matches below this are reported as fixed corruption
    pub exact_threshold: f64,
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self {
            accept_threshold: 0.65,
            exact_threshold: 0.95,
        }
    }
}

impl AlignmentPolicy {
    pub fn validate(&self) -> Result<(), BookError> {
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            return Err(BookError::InvalidConfig(
                "accept_threshold must be within [0,1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.exact_threshold) {
            return Err(BookError::InvalidConfig(
                "exact_threshold must be within [0,1]".to_string(),
            ));
        }
        if self.exact_threshold < self.accept_threshold {
            return Err(BookError::InvalidConfig(
                "exact_threshold must be >= accept_threshold".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accept >= {:.2}, exact >= {:.2}",
            self.accept_threshold, self.exact_threshold
        )
    }
}

/// Paragraph segmentation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    /// `*— Page N —*` / `--N--` markers carry the page numbers
    PageMarker,
    /// Blank lines separate paragraphs
    BlankLine,
    /// Every indented or long line is a paragraph
    Indented,
    /// Word-style paragraph list with page-break splits merged back
    MergeSplit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Strategy for the source document in `extract`
    pub strategy: SegmentationStrategy,
    /// Strategy for the trusted reference text in `align`
    pub reference_strategy: SegmentationStrategy,
    pub min_paragraph_chars: usize,
    /// Lines skipped after the reference chapter heading (blank, title)
    pub header_lines: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentationStrategy::BlankLine,
            reference_strategy: SegmentationStrategy::Indented,
            min_paragraph_chars: 10,
            header_lines: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Running headers/footers removed from raw page text
    pub running_headers: Vec<String>,
    /// Case-insensitive regex fixes applied by OCR repair
    pub substitutions: Vec<Substitution>,
    /// Join letters split apart by OCR before applying substitutions.
    /// Off by default: the join also fuses genuine two-letter words.
    pub ocr_repair: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        let substitutions = [
            (r"\bt\s*he\b", "the"),
            (r"\bw\s*ith\b", "with"),
            (r"\bw\s*hich\b", "which"),
            (r"\bt\s*hat\b", "that"),
            (r"\bt\s*his\b", "this"),
            (r"\bt\s*hey\b", "they"),
            (r"\bw\s*as\b", "was"),
            (r"\bw\s*ere\b", "were"),
            (r"\bw\s*ould\b", "would"),
            (r"\bc\s*ould\b", "could"),
            (r"\bs\s*hould\b", "should"),
            (r"\bf\s*rom\b", "from"),
            (r"\ba\s*nd\b", "and"),
            (r"\bb\s*een\b", "been"),
            (r"\bh\s*ave\b", "have"),
            (r"\bex\s*peri", "experi"),
            (r"\bcon\s*tinu", "continu"),
            (r"\bpro\s*gress", "progress"),
            (r"\bop\s*inion", "opinion"),
        ]
        .into_iter()
        .map(|(p, r)| Substitution::new(p, r))
        .collect();

        Self {
            running_headers: Vec::new(),
            substitutions,
            ocr_repair: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Typescript,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Typescript => "ts",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Type annotation of each exported chapter constant
    pub type_name: String,
    /// Module the chapter type is imported from
    pub type_import: String,
    /// Name of the exported id -> chapter map in the index file
    pub index_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Typescript,
            type_name: "BookChapter".to_string(),
            type_import: "@/types/book".to_string(),
            index_name: "bookContent".to_string(),
        }
    }
}

/// Where a chapter lives inside a line-oriented document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterBounds {
    /// 0-based line span; a missing end runs to the next chapter's start
    Lines {
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },
    /// Chapter starts after the first line equal to this heading
    Heading(String),
    /// 1-based inclusive PDF page indices
    PdfPages([usize; 2]),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub chapter_number: Option<u32>,
    pub page_range: PageRange,
    /// Bounds inside the source document used by `extract`
    #[serde(default)]
    pub source: Option<ChapterBounds>,
    /// Bounds inside the reference text used by `align`
    #[serde(default)]
    pub reference: Option<ChapterBounds>,
}

impl ChapterSpec {
    pub fn meta(&self) -> ChapterMeta {
        ChapterMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            chapter_number: self.chapter_number,
            page_range: self.page_range,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub title: String,
    pub chapters: Vec<ChapterSpec>,
    pub alignment: AlignmentPolicy,
    pub segmentation: SegmentationConfig,
    pub cleanup: CleanupConfig,
    pub output: OutputConfig,
    /// Chapter id -> text the chapter is known to contain
    pub expected_snippets: BTreeMap<String, String>,
}

impl BookConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: BookConfig = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BookError> {
        if self.chapters.is_empty() {
            return Err(BookError::InvalidConfig("no chapters configured".to_string()));
        }

        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if chapter.id.trim().is_empty() {
                return Err(BookError::InvalidConfig("chapter id must not be empty".to_string()));
            }
            if !seen.insert(chapter.id.as_str()) {
                return Err(BookError::InvalidConfig(format!(
                    "duplicate chapter id: {}",
                    chapter.id
                )));
            }
            if chapter.page_range.is_empty() {
                return Err(BookError::InvalidConfig(format!(
                    "{}: page range must satisfy first <= last",
                    chapter.id
                )));
            }
            if let Some(ChapterBounds::Lines { start, end: Some(end) }) = &chapter.source {
                if end < start {
                    return Err(BookError::InvalidConfig(format!(
                        "{}: source lines end before start",
                        chapter.id
                    )));
                }
            }
            if let Some(ChapterBounds::PdfPages([first, last])) = &chapter.source {
                if *first == 0 || last < first {
                    return Err(BookError::InvalidConfig(format!(
                        "{}: pdf pages must be 1-based with first <= last",
                        chapter.id
                    )));
                }
            }
        }

        self.alignment.validate()
    }

    pub fn chapter(&self, id: &str) -> Option<&ChapterSpec> {
        self.chapters.iter().find(|c| c.id == id)
    }
}

impl fmt::Display for BookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} chapters, {:?} segmentation, {}",
            self.title,
            self.chapters.len(),
            self.segmentation.strategy,
            self.alignment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "title": "Sample Book",
        "chapters": [
            {
                "id": "preface",
                "title": "Preface",
                "page_range": [11, 12],
                "source": { "heading": "PREFACE" }
            },
            {
                "id": "chapter-1",
                "title": "Bill's Story",
                "chapter_number": 1,
                "page_range": [1, 16],
                "source": { "lines": { "start": 20, "end": 40 } },
                "reference": { "lines": { "start": 16 } }
            }
        ],
        "alignment": { "accept_threshold": 0.7 },
        "segmentation": { "strategy": "page_marker" },
        "output": { "format": "json" }
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config: BookConfig = serde_json::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.chapters.len(), 2);
        assert_eq!(config.alignment.accept_threshold, 0.7);
        assert_eq!(config.alignment.exact_threshold, 0.95);
        assert_eq!(config.segmentation.strategy, SegmentationStrategy::PageMarker);
        assert_eq!(config.segmentation.reference_strategy, SegmentationStrategy::Indented);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(
            config.chapters[0].source,
            Some(ChapterBounds::Heading("PREFACE".to_string()))
        );
        assert_eq!(
            config.chapters[1].reference,
            Some(ChapterBounds::Lines { start: 16, end: None })
        );
        assert_eq!(config.chapter("chapter-1").unwrap().meta().chapter_number, Some(1));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let config = BookConfig::from_file(file.path()).unwrap();
        assert_eq!(config.title, "Sample Book");
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config: BookConfig = serde_json::from_str(SAMPLE).unwrap();
        config.alignment.exact_threshold = 0.5;
        assert!(matches!(config.validate(), Err(BookError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut config: BookConfig = serde_json::from_str(SAMPLE).unwrap();
        config.chapters[1].id = "preface".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_chapter_list() {
        assert!(BookConfig::default().validate().is_err());
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config: BookConfig = serde_json::from_str(include_str!("../configs/big-book.json")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.chapters.len(), 21);
        assert_eq!(config.output.index_name, "bigBookContent");
        assert_eq!(config.chapter("chapter-11").unwrap().page_range, PageRange::new(151, 164));
    }

    #[test]
    fn test_default_substitutions_compile() {
        for sub in CleanupConfig::default().substitutions {
            assert!(regex::Regex::new(&sub.pattern).is_ok(), "{}", sub.pattern);
        }
    }
}
