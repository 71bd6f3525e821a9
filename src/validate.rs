use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use crate::book::Chapter;

static RE_HYPHEN_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]- [a-z]").expect("valid hyphen artifact regex"));

/// Page gaps wider than this between consecutive pages are reported
const MAX_PAGE_JUMP: u32 = 5;
/// Paragraphs shorter than this are ignored by duplicate detection
const MIN_DUPLICATE_CHARS: usize = 50;
const DUPLICATE_KEY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    EmptyChapter,
    FirstPageMismatch,
    LastPageMismatch,
    PageJump,
    OrderGap,
    ChapterIdMismatch,
    DuplicateContent,
    HyphenArtifact,
    MissingSnippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub chapter_id: String,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn new(chapter_id: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.chapter_id, self.message)
    }
}

/// Checks that only need the one chapter
pub fn validate_chapter(chapter: &Chapter) -> Vec<ValidationIssue> {
    let id = chapter.id();
    let mut issues = Vec::new();

    let Some((min_page, max_page)) = chapter.observed_pages() else {
        issues.push(ValidationIssue::new(id, IssueKind::EmptyChapter, "chapter has no paragraphs"));
        return issues;
    };

    let range = chapter.meta.page_range;
    if min_page != range.first {
        issues.push(ValidationIssue::new(
            id,
            IssueKind::FirstPageMismatch,
            format!("first page is {}, declared range starts at {}", min_page, range.first),
        ));
    }
    if max_page != range.last {
        issues.push(ValidationIssue::new(
            id,
            IssueKind::LastPageMismatch,
            format!("last page is {}, declared range ends at {}", max_page, range.last),
        ));
    }

    let mut pages: Vec<u32> = chapter.paragraphs.iter().map(|p| p.page_number).collect();
    pages.sort_unstable();
    pages.dedup();
    for pair in pages.windows(2) {
        if pair[1] - pair[0] > MAX_PAGE_JUMP {
            issues.push(ValidationIssue::new(
                id,
                IssueKind::PageJump,
                format!("large page jump from {} to {}", pair[0], pair[1]),
            ));
        }
    }

    for pair in chapter.paragraphs.windows(2) {
        if pair[0].order + 1 != pair[1].order {
            issues.push(ValidationIssue::new(
                id,
                IssueKind::OrderGap,
                format!("order gap between p{} and p{}", pair[0].order, pair[1].order),
            ));
        }
    }

    for para in &chapter.paragraphs {
        if para.chapter_id != id {
            issues.push(ValidationIssue::new(
                id,
                IssueKind::ChapterIdMismatch,
                format!("paragraph {} has chapterId {:?}", para.id, para.chapter_id),
            ));
        }

        let artifacts = RE_HYPHEN_ARTIFACT.find_iter(&para.content).count();
        if artifacts > 0 {
            issues.push(ValidationIssue::new(
                id,
                IssueKind::HyphenArtifact,
                format!("paragraph {} has {} broken hyphenation(s)", para.id, artifacts),
            ));
        }
    }

    issues
}

/// Paragraphs whose opening text appears more than once across the book
pub fn check_duplicates(chapters: &[Chapter]) -> Vec<ValidationIssue> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut locations: HashMap<String, Vec<(String, u32)>> = HashMap::new();

    for chapter in chapters {
        for para in &chapter.paragraphs {
            let content = para.content.trim();
            if content.chars().count() < MIN_DUPLICATE_CHARS {
                continue;
            }
            let key: String = content.chars().take(DUPLICATE_KEY_CHARS).collect();
            let entry = locations.entry(key.clone()).or_default();
            if entry.is_empty() {
                first_seen.push(key);
            }
            entry.push((chapter.id().to_string(), para.order));
        }
    }

    first_seen
        .into_iter()
        .filter_map(|key| {
            let found = locations.get(&key)?;
            if found.len() < 2 {
                return None;
            }
            let places: Vec<String> = found
                .iter()
                .map(|(chapter_id, order)| format!("{} (p{})", chapter_id, order))
                .collect();
            Some(ValidationIssue::new(
                &found[0].0,
                IssueKind::DuplicateContent,
                format!("duplicate content in {}: {}...", places.join(", "), key),
            ))
        })
        .collect()
}

/// Chapters that do not contain the text they are known to contain
pub fn check_expected_snippets(chapters: &[Chapter], expected: &BTreeMap<String, String>) -> Vec<ValidationIssue> {
    chapters
        .iter()
        .filter_map(|chapter| {
            let snippet = expected.get(chapter.id())?;
            let all_content = chapter
                .paragraphs
                .iter()
                .map(|p| p.content.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            (!all_content.contains(snippet.as_str())).then(|| {
                ValidationIssue::new(
                    chapter.id(),
                    IssueKind::MissingSnippet,
                    format!("expected content {:?} not found", snippet),
                )
            })
        })
        .collect()
}

/// Every check over a whole book
pub fn validate_book(chapters: &[Chapter], expected: &BTreeMap<String, String>) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = chapters.iter().flat_map(validate_chapter).collect();
    issues.extend(check_duplicates(chapters));
    issues.extend(check_expected_snippets(chapters, expected));
    issues
}
