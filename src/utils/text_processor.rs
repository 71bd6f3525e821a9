use regex::{Captures, Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::config::CleanupConfig;
use crate::error::{BookError, Result};

static RE_PAGE_NUMBER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[ \t]*$").expect("valid page number regex"));
// Lowercase front-matter page numbers up to cccxcix
static RE_ROMAN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*c{0,3}(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})[ \t]*$").expect("valid roman regex")
});
static RE_HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)-[ \t]*\n\s*(\w+)").expect("valid hyphen break regex"));
static RE_HYPHEN_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])-\s+([a-z])").expect("valid hyphen regex"));
static RE_HYPHEN_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])-\s+([A-Z])").expect("valid hyphen regex"));
static RE_SPLIT_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z])\s+([a-z]{1,2})\s+([a-z])").expect("valid split letter regex")
});
static RE_LETTER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z])\s+([a-z])\b").expect("valid letter pair regex"));
static RE_MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid space regex"));
static RE_SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,;:!?])").expect("valid punctuation regex"));

/// Collapse every whitespace run (newlines included) to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rejoin words hyphenated across a line break: `"some-\nthing"` -> `"something"`
pub fn join_hyphenated(text: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(text, "$1$2").into_owned()
}

/// Clean the raw text of one extracted page.
///
/// Drops bare page numbers (arabic or roman) and running-header lines, repairs
/// hyphenation across line breaks, trims lines and keeps at most one blank
/// line between blocks so paragraph breaks survive.
pub fn clean_page_text(text: &str, running_headers: &[String]) -> String {
    let text = text.replace("\r\n", "\n");
    let text = RE_PAGE_NUMBER_LINE.replace_all(&text, "");
    let mut text = RE_ROMAN_LINE.replace_all(&text, "").into_owned();

    for header in running_headers {
        if header.trim().is_empty() {
            continue;
        }
        let pattern = format!(r"(?m)^[ \t]*{}[ \t]*$", regex::escape(header.trim()));
        if let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() {
            text = re.replace_all(&text, "").into_owned();
        }
    }

    let text = join_hyphenated(&text);

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Merge the lines of one paragraph, repairing hyphenation and `--` dashes
pub fn merge_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut iter = lines.iter().map(|l| l.as_ref().trim());
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut result = first.to_string();
    for line in iter {
        if line.is_empty() {
            continue;
        }
        if result.ends_with('-') && !result.ends_with("--") {
            result.pop();
            result.push_str(line);
        } else {
            result.push(' ');
            result.push_str(line);
        }
    }

    let result = RE_HYPHEN_LOWER.replace_all(&result, "$1$2");
    let result = RE_HYPHEN_UPPER.replace_all(&result, "$1$2");
    result.replace("--", "—").trim().to_string()
}

/// OCR artifact repair driven by the cleanup section of the config
#[derive(Debug, Clone)]
pub struct TextCleaner {
    substitutions: Vec<(Regex, String)>,
    ocr_repair: bool,
}

impl TextCleaner {
    pub fn new(config: &CleanupConfig) -> Result<Self> {
        let substitutions = config
            .substitutions
            .iter()
            .map(|sub| {
                RegexBuilder::new(&sub.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, sub.replacement.clone()))
                    .map_err(|e| {
                        BookError::InvalidConfig(format!("bad substitution {:?}: {}", sub.pattern, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            substitutions,
            ocr_repair: config.ocr_repair,
        })
    }

    /// Repair one paragraph of OCR output
    pub fn repair(&self, text: &str) -> String {
        let mut text = text.to_string();

        if self.ocr_repair {
            for _ in 0..3 {
                text = RE_SPLIT_LETTERS.replace_all(&text, "$1$2$3").into_owned();
            }
            text = RE_LETTER_PAIR.replace_all(&text, "$1$2").into_owned();
        }

        for (re, replacement) in &self.substitutions {
            text = re
                .replace_all(&text, |caps: &Captures| match_case(&caps[0], replacement))
                .into_owned();
        }

        let text = RE_MULTI_SPACE.replace_all(&text, " ");
        let text = RE_SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
        text.trim().to_string()
    }
}

/// Give `replacement` the capitalization of the matched text
fn match_case(matched: &str, replacement: &str) -> String {
    let has_letters = matched.chars().any(char::is_alphabetic);
    if has_letters && matched.chars().count() > 1 && !matched.chars().any(char::is_lowercase) {
        return replacement.to_uppercase();
    }

    let starts_upper = matched.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
