use regex::Regex;
use std::sync::LazyLock;

use crate::book::{paragraph_id, ParagraphRecord};

static RE_FIRST_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["'“‘]?\s*(\w+)"#).expect("valid first word regex"));

/// How far back duplicate detection looks
const DUPLICATE_WINDOW: usize = 5;
/// Texts at or below this length never count as duplicates
const MIN_DUPLICATE_CHARS: usize = 20;

/// Counts from [`remove_duplicates`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Paragraphs dropped because a recent paragraph already contains them
    pub removed: usize,
    /// Shorter paragraphs replaced in place by a fuller one
    pub replaced: usize,
}

/// Paragraph starts with a lowercase word, so it continues the previous one
pub fn is_mid_sentence_start(text: &str) -> bool {
    if text.trim().chars().count() < 10 {
        return false;
    }
    RE_FIRST_WORD
        .captures(text)
        .and_then(|caps| caps[1].chars().next())
        .is_some_and(char::is_lowercase)
}

/// Fold mid-sentence paragraphs into the paragraph they continue.
///
/// A paragraph is merged only when it is on the same or the next page and its
/// order directly follows the paragraphs already merged. Returns the number
/// of paragraphs absorbed.
pub fn merge_mid_sentence(paragraphs: &mut Vec<ParagraphRecord>) -> usize {
    let mut merged: Vec<ParagraphRecord> = Vec::with_capacity(paragraphs.len());
    let mut absorbed = 0;
    let mut run = 0u32;

    for para in paragraphs.drain(..) {
        if let Some(current) = merged.last_mut() {
            let continues = is_mid_sentence_start(&para.content)
                && current.page_number.abs_diff(para.page_number) <= 1
                && para.order == current.order + run + 1;

            if continues {
                current.content.push(' ');
                current.content.push_str(&para.content);
                run += 1;
                absorbed += 1;
                continue;
            }
        }

        run = 0;
        merged.push(para);
    }

    *paragraphs = merged;
    absorbed
}

fn comparable(text: &str) -> String {
    text.to_lowercase().replace('\n', " ").trim().to_string()
}

/// Drop paragraphs contained in one of the last few kept paragraphs, and let a
/// fuller paragraph replace a shorter one it contains.
pub fn remove_duplicates(paragraphs: &mut Vec<ParagraphRecord>) -> DedupStats {
    let mut stats = DedupStats::default();
    let mut kept: Vec<(String, ParagraphRecord)> = Vec::with_capacity(paragraphs.len());

    for para in paragraphs.drain(..) {
        let text = comparable(&para.content);
        let long_enough = text.chars().count() > MIN_DUPLICATE_CHARS;

        let window_start = kept.len().saturating_sub(DUPLICATE_WINDOW);
        let contained = long_enough
            && kept[window_start..]
                .iter()
                .any(|(prev, _)| prev.contains(text.as_str()));
        if contained {
            stats.removed += 1;
            continue;
        }

        let shorter = kept
            .iter()
            .position(|(prev, _)| prev.chars().count() > MIN_DUPLICATE_CHARS && text.contains(prev.as_str()));
        match shorter {
            Some(idx) => {
                kept[idx] = (text, para);
                stats.replaced += 1;
            }
            None => kept.push((text, para)),
        }
    }

    *paragraphs = kept.into_iter().map(|(_, para)| para).collect();
    stats
}

/// Number orders from 1 and rebuild ids to match
pub fn renumber(chapter_id: &str, paragraphs: &mut [ParagraphRecord]) {
    for (idx, para) in paragraphs.iter_mut().enumerate() {
        let order = idx as u32 + 1;
        para.order = order;
        para.chapter_id = chapter_id.to_string();
        para.id = paragraph_id(chapter_id, order);
    }
}
