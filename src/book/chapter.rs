use serde::{Deserialize, Serialize};

use super::pages::PageRange;

/// Chapter record without paragraph content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMeta {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    pub page_range: PageRange,
}

/// One unit of body text tagged with its page and position in the chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphRecord {
    pub id: String,
    pub chapter_id: String,
    pub page_number: u32,
    pub order: u32,
    pub content: String,
}

impl ParagraphRecord {
    pub fn new(chapter_id: &str, page_number: u32, order: u32, content: impl Into<String>) -> Self {
        Self {
            id: paragraph_id(chapter_id, order),
            chapter_id: chapter_id.to_string(),
            page_number,
            order,
            content: content.into(),
        }
    }
}

/// Chapter record with its ordered paragraphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(flatten)]
    pub meta: ChapterMeta,
    pub paragraphs: Vec<ParagraphRecord>,
}

impl Chapter {
    pub fn new(meta: ChapterMeta) -> Self {
        Self {
            meta,
            paragraphs: Vec::new(),
        }
    }

    /// Build a chapter from `(page, content)` pairs, numbering paragraphs from 1
    pub fn from_pages<I, S>(meta: ChapterMeta, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let paragraphs = paragraphs
            .into_iter()
            .enumerate()
            .map(|(idx, (page, content))| {
                ParagraphRecord::new(&meta.id, page, idx as u32 + 1, content)
            })
            .collect();

        Self { meta, paragraphs }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    /// Lowest and highest page numbers actually present
    pub fn observed_pages(&self) -> Option<(u32, u32)> {
        let min = self.paragraphs.iter().map(|p| p.page_number).min()?;
        let max = self.paragraphs.iter().map(|p| p.page_number).max()?;
        Some((min, max))
    }
}

/// Paragraph ids take the form `{chapter}-p{order}`
pub fn paragraph_id(chapter_id: &str, order: u32) -> String {
    format!("{}-p{}", chapter_id, order)
}
