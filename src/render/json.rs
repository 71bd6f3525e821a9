use serde::{Deserialize, Serialize};

use super::ChapterFormat;
use crate::book::{Chapter, ChapterMeta};
use crate::error::Result;

/// One chapter in the JSON index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(flatten)]
    pub meta: ChapterMeta,
    /// File name of the chapter relative to the index
    pub file: String,
}

/// Contents of `index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookIndex {
    pub title: String,
    pub chapters: Vec<IndexEntry>,
}

impl BookIndex {
    pub fn get(&self, chapter_id: &str) -> Option<&IndexEntry> {
        self.chapters.iter().find(|entry| entry.meta.id == chapter_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.chapters.iter().map(|entry| entry.meta.id.as_str())
    }
}

/// Pretty-printed JSON, the same shape the TypeScript modules export
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ChapterFormat for JsonFormat {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render_chapter(&self, chapter: &Chapter) -> Result<String> {
        let mut text = serde_json::to_string_pretty(chapter)?;
        text.push('\n');
        Ok(text)
    }

    fn render_index(&self, title: &str, chapters: &[ChapterMeta]) -> Result<String> {
        let index = BookIndex {
            title: title.to_string(),
            chapters: chapters
                .iter()
                .map(|meta| IndexEntry {
                    meta: meta.clone(),
                    file: format!("{}.{}", meta.id, self.extension()),
                })
                .collect(),
        };

        let mut text = serde_json::to_string_pretty(&index)?;
        text.push('\n');
        Ok(text)
    }

    fn parse_chapter(&self, text: &str) -> Result<Chapter> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::PageRange;

    fn chapter() -> Chapter {
        let meta = ChapterMeta {
            id: "chapter-5".to_string(),
            title: "How It Works".to_string(),
            chapter_number: Some(5),
            page_range: PageRange::new(58, 71),
        };
        Chapter::from_pages(meta, vec![(58, "Rarely have we seen a person fail who has thoroughly followed our path.")])
    }

    #[test]
    fn test_chapter_reads_back() {
        let text = JsonFormat.render_chapter(&chapter()).unwrap();
        assert!(text.contains("\"chapterNumber\": 5"));
        assert_eq!(JsonFormat.parse_chapter(&text).unwrap(), chapter());
    }

    #[test]
    fn test_index_lookup() {
        let text = JsonFormat
            .render_index("Alcoholics Anonymous", &[chapter().meta])
            .unwrap();
        let index: BookIndex = serde_json::from_str(&text).unwrap();

        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["chapter-5"]);
        let entry = index.get("chapter-5").unwrap();
        assert_eq!(entry.file, "chapter-5.json");
        assert_eq!(entry.meta.page_range, PageRange::new(58, 71));
        assert!(index.get("chapter-6").is_none());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(JsonFormat.parse_chapter("[1, 2").is_err());
    }
}
