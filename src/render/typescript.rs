use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

use super::ChapterFormat;
use crate::book::{Chapter, ChapterMeta, PageRange, ParagraphRecord};
use crate::config::OutputConfig;
use crate::error::{BookError, Result};

static RE_CHAPTER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bid:\s*'((?:[^'\\]|\\.)*)'").expect("valid chapter id regex"));
static RE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btitle:\s*'((?:[^'\\]|\\.)*)'").expect("valid title regex"));
static RE_CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bchapterNumber:\s*(\d+)").expect("valid chapter number regex"));
static RE_PAGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpageRange:\s*\[(\d+),\s*(\d+)\]").expect("valid page range regex"));
static RE_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\{\s*id:\s*'((?:[^'\\]|\\.)*)',\s*chapterId:\s*'((?:[^'\\]|\\.)*)',\s*pageNumber:\s*(\d+),\s*order:\s*(\d+),\s*content:\s*'((?:[^'\\]|\\.)*)'",
    )
    .expect("valid paragraph regex")
});

/// Escape text for a single-quoted TypeScript string literal
pub fn escape_ts_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            // line terminators inside a string literal
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_ts_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Identifier a chapter is exported under: `chapter-1` -> `chapter_1`
pub fn export_ident(chapter_id: &str) -> String {
    let ident: String = chapter_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();

    if ident.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        format!("_{}", ident)
    } else {
        ident
    }
}

/// TypeScript modules exporting one typed constant per chapter
#[derive(Debug, Clone)]
pub struct TypeScriptFormat {
    type_name: String,
    type_import: String,
    index_name: String,
}

impl TypeScriptFormat {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            type_name: config.type_name.clone(),
            type_import: config.type_import.clone(),
            index_name: config.index_name.clone(),
        }
    }

    fn import_line(&self) -> String {
        format!("import {{ {} }} from '{}';", self.type_name, self.type_import)
    }
}

impl ChapterFormat for TypeScriptFormat {
    fn extension(&self) -> &'static str {
        "ts"
    }

    fn render_chapter(&self, chapter: &Chapter) -> Result<String> {
        let meta = &chapter.meta;
        let range = meta.page_range;
        let mut out = String::new();

        // writing into a String cannot fail
        let _ = writeln!(out, "{}", self.import_line());
        out.push('\n');
        out.push_str("/**\n");
        let _ = writeln!(out, " * {}", meta.title.replace("*/", "* /"));
        if let Some(number) = meta.chapter_number {
            let _ = writeln!(out, " * Chapter {}", number);
        }
        out.push_str(" *\n");
        let _ = writeln!(out, " * Pages {}–{}", range.first, range.last);
        out.push_str(" */\n\n");

        let _ = writeln!(out, "export const {}: {} = {{", export_ident(&meta.id), self.type_name);
        let _ = writeln!(out, "  id: '{}',", escape_ts_string(&meta.id));
        let _ = writeln!(out, "  title: '{}',", escape_ts_string(&meta.title));
        if let Some(number) = meta.chapter_number {
            let _ = writeln!(out, "  chapterNumber: {},", number);
        }
        let _ = writeln!(out, "  pageRange: [{}, {}],", range.first, range.last);
        out.push_str("  paragraphs: [\n");

        for para in &chapter.paragraphs {
            out.push_str("    {\n");
            let _ = writeln!(out, "      id: '{}',", escape_ts_string(&para.id));
            let _ = writeln!(out, "      chapterId: '{}',", escape_ts_string(&para.chapter_id));
            let _ = writeln!(out, "      pageNumber: {},", para.page_number);
            let _ = writeln!(out, "      order: {},", para.order);
            let _ = writeln!(out, "      content: '{}',", escape_ts_string(&para.content));
            out.push_str("    },\n");
        }

        out.push_str("  ],\n};\n");
        Ok(out)
    }

    fn render_index(&self, title: &str, chapters: &[ChapterMeta]) -> Result<String> {
        let mut out = String::new();

        out.push_str("/**\n");
        let _ = writeln!(out, " * {} content index", title.replace("*/", "* /"));
        out.push_str(" */\n\n");
        let _ = writeln!(out, "{}", self.import_line());
        out.push('\n');

        for meta in chapters {
            let _ = writeln!(out, "import {{ {} }} from './{}';", export_ident(&meta.id), meta.id);
        }
        out.push('\n');

        let _ = writeln!(
            out,
            "export const {}: Record<string, {}> = {{",
            self.index_name, self.type_name
        );
        for meta in chapters {
            let _ = writeln!(out, "  '{}': {},", escape_ts_string(&meta.id), export_ident(&meta.id));
        }
        out.push_str("};\n\n");

        out.push_str("/**\n * Get a specific chapter by ID\n */\n");
        let _ = writeln!(
            out,
            "export function getChapter(chapterId: string): {} | undefined {{",
            self.type_name
        );
        let _ = writeln!(out, "  return {}[chapterId];", self.index_name);
        out.push_str("}\n\n");

        out.push_str("/**\n * Get all chapters in reading order\n */\n");
        let _ = writeln!(out, "export function getAllChapters(): {}[] {{", self.type_name);
        let _ = writeln!(out, "  return Object.values({});", self.index_name);
        out.push_str("}\n");

        Ok(out)
    }

    fn parse_chapter(&self, text: &str) -> Result<Chapter> {
        let id = RE_CHAPTER_ID
            .captures(text)
            .map(|caps| unescape_ts_string(&caps[1]))
            .ok_or_else(|| BookError::MalformedChapter("missing chapter id".to_string()))?;

        let title = RE_TITLE
            .captures(text)
            .map(|caps| unescape_ts_string(&caps[1]))
            .unwrap_or_default();

        let chapter_number = RE_CHAPTER_NUMBER
            .captures(text)
            .and_then(|caps| caps[1].parse().ok());

        let page_range = RE_PAGE_RANGE
            .captures(text)
            .and_then(|caps| Some(PageRange::new(caps[1].parse().ok()?, caps[2].parse().ok()?)))
            .ok_or_else(|| BookError::MalformedChapter(format!("{}: missing pageRange", id)))?;

        let paragraphs = RE_PARAGRAPH
            .captures_iter(text)
            .map(|caps| {
                let number = |idx: usize| {
                    caps[idx].parse::<u32>().map_err(|e| {
                        BookError::MalformedChapter(format!("{}: bad number {:?}: {}", id, &caps[idx], e))
                    })
                };
                Ok(ParagraphRecord {
                    id: unescape_ts_string(&caps[1]),
                    chapter_id: unescape_ts_string(&caps[2]),
                    page_number: number(3)?,
                    order: number(4)?,
                    content: unescape_ts_string(&caps[5]),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Chapter {
            meta: ChapterMeta {
                id,
                title,
                chapter_number,
                page_range,
            },
            paragraphs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> TypeScriptFormat {
        TypeScriptFormat::new(&OutputConfig::default())
    }

    fn chapter() -> Chapter {
        let meta = ChapterMeta {
            id: "doctors-opinion".to_string(),
            title: "The Doctor's Opinion".to_string(),
            chapter_number: None,
            page_range: PageRange::new(23, 30),
        };
        Chapter::from_pages(
            meta,
            vec![
                (23, "We of Alcoholics Anonymous believe that the reader will be interested."),
                (24, "It said: \"the patient's\nown words\" \\ nothing more."),
            ],
        )
    }

    #[test]
    fn test_escape_and_unescape() {
        let raw = "It's a \\ path\nnext";
        let escaped = escape_ts_string(raw);
        assert_eq!(escaped, "It\\'s a \\\\ path\\nnext");
        assert_eq!(unescape_ts_string(&escaped), raw);
        assert_eq!(unescape_ts_string("say \\\"hi\\\""), "say \"hi\"");
    }

    #[test]
    fn test_escape_line_terminators() {
        let raw = "one\r\ntwo\u{2028}three\u{2029}four";
        let escaped = escape_ts_string(raw);
        assert_eq!(escaped, "one\\r\\ntwo\\u2028three\\u2029four");
        assert!(!escaped.contains(&['\r', '\n', '\u{2028}', '\u{2029}'][..]));
        assert_eq!(unescape_ts_string(&escaped), raw);
        assert_eq!(unescape_ts_string("\\u00e9t\\u00e9"), "\u{e9}t\u{e9}");
    }

    #[test]
    fn test_export_ident() {
        assert_eq!(export_ident("chapter-1"), "chapter_1");
        assert_eq!(export_ident("doctors-opinion"), "doctors_opinion");
        assert_eq!(export_ident("1st-foreword"), "_1st_foreword");
    }

    #[test]
    fn test_render_chapter_layout() {
        let text = format().render_chapter(&chapter()).unwrap();
        assert!(text.starts_with("import { BookChapter } from '@/types/book';\n"));
        assert!(text.contains(" * The Doctor's Opinion\n"));
        assert!(text.contains(" * Pages 23–30\n"));
        assert!(text.contains("export const doctors_opinion: BookChapter = {"));
        assert!(text.contains("  title: 'The Doctor\\'s Opinion',"));
        assert!(!text.contains("chapterNumber"));
        assert!(text.contains("      id: 'doctors-opinion-p2',"));
        assert!(text.ends_with("  ],\n};\n"));
    }

    #[test]
    fn test_parse_reads_back_rendered_chapter() {
        let original = chapter();
        let text = format().render_chapter(&original).unwrap();
        assert_eq!(format().parse_chapter(&text).unwrap(), original);
    }

    #[test]
    fn test_parse_hand_written_module() {
        let text = "import { BigBookChapter } from '@/types/bigbook-v2';\n\
                    export const chapter_1: BigBookChapter = {\n\
                    \x20 id: 'chapter-1',\n\
                    \x20 title: 'Bill\\'s Story',\n\
                    \x20 chapterNumber: 1,\n\
                    \x20 pageRange: [1, 16],\n\
                    \x20 paragraphs: [\n\
                    \x20   { id: 'chapter-1-p1', chapterId: 'chapter-1', pageNumber: 1, order: 1, content: 'WAR FEVER ran high.' },\n\
                    \x20 ],\n\
                    };\n";

        let chapter = format().parse_chapter(text).unwrap();
        assert_eq!(chapter.meta.title, "Bill's Story");
        assert_eq!(chapter.meta.chapter_number, Some(1));
        assert_eq!(chapter.paragraphs.len(), 1);
        assert_eq!(chapter.paragraphs[0].content, "WAR FEVER ran high.");
    }

    #[test]
    fn test_parse_missing_page_range_is_error() {
        let text = "export const x = { id: 'x', title: 'X', paragraphs: [] };";
        assert!(matches!(
            format().parse_chapter(text),
            Err(BookError::MalformedChapter(_))
        ));
    }

    #[test]
    fn test_render_index() {
        let metas = vec![chapter().meta];
        let text = format().render_index("Alcoholics Anonymous", &metas).unwrap();
        assert!(text.contains("import { doctors_opinion } from './doctors-opinion';"));
        assert!(text.contains("export const bookContent: Record<string, BookChapter> = {"));
        assert!(text.contains("  'doctors-opinion': doctors_opinion,"));
        assert!(text.contains("export function getChapter(chapterId: string): BookChapter | undefined {"));
        assert!(text.contains("export function getAllChapters(): BookChapter[] {"));
    }
}
