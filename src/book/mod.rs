mod chapter;
mod pages;

pub use chapter::{paragraph_id, Chapter, ChapterMeta, ParagraphRecord};
pub use pages::{distribute_pages, parse_page_label, roman_to_int, PageRange};
