pub mod docx_parser;
pub mod pdf_parser;
pub mod text_processor;

pub use docx_parser::extract_paragraphs_from_docx;
pub use pdf_parser::{extract_text_from_pdf, find_headings, is_likely_heading, PdfContent};
pub use text_processor::{
    clean_page_text, collapse_whitespace, join_hyphenated, merge_lines, TextCleaner,
};
