// A .docx is a ZIP archive; body text lives in word/document.xml

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;
use zip::ZipArchive;

use crate::error::{BookError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract every body paragraph of a Word document, in document order
pub fn extract_paragraphs_from_docx(path: &Path) -> Result<Vec<String>> {
    info!("Extracting paragraphs from Word document: {:?}", path);

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let xml = match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            let mut s = String::new();
            part.read_to_string(&mut s)?;
            s
        }
        Err(_) => {
            return Err(BookError::InvalidDocument(format!(
                "{} not found in archive",
                DOCUMENT_PART
            )))
        }
    };

    let paragraphs = parse_document_xml(&xml)?;
    info!("Document has {} paragraphs", paragraphs.len());

    Ok(paragraphs)
}

/// Flatten WordprocessingML into one string per `w:p`.
///
/// `w:tab` becomes a tab and `w:br`/`w:cr` a space. Paragraphs nested in text
/// boxes are emitted before the paragraph that contains them.
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut in_text = false;
    // tab stop definitions in paragraph properties are not text
    let mut in_tab_stops = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => stack.push(String::new()),
                b"w:t" => in_text = true,
                b"w:tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if !in_tab_stops => {
                    if let Some(current) = stack.last_mut() {
                        current.push('\t');
                    }
                }
                b"w:br" | b"w:cr" => {
                    if let Some(current) = stack.last_mut() {
                        current.push(' ');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(current) = stack.last_mut() {
                    current.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => {
                    if let Some(done) = stack.pop() {
                        paragraphs.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
