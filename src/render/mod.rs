mod json;
mod typescript;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::book::{Chapter, ChapterMeta};
use crate::config::{OutputConfig, OutputFormat};
use crate::error;

pub use json::{BookIndex, IndexEntry, JsonFormat};
pub use typescript::{escape_ts_string, export_ident, unescape_ts_string, TypeScriptFormat};

/// Base name of the index file in an output directory
pub const INDEX_STEM: &str = "index";

/// A serialization of chapters and their index
pub trait ChapterFormat {
    fn extension(&self) -> &'static str;

    fn render_chapter(&self, chapter: &Chapter) -> error::Result<String>;

    /// Index over `chapters` in reading order
    fn render_index(&self, title: &str, chapters: &[ChapterMeta]) -> error::Result<String>;

    fn parse_chapter(&self, text: &str) -> error::Result<Chapter>;
}

pub fn format_for(config: &OutputConfig) -> Box<dyn ChapterFormat> {
    match config.format {
        OutputFormat::Typescript => Box::new(TypeScriptFormat::new(config)),
        OutputFormat::Json => Box::new(JsonFormat),
    }
}

pub fn chapter_path(dir: &Path, chapter_id: &str, format: &dyn ChapterFormat) -> PathBuf {
    dir.join(format!("{}.{}", chapter_id, format.extension()))
}

/// Write one chapter file, creating `dir` if needed
pub fn write_chapter(dir: &Path, chapter: &Chapter, format: &dyn ChapterFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let path = chapter_path(dir, chapter.id(), format);
    write_chapter_to(&path, chapter, format)?;
    Ok(path)
}

/// Overwrite the chapter file at `path`
pub fn write_chapter_to(path: &Path, chapter: &Chapter, format: &dyn ChapterFormat) -> Result<()> {
    let text = format
        .render_chapter(chapter)
        .with_context(|| format!("Failed to render chapter {}", chapter.id()))?;

    fs::write(path, text).with_context(|| format!("Failed to write chapter file: {:?}", path))?;

    info!("Wrote {} paragraphs to {:?}", chapter.paragraphs.len(), path);
    Ok(())
}

pub fn write_index(dir: &Path, title: &str, chapters: &[ChapterMeta], format: &dyn ChapterFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let path = dir.join(format!("{}.{}", INDEX_STEM, format.extension()));
    let text = format
        .render_index(title, chapters)
        .with_context(|| "Failed to render index")?;

    fs::write(&path, text).with_context(|| format!("Failed to write index file: {:?}", path))?;

    info!("Index of {} chapters written to {:?}", chapters.len(), path);
    Ok(path)
}

pub fn read_chapter_file(path: &Path, format: &dyn ChapterFormat) -> Result<Chapter> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read chapter file: {:?}", path))?;

    format
        .parse_chapter(&text)
        .with_context(|| format!("Failed to parse chapter file: {:?}", path))
}

/// Chapter files directly inside `dir`, sorted by name, index excluded
pub fn find_chapter_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!("Content directory does not exist: {:?}", dir);
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .filter(|path| path.file_stem().and_then(|s| s.to_str()) != Some(INDEX_STEM))
        .collect();

    files.sort();
    Ok(files)
}
