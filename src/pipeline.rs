// Runs behind each CLI command; each returns a summary

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::align::{AlignmentEvent, ParagraphAligner};
use crate::book::{Chapter, ChapterMeta};
use crate::config::{BookConfig, ChapterBounds, ChapterSpec};
use crate::data::{slice_chapter, SourceDocument, SourceKind};
use crate::render::{
    chapter_path, find_chapter_files, format_for, read_chapter_file, write_chapter, write_chapter_to, write_index,
    ChapterFormat,
};
use crate::repair::{merge_mid_sentence, remove_duplicates, renumber};
use crate::segment::{assign_pages, segmenter_for};
use crate::utils::{find_headings, TextCleaner};
use crate::validate::{validate_book, ValidationIssue};

#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    pub chapters: usize,
    pub paragraphs: usize,
    pub skipped: Vec<String>,
    pub index: Option<PathBuf>,
}

impl fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extracted {} chapters ({} paragraphs), skipped {}",
            self.chapters,
            self.paragraphs,
            self.skipped.len()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlignSummary {
    pub chapters: usize,
    pub processed: usize,
    pub exact: usize,
    pub fixed: usize,
    pub unmatched: usize,
    pub skipped: Vec<String>,
}

impl fmt::Display for AlignSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aligned {} chapters: {} paragraphs, {} exact, {} fixed, {} unmatched, skipped {}",
            self.chapters,
            self.processed,
            self.exact,
            self.fixed,
            self.unmatched,
            self.skipped.len()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    pub chapters: usize,
    pub paragraphs: usize,
    pub changed: usize,
}

impl fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cleaned {} chapters: {} of {} paragraphs changed",
            self.chapters, self.changed, self.paragraphs
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    pub chapters: usize,
    pub before: usize,
    pub after: usize,
    pub merged: usize,
    pub removed: usize,
    pub replaced: usize,
}

impl fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "repaired {} chapters: {} -> {} paragraphs ({} merged, {} duplicates removed, {} replaced)",
            self.chapters, self.before, self.after, self.merged, self.removed, self.replaced
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidateSummary {
    pub chapters: usize,
    pub paragraphs: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidateSummary {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validated {} chapters ({} paragraphs): {} issues",
            self.chapters,
            self.paragraphs,
            self.issues.len()
        )
    }
}

#[derive(Debug, Clone)]
pub struct InspectSummary {
    pub kind: SourceKind,
    pub lines: usize,
    pub pages: usize,
    /// Line index and text of every heading-like line
    pub headings: Vec<(usize, String)>,
}

impl fmt::Display for InspectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:?} document: {} lines, {} pages, {} headings",
            self.kind,
            self.lines,
            self.pages,
            self.headings.len()
        )?;
        for (idx, heading) in &self.headings {
            writeln!(f, "  {:>6}  {}", idx, heading)?;
        }
        Ok(())
    }
}

/// Bounds of the next chapter that has bounds of the same role
fn next_bounds<'a>(
    chapters: &'a [ChapterSpec],
    idx: usize,
    role: fn(&ChapterSpec) -> Option<&ChapterBounds>,
) -> Option<&'a ChapterBounds> {
    chapters[idx + 1..].iter().find_map(role)
}

fn source_bounds(spec: &ChapterSpec) -> Option<&ChapterBounds> {
    spec.source.as_ref()
}

fn reference_bounds(spec: &ChapterSpec) -> Option<&ChapterBounds> {
    spec.reference.as_ref()
}

/// Segment a source document into chapter files plus an index
pub fn run_extract(config: &BookConfig, source: &Path, output: &Path) -> Result<ExtractSummary> {
    let document = SourceDocument::load(source, &config.cleanup.running_headers)?;
    let segmenter = segmenter_for(config.segmentation.strategy, &config.segmentation);
    let format = format_for(&config.output);

    let mut summary = ExtractSummary::default();
    let mut written: Vec<ChapterMeta> = Vec::new();

    for (idx, spec) in config.chapters.iter().enumerate() {
        let Some(bounds) = spec.source.as_ref() else {
            warn!("{}: no source bounds configured, skipping", spec.id);
            summary.skipped.push(spec.id.clone());
            continue;
        };

        let next = next_bounds(&config.chapters, idx, source_bounds);
        let Some(lines) = slice_chapter(&document, bounds, next, spec.page_range) else {
            warn!("{}: chapter not found in {:?}, skipping", spec.id, source);
            summary.skipped.push(spec.id.clone());
            continue;
        };

        let meta = spec.meta();
        let segments = segmenter.segment(&lines);
        debug!("{}: {} lines -> {} segments", spec.id, lines.len(), segments.len());

        let paragraphs = assign_pages(segments, &meta, config.segmentation.min_paragraph_chars);
        let chapter = Chapter::from_pages(meta, paragraphs);
        if chapter.paragraphs.is_empty() {
            warn!("{}: no paragraphs extracted", spec.id);
        }

        info!("{}: {} paragraphs", spec.id, chapter.paragraphs.len());
        write_chapter(output, &chapter, format.as_ref())?;

        summary.chapters += 1;
        summary.paragraphs += chapter.paragraphs.len();
        written.push(chapter.meta);
    }

    if !written.is_empty() {
        summary.index = Some(write_index(output, &config.title, &written, format.as_ref())?);
    }

    Ok(summary)
}

/// Replace corrupted chapter text with the matching clean reference paragraphs
pub fn run_align(
    config: &BookConfig,
    reference: &Path,
    content_dir: &Path,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<AlignSummary> {
    let document = SourceDocument::load(reference, &config.cleanup.running_headers)
        .with_context(|| format!("Failed to load reference text: {:?}", reference))?;
    let segmenter = segmenter_for(config.segmentation.reference_strategy, &config.segmentation);
    let aligner = ParagraphAligner::new(config.alignment.clone());
    let format = format_for(&config.output);

    info!("Aligning with {}", aligner.policy());

    let mut summary = AlignSummary::default();
    let mut found_any = false;

    for (idx, spec) in config.chapters.iter().enumerate() {
        let path = chapter_path(content_dir, &spec.id, format.as_ref());
        if !path.exists() {
            warn!("{}: chapter file not found: {:?}", spec.id, path);
            summary.skipped.push(spec.id.clone());
            continue;
        }
        found_any = true;

        let mut chapter = match read_chapter_file(&path, format.as_ref()) {
            Ok(chapter) => chapter,
            Err(e) => {
                warn!("{}: {:#}", spec.id, e);
                summary.skipped.push(spec.id.clone());
                continue;
            }
        };

        let Some(bounds) = spec.reference.as_ref() else {
            warn!("{}: no reference bounds configured, skipping", spec.id);
            summary.skipped.push(spec.id.clone());
            continue;
        };
        let next = next_bounds(&config.chapters, idx, reference_bounds);
        let Some(lines) = slice_chapter(&document, bounds, next, spec.page_range) else {
            warn!("{}: chapter not found in reference {:?}, skipping", spec.id, reference);
            summary.skipped.push(spec.id.clone());
            continue;
        };

        let clean: Vec<String> = segmenter
            .segment(&lines)
            .into_iter()
            .map(|segment| segment.content)
            .collect();

        info!(
            "{}: {} corrupted vs {} reference paragraphs",
            spec.id,
            chapter.paragraphs.len(),
            clean.len()
        );

        let report = aligner.align(&chapter.paragraphs, &clean);
        for event in &report.events {
            match event {
                AlignmentEvent::Fixed { order, page_number, score } => {
                    info!("{}: fixed p{} (page {}), similarity {:.2}", spec.id, order, page_number, score);
                }
                AlignmentEvent::Unmatched { order, page_number, best_score } => {
                    warn!(
                        "{}: no match for p{} (page {}), best {:.2}; keeping original",
                        spec.id, order, page_number, best_score
                    );
                }
            }
        }

        summary.chapters += 1;
        summary.processed += report.processed();
        summary.exact += report.exact_count();
        summary.fixed += report.fixed_count();
        summary.unmatched += report.unmatched_count();

        chapter.meta = spec.meta();
        chapter.paragraphs = report.into_paragraphs(&spec.id);

        if dry_run {
            info!("{}: dry run, not writing", spec.id);
            continue;
        }
        match output {
            Some(dir) => {
                write_chapter(dir, &chapter, format.as_ref())?;
            }
            None => write_chapter_to(&path, &chapter, format.as_ref())?,
        }
    }

    if !found_any {
        anyhow::bail!("No chapter files found in {:?}", content_dir);
    }

    Ok(summary)
}

/// Chapter files of the configured format, failing when there are none
fn load_chapters(config: &BookConfig, content_dir: &Path) -> Result<(Box<dyn ChapterFormat>, Vec<(PathBuf, Chapter)>)> {
    let format = format_for(&config.output);
    let files = find_chapter_files(content_dir, format.extension())?;
    if files.is_empty() {
        anyhow::bail!("No chapter files found in {:?}", content_dir);
    }

    let mut chapters = Vec::with_capacity(files.len());
    for path in files {
        match read_chapter_file(&path, format.as_ref()) {
            Ok(chapter) => chapters.push((path, chapter)),
            Err(e) => warn!("Skipping {:?}: {:#}", path, e),
        }
    }

    Ok((format, chapters))
}

/// Apply OCR repair and the substitution table to every paragraph
pub fn run_clean(config: &BookConfig, content_dir: &Path, dry_run: bool) -> Result<CleanSummary> {
    let cleaner = TextCleaner::new(&config.cleanup)?;
    let (format, chapters) = load_chapters(config, content_dir)?;

    let mut summary = CleanSummary::default();
    for (path, mut chapter) in chapters {
        let mut changed = 0;
        for para in &mut chapter.paragraphs {
            let cleaned = cleaner.repair(&para.content);
            if cleaned != para.content {
                para.content = cleaned;
                changed += 1;
            }
        }

        info!("{}: {} of {} paragraphs changed", chapter.id(), changed, chapter.paragraphs.len());
        summary.chapters += 1;
        summary.paragraphs += chapter.paragraphs.len();
        summary.changed += changed;

        if !dry_run && changed > 0 {
            write_chapter_to(&path, &chapter, format.as_ref())?;
        }
    }

    Ok(summary)
}

/// Merge mid-sentence splits, drop duplicate fragments and renumber
pub fn run_repair(config: &BookConfig, content_dir: &Path, dry_run: bool) -> Result<RepairSummary> {
    let (format, chapters) = load_chapters(config, content_dir)?;

    let mut summary = RepairSummary::default();
    for (path, mut chapter) in chapters {
        let before = chapter.paragraphs.len();
        let merged = merge_mid_sentence(&mut chapter.paragraphs);
        let dedup = remove_duplicates(&mut chapter.paragraphs);
        let id = chapter.id().to_string();
        renumber(&id, &mut chapter.paragraphs);

        info!(
            "{}: {} -> {} paragraphs ({} merged, {} removed, {} replaced)",
            id,
            before,
            chapter.paragraphs.len(),
            merged,
            dedup.removed,
            dedup.replaced
        );

        summary.chapters += 1;
        summary.before += before;
        summary.after += chapter.paragraphs.len();
        summary.merged += merged;
        summary.removed += dedup.removed;
        summary.replaced += dedup.replaced;

        if !dry_run {
            write_chapter_to(&path, &chapter, format.as_ref())?;
        }
    }

    Ok(summary)
}

/// Run every consistency check over the chapter files
pub fn run_validate(config: &BookConfig, content_dir: &Path) -> Result<ValidateSummary> {
    let (_, chapters) = load_chapters(config, content_dir)?;
    let chapters: Vec<Chapter> = chapters.into_iter().map(|(_, chapter)| chapter).collect();

    for spec in &config.chapters {
        if !chapters.iter().any(|c| c.id() == spec.id) {
            warn!("{}: configured chapter has no file in {:?}", spec.id, content_dir);
        }
    }

    let issues = validate_book(&chapters, &config.expected_snippets);
    for issue in &issues {
        warn!("{}", issue);
    }

    Ok(ValidateSummary {
        chapters: chapters.len(),
        paragraphs: chapters.iter().map(|c| c.paragraphs.len()).sum(),
        issues,
    })
}

/// List a document's shape and heading-like lines, for writing chapter bounds
pub fn run_inspect(source: &Path, running_headers: &[String]) -> Result<InspectSummary> {
    let document = SourceDocument::load(source, running_headers)?;
    let headings = find_headings(&document.lines);

    Ok(InspectSummary {
        kind: document.kind,
        lines: document.lines.len(),
        pages: document.pages.len(),
        headings,
    })
}
