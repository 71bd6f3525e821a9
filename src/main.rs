use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use book_align::config::BookConfig;
use book_align::pipeline;

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract, align and repair book chapters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split a source document into chapter files
    Extract(ExtractArgs),
    /// Replace corrupted paragraphs with clean reference text
    Align(AlignArgs),
    /// Apply OCR repair and substitutions to chapter files
    Clean(ContentArgs),
    /// Merge split paragraphs and drop duplicates
    Repair(ContentArgs),
    /// Report consistency problems in chapter files
    Validate(ValidateArgs),
    /// List the headings of a source document
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Path to book configuration JSON file
    #[arg(long)]
    config: PathBuf,
    /// PDF, Word or text document to extract from
    #[arg(long)]
    source: PathBuf,
    /// Directory the chapter files are written to
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct AlignArgs {
    /// Path to book configuration JSON file
    #[arg(long)]
    config: PathBuf,
    /// Clean reference text of the book
    #[arg(long)]
    reference: PathBuf,
    /// Directory holding the corrupted chapter files
    #[arg(long)]
    content_dir: PathBuf,
    /// Write aligned chapters here instead of overwriting the input
    #[arg(long)]
    output: Option<PathBuf>,
    /// Report without writing any files
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ContentArgs {
    /// Path to book configuration JSON file
    #[arg(long)]
    config: PathBuf,
    /// Directory holding the chapter files
    #[arg(long)]
    content_dir: PathBuf,
    /// Report without writing any files
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Path to book configuration JSON file
    #[arg(long)]
    config: PathBuf,
    /// Directory holding the chapter files
    #[arg(long)]
    content_dir: PathBuf,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// PDF, Word or text document to inspect
    #[arg(long)]
    source: PathBuf,
    /// Optional configuration supplying running headers to strip
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract(args) => extract_command(args),
        Commands::Align(args) => align_command(args),
        Commands::Clean(args) => clean_command(args),
        Commands::Repair(args) => repair_command(args),
        Commands::Validate(args) => validate_command(args),
        Commands::Inspect(args) => inspect_command(args),
    }
}

fn load_config(path: &Path) -> Result<BookConfig> {
    info!("Loading configuration from: {:?}", path);
    let config = BookConfig::from_file(path)?;
    info!("Configuration loaded: {}", config);
    Ok(config)
}

fn extract_command(args: ExtractArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    info!("Extracting {:?} into {:?}", args.source, args.output);
    let summary = pipeline::run_extract(&config, &args.source, &args.output)?;

    if let Some(index) = &summary.index {
        info!("Index written to {:?}", index);
    }
    for id in &summary.skipped {
        warn!("Skipped chapter: {}", id);
    }
    info!("Done: {}", summary);
    Ok(())
}

fn align_command(args: AlignArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    if args.dry_run {
        info!("Dry run: no files will be written");
    }

    let summary = pipeline::run_align(
        &config,
        &args.reference,
        &args.content_dir,
        args.output.as_deref(),
        args.dry_run,
    )?;

    info!("Done: {}", summary);
    Ok(())
}

fn clean_command(args: ContentArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let summary = pipeline::run_clean(&config, &args.content_dir, args.dry_run)?;
    info!("Done: {}", summary);
    Ok(())
}

fn repair_command(args: ContentArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let summary = pipeline::run_repair(&config, &args.content_dir, args.dry_run)?;
    info!("Done: {}", summary);
    Ok(())
}

fn validate_command(args: ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let summary = pipeline::run_validate(&config, &args.content_dir)?;

    if summary.is_clean() {
        info!("All checks passed: {}", summary);
    } else {
        warn!("{}", summary);
    }
    Ok(())
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    let running_headers = match &args.config {
        Some(path) => load_config(path)?.cleanup.running_headers,
        None => Vec::new(),
    };

    let summary = pipeline::run_inspect(&args.source, &running_headers)?;
    println!("{}", summary);
    Ok(())
}
