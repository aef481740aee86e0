use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mdchunk::{
    Breadcrumb, ChunkStats, ChunkerConfig, OutputFormat, chunk_with_report, load_markdown,
    read_jsonl, save_chunks, write_chunks,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

#[derive(Parser)]
#[command(name = "mdchunk")]
#[command(about = "Heading-aware, formula-safe markdown chunking")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a markdown file or every markdown file under a directory
    Chunk {
        /// Markdown file or directory
        input: PathBuf,

        /// Output file (single input) or directory (directory input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (jsonl, json, csv)
        #[arg(short, long, default_value = "jsonl")]
        format: OutputFormat,

        /// Token limit per chunk
        #[arg(long, env = "MDCHUNK_MAX_CHUNK_SIZE", default_value_t = mdchunk::config::DEFAULT_MAX_CHUNK_SIZE)]
        max_chunk_size: usize,

        /// Tokens carried over between consecutive sub-chunks
        #[arg(long, env = "MDCHUNK_OVERLAP_SIZE", default_value_t = mdchunk::config::DEFAULT_OVERLAP_SIZE)]
        overlap_size: usize,

        /// Chunks below this many tokens are merged with their neighbour
        #[arg(long, env = "MDCHUNK_MIN_CHUNK_SIZE", default_value_t = mdchunk::config::DEFAULT_MIN_CHUNK_SIZE)]
        min_chunk_size: usize,

        /// Build paths from enclosing headings only
        #[arg(long)]
        nested_paths: bool,
    },

    /// Summarize a JSONL chunk file
    Stats {
        /// Chunk file produced by `mdchunk chunk`
        input: PathBuf,

        /// Print statistics as JSON instead of a markdown report
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Chunk {
            input,
            output,
            format,
            max_chunk_size,
            overlap_size,
            min_chunk_size,
            nested_paths,
        } => {
            let breadcrumb = if nested_paths {
                Breadcrumb::Nested
            } else {
                Breadcrumb::Cumulative
            };
            let config = ChunkerConfig::new()
                .max_chunk_size(max_chunk_size)
                .overlap_size(overlap_size)
                .min_chunk_size(min_chunk_size)
                .breadcrumb(breadcrumb);
            config.validate()?;

            if input.is_dir() {
                let Some(output_dir) = output else {
                    bail!("--output <DIR> is required when the input is a directory");
                };
                chunk_directory(&input, &output_dir, format, &config)
            } else {
                chunk_file(&input, output.as_deref(), format, &config)
            }
        }
        Commands::Stats { input, json } => {
            let chunks = read_jsonl(&input)?;
            let stats = ChunkStats::from_chunks(&chunks);

            let mut stdout = io::stdout().lock();
            if json {
                writeln!(stdout, "{}", stats.to_json()?)?;
            } else {
                write!(stdout, "{}", stats.to_report())?;
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mdchunk=debug" } else { "mdchunk=info" };
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(default)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Chunk one file, writing to `output` or stdout
fn chunk_file(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    config: &ChunkerConfig,
) -> Result<()> {
    let start = Instant::now();
    let text = load_markdown(input)?;
    let (chunks, _) = chunk_with_report(&text, config)
        .with_context(|| format!("Failed to chunk {}", input.display()))?;

    match output {
        Some(path) => save_chunks(&chunks, format, path)?,
        None => {
            let mut stdout = io::stdout().lock();
            write_chunks(&chunks, format, &mut stdout)?;
            stdout.flush()?;
        }
    }

    info!(
        input = %input.display(),
        chunks = chunks.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

/// Chunk every markdown file under `input_dir`, mirroring its layout
fn chunk_directory(
    input_dir: &Path,
    output_dir: &Path,
    format: OutputFormat,
    config: &ChunkerConfig,
) -> Result<()> {
    let start = Instant::now();
    let files = collect_markdown(input_dir)?;
    if files.is_empty() {
        warn!(dir = %input_dir.display(), "no markdown files found");
        return Ok(());
    }

    let mut total_chunks = 0;
    for path in &files {
        let relative = path.strip_prefix(input_dir).unwrap_or(path);
        let target = output_dir.join(relative).with_extension(format.extension());

        let text = load_markdown(path)?;
        let (chunks, report) = chunk_with_report(&text, config)
            .with_context(|| format!("Failed to chunk {}", path.display()))?;
        save_chunks(&chunks, format, &target)?;

        info!(
            file = %relative.display(),
            sections = report.sections,
            chunks = chunks.len(),
            "chunked file"
        );
        total_chunks += chunks.len();
    }

    info!(
        files = files.len(),
        chunks = total_chunks,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

/// Markdown files under `dir`, skipping hidden directories, in path order
fn collect_markdown(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_markdown = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if is_markdown {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
