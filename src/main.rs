//! charter: chunk a converted constitution for indexing.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use charter::{ChunkOptions, ChunkPipeline, Document};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "charter")]
#[command(about = "Header-aware markdown chunking for legal-document RAG")]
#[command(version)]
struct Cli {
    /// TOML file with chunking options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a markdown file and print one JSON chunk per line
    Chunk {
        /// Markdown file to chunk
        path: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Pretty-print each chunk
        #[arg(long)]
        pretty: bool,
    },

    /// Print the header segments of a markdown file as JSON lines
    Segments {
        /// Markdown file to split
        path: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line values that win over the config file.
#[derive(clap::Args)]
struct Overrides {
    /// Maximum chunk length in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Drop heading lines from chunk text
    #[arg(long)]
    strip_headers: bool,
}

impl Overrides {
    fn apply(&self, mut options: ChunkOptions) -> ChunkOptions {
        if let Some(size) = self.chunk_size {
            options.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            options.chunk_overlap = overlap;
        }
        if self.strip_headers {
            options.strip_headers = true;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let base = match &cli.config {
        Some(path) => ChunkOptions::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => ChunkOptions::default(),
    };

    match cli.command {
        Commands::Chunk {
            path,
            overrides,
            pretty,
        } => {
            let pipeline = build_pipeline(overrides.apply(base))?;
            let chunks = pipeline
                .run(&path)
                .with_context(|| format!("Failed to chunk {}", path.display()))?;
            write_json_lines(&chunks, pretty)?;
        }
        Commands::Segments { path, overrides } => {
            let pipeline = build_pipeline(overrides.apply(base))?;
            let document = load(&path)?;
            write_json_lines(&pipeline.segments(&document), false)?;
        }
    }

    Ok(())
}

fn build_pipeline(options: ChunkOptions) -> Result<ChunkPipeline> {
    ChunkPipeline::new(options).context("Invalid chunking options")
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_json_lines<T: Serialize>(items: &[T], pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for item in items {
        if pretty {
            serde_json::to_writer_pretty(&mut out, item)?;
        } else {
            serde_json::to_writer(&mut out, item)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
