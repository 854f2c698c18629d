use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use docsplit_core::{
    discover_text_files, group_file_name, process_file, read_text_file, require_text_files,
    write_json, write_outputs, DocumentSplitter, GroupResult, GroupSummary, ProcessingOutput,
    ProcessingReport, SplitterOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PREVIEW_CHUNKS: usize = 5;
const PREVIEW_CHARS: usize = 100;

#[derive(Parser)]
#[command(name = "docsplit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Maximum chunk size in characters
    #[arg(long, global = true, env = "DOCSPLIT_MAX_CHUNK_SIZE", default_value = "1500")]
    max_chunk_size: usize,

    /// Minimum chunk size in characters
    #[arg(long, global = true, env = "DOCSPLIT_MIN_CHUNK_SIZE", default_value = "100")]
    min_chunk_size: usize,

    /// Characters carried over from the previous chunk
    #[arg(long, global = true, env = "DOCSPLIT_OVERLAP_SIZE", default_value = "150")]
    overlap_size: usize,

    /// Chunks scoring below this are dropped
    #[arg(long, global = true, env = "DOCSPLIT_QUALITY_THRESHOLD", default_value = "0.5")]
    quality_threshold: f64,
}

impl Cli {
    fn splitter_options(&self) -> SplitterOptions {
        SplitterOptions {
            max_chunk_size: self.max_chunk_size,
            min_chunk_size: self.min_chunk_size,
            overlap_size: self.overlap_size,
            quality_threshold: self.quality_threshold,
            ..SplitterOptions::default()
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Split one file and print a short analysis.
    Analyze {
        /// Text file to analyze.
        #[arg(long)]
        file: PathBuf,
        /// Print the chunk records as JSON instead.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Split every .txt file under a folder and write JSON and text reports.
    Process {
        /// Folder that contains .txt files recursively.
        #[arg(long)]
        folder: PathBuf,
        /// Main JSON output file.
        #[arg(long, default_value = "chunks.json")]
        output: PathBuf,
        /// Treat each immediate subfolder as its own group.
        #[arg(long, default_value_t = false)]
        per_subfolder: bool,
    },
    /// List the immediate subfolders of a folder with their .txt counts.
    Browse {
        #[arg(long)]
        folder: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "docsplit boot"
    );

    match &cli.command {
        Command::Analyze { file, json } => {
            let splitter = DocumentSplitter::new(cli.splitter_options())?;
            analyze_file(&splitter, file, *json)?;
        }
        Command::Process {
            folder,
            output,
            per_subfolder,
        } => {
            let splitter = Arc::new(DocumentSplitter::new(cli.splitter_options())?);
            if *per_subfolder {
                process_subfolders(splitter, folder, output, app_version).await?;
            } else {
                process_single(splitter, folder, output, app_version).await?;
            }
        }
        Command::Browse { folder } => browse(folder).await?,
    }

    Ok(())
}

fn analyze_file(splitter: &DocumentSplitter, file: &Path, json: bool) -> anyhow::Result<()> {
    let decoded = read_text_file(file).with_context(|| format!("reading {}", file.display()))?;
    let label = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let records = splitter.split_document(&decoded.text, &label);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let structure = splitter.analyze(&decoded.text);
    let header_total = structure.header_hierarchy.main.len()
        + structure.header_hierarchy.sub.len()
        + structure.header_hierarchy.sub_sub.len();
    let avg_quality = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|record| record.quality_score).sum::<f64>() / records.len() as f64
    };

    println!("file: {}", file.display());
    println!("  encoding: {}", decoded.encoding);
    println!("  size: {} chars", decoded.text.chars().count());
    println!("  chunks: {}", records.len());
    println!("  avg quality: {avg_quality:.3}");
    println!("  document type: {}", structure.document_type);
    println!("  title: {}", structure.title);
    println!("  headers: {header_total}");

    for record in records.iter().take(PREVIEW_CHUNKS) {
        let preview: String = record.content.chars().take(PREVIEW_CHARS).collect();
        println!(
            "[{}] length={} quality={:.3} category={}",
            record.sequence_index, record.length, record.quality_score, record.section_category
        );
        println!("  {}", preview.replace('\n', " "));
    }

    Ok(())
}

/// Splits every file on the blocking pool; results come back in path order.
async fn process_folder(
    splitter: Arc<DocumentSplitter>,
    folder: &Path,
) -> anyhow::Result<ProcessingReport> {
    let mut tasks = JoinSet::new();
    for path in require_text_files(folder)? {
        let splitter = Arc::clone(&splitter);
        let root = folder.to_path_buf();
        tasks.spawn_blocking(move || {
            let result = process_file(&splitter, &root, &path);
            (path, result)
        });
    }

    let mut report = ProcessingReport::default();
    while let Some(joined) = tasks.join_next().await {
        let (path, outcome) = joined?;
        report.record(path, outcome);
    }

    report.sort_by_path();
    Ok(report)
}

async fn process_single(
    splitter: Arc<DocumentSplitter>,
    folder: &Path,
    output: &Path,
    version: &str,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let options = splitter.options().clone();
    let report = process_folder(splitter, folder).await?;

    if report.files.is_empty() {
        println!("0 chunks produced (all files were skipped)");
    }

    let result = ProcessingOutput::new(&report, &options, version, Utc::now());
    let written = write_outputs(output, &result)?;

    println!(
        "{} chunks from {} files in {:.2}s -> {}",
        report.chunk_count(),
        report.files.len(),
        started.elapsed().as_secs_f64(),
        written.main.display()
    );
    if let Some(path) = written.text_report {
        println!("report: {}", path.display());
    }

    Ok(())
}

async fn process_subfolders(
    splitter: Arc<DocumentSplitter>,
    folder: &Path,
    output: &Path,
    version: &str,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let options = splitter.options().clone();
    let output_dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let mut groups = Vec::new();
    for (name, path) in subfolders(folder).await? {
        if discover_text_files(&path).is_empty() {
            warn!(group = %name, "no txt files in subfolder");
            continue;
        }

        let group_started = Instant::now();
        let report = process_folder(Arc::clone(&splitter), &path).await?;
        let file_name = group_file_name(&name);

        let result = ProcessingOutput::new(&report, &options, version, Utc::now());
        write_outputs(&output_dir.join(&file_name), &result)?;

        let elapsed = group_started.elapsed().as_secs_f64();
        info!(group = %name, files = report.files.len(), chunks = report.chunk_count(), "group processed");
        groups.push(GroupResult::from_files(&name, &report.files, elapsed, &file_name));
    }

    if groups.is_empty() {
        anyhow::bail!("no subfolder of {} contains txt files", folder.display());
    }

    let summary = GroupSummary::new(Utc::now(), groups, started.elapsed().as_secs_f64());
    write_json(output, &summary)?;

    let report_path = output.with_extension("txt");
    let text = summary.render_text();
    tokio::fs::write(&report_path, &text).await?;

    print!("{text}");
    println!("summary: {}", output.display());
    Ok(())
}

/// Immediate subdirectories, sorted by name.
async fn subfolders(folder: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .with_context(|| format!("listing {}", folder.display()))?;

    let mut folders = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            folders.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }

    folders.sort();
    Ok(folders)
}

async fn browse(folder: &Path) -> anyhow::Result<()> {
    let folders = subfolders(folder).await?;
    if folders.is_empty() {
        println!("no subfolders in {}", folder.display());
        return Ok(());
    }

    for (name, path) in folders {
        let files = discover_text_files(&path);
        let mut total_bytes = 0u64;
        for file in &files {
            total_bytes += tokio::fs::metadata(file).await?.len();
        }
        println!(
            "{name}: {} txt files, {:.1} KB",
            files.len(),
            total_bytes as f64 / 1024.0
        );
    }

    Ok(())
}
