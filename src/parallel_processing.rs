// WHY: Documents are independent, so a batch runs them concurrently and reports per document
// One failing episode or novel never aborts its siblings unless fail-fast is requested

use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::annotator::{mention_stream, parse_character_ids, BookFile};
use crate::characters::CharacterBins;
use crate::discovery::FileValidation;
use crate::dialog_table::{self, TableMetadata};
use crate::fanfic::Story;
use crate::incremental::{
    generate_output_path, partial_path, should_process, with_trailing_newline, OutputKind,
};
use crate::network::{scene_network, window_network};
use crate::screenplay::ScreenplayParser;

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// Source document path
    pub path: String,
    /// Table written for this document, if any
    pub output_path: Option<String>,
    /// Number of characters read from the source
    pub chars_processed: u64,
    /// Rows written: utterances for dialog tables, edges for networks
    pub records_written: u64,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Processing status (success, skipped, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileStats {
    fn skipped(path: &Path, output_path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            output_path: Some(output_path.display().to_string()),
            chars_processed: 0,
            records_written: 0,
            processing_time_ms: 0,
            status: "skipped".to_string(),
            error: None,
        }
    }

    fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.display().to_string(),
            output_path: None,
            chars_processed: 0,
            records_written: 0,
            processing_time_ms: 0,
            status: "failed".to_string(),
            error: Some(format!("{error:#}")),
        }
    }

    /// A discovered input that could not be processed at all
    pub fn invalid_input(validation: &FileValidation) -> Self {
        Self {
            path: validation.path.display().to_string(),
            output_path: None,
            chars_processed: 0,
            records_written: 0,
            processing_time_ms: 0,
            status: "failed".to_string(),
            error: validation.error.clone(),
        }
    }
}

/// Summary of one batch run
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub command: String,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_time_ms: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    pub fn from_files(command: &str, files: Vec<FileStats>, total_time_ms: u64) -> Self {
        let count = |status: &str| files.iter().filter(|f| f.status == status).count();
        Self {
            command: command.to_string(),
            succeeded: count("success"),
            skipped: count("skipped"),
            failed: count("failed"),
            total_time_ms,
            files,
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write run stats {}", path.display()))
    }
}

/// What to build from each document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Screenplay `.txt` to dialog table
    ScreenplayDialog,
    /// Annotator `.book` to dialog table
    BookDialog,
    /// Screenplay `.txt` to scene co-occurrence network
    ScreenplayNetwork,
    /// Annotator `.tokens` (+ companion `.book`) to sliding-window network
    NovelNetwork { window_size: usize },
}

impl Task {
    pub fn output_kind(&self) -> OutputKind {
        match self {
            Task::ScreenplayDialog | Task::BookDialog => OutputKind::Dialog,
            Task::ScreenplayNetwork | Task::NovelNetwork { .. } => OutputKind::Network,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::ScreenplayDialog => "screenplay-dialog",
            Task::BookDialog => "book-dialog",
            Task::ScreenplayNetwork => "screenplay-network",
            Task::NovelNetwork { .. } => "novel-network",
        }
    }
}

/// One source document, with its companion file when the task needs two inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source: PathBuf,
    pub companion: Option<PathBuf>,
    pub frame_number: Option<usize>,
}

impl WorkItem {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            companion: None,
            frame_number: None,
        }
    }
}

/// Read-only state shared by every document in a batch
pub struct ProcessingContext {
    pub parser: ScreenplayParser,
    pub bins: CharacterBins,
    pub corpus_name: Option<String>,
}

/// Batch-level settings
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub out_dir: PathBuf,
    /// Rewrite tables that already exist
    pub overwrite_all: bool,
    /// Abort on first failed document
    pub fail_fast: bool,
    /// Documents processed at once
    pub concurrency: usize,
}

impl BatchConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            overwrite_all: false,
            fail_fast: false,
            concurrency: num_cpus::get().max(1),
        }
    }
}

/// Build the table for one document from its text (and companion text)
///
/// Returns the TSV content and the number of data rows.
pub fn build_table(
    task: &Task,
    ctx: &ProcessingContext,
    source_text: &str,
    companion_text: Option<&str>,
    frame_number: Option<usize>,
) -> Result<(String, u64)> {
    let metadata = TableMetadata {
        corpus_name: ctx.corpus_name.clone(),
        frame_number,
    };

    match task {
        Task::ScreenplayDialog => {
            let utterances = ctx.parser.utterances(source_text);
            let rows = dialog_table::assemble_normalized(&utterances, &ctx.bins, &metadata);
            Ok((dialog_table::to_tsv(&rows)?, rows.len() as u64))
        }
        Task::BookDialog => {
            let book = BookFile::from_json_str(source_text)?;
            let rows = dialog_table::assemble_normalized(&book.dialog(), &ctx.bins, &metadata);
            Ok((dialog_table::to_tsv(&rows)?, rows.len() as u64))
        }
        Task::ScreenplayNetwork => {
            let (grammar, scenes) = ctx.parser.scene_speakers(source_text);
            debug!("Screenplay split into {} scenes using {:?}", scenes.len(), grammar);
            let network = scene_network(scenes.iter().map(|scene| {
                scene
                    .speakers
                    .iter()
                    .map(|speaker| ctx.bins.canonical_name(speaker))
                    .collect::<Vec<_>>()
            }));
            Ok((network.to_tsv()?, network.len() as u64))
        }
        Task::NovelNetwork { window_size } => {
            let book_text =
                companion_text.ok_or_else(|| anyhow!("Novel network needs a companion book file"))?;
            let book = BookFile::from_json_str(book_text)?;
            let ids = parse_character_ids(source_text)?;
            let mentions = mention_stream(&ids, &book, &ctx.bins);
            let network = window_network(&mentions, *window_size)?;
            Ok((network.to_tsv()?, network.len() as u64))
        }
    }
}

/// Write a table through a buffered async writer, creating the output directory
pub async fn write_table(path: &Path, content: &str) -> Result<()> {
    write_atomically(path, with_trailing_newline(content).as_bytes()).await
}

// WHY: a crash mid-write must never leave a truncated file under the final name
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let partial = partial_path(path);
    if let Err(e) = write_buffered(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }

    tokio::fs::rename(&partial, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))
}

async fn write_buffered(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(())
}

/// Process one document end to end: read, build, write
pub async fn process_document(
    item: &WorkItem,
    task: &Task,
    ctx: Arc<ProcessingContext>,
    config: &BatchConfig,
) -> Result<FileStats> {
    let output_path = generate_output_path(&item.source, &config.out_dir, task.output_kind());
    if !should_process(&item.source, &config.out_dir, task.output_kind(), config.overwrite_all) {
        debug!("Skipping {}: output exists", item.source.display());
        return Ok(FileStats::skipped(&item.source, &output_path));
    }

    let start_time = Instant::now();
    let source_text = tokio::fs::read_to_string(&item.source)
        .await
        .with_context(|| format!("Failed to read {}", item.source.display()))?;
    let companion_text = match &item.companion {
        Some(companion) => Some(
            tokio::fs::read_to_string(companion)
                .await
                .with_context(|| format!("Failed to read {}", companion.display()))?,
        ),
        None => None,
    };
    let chars_processed = source_text.chars().count() as u64;

    let (content, records_written) = {
        let task = task.clone();
        let frame_number = item.frame_number;
        tokio::task::spawn_blocking(move || {
            build_table(&task, &ctx, &source_text, companion_text.as_deref(), frame_number)
        })
        .await
        .context("Document worker panicked")?
        .with_context(|| format!("Failed to process {}", item.source.display()))?
    };

    write_table(&output_path, &content).await?;

    let processing_time_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Processed {}: {} rows in {}ms",
        item.source.display(),
        records_written,
        processing_time_ms
    );

    Ok(FileStats {
        path: item.source.display().to_string(),
        output_path: Some(output_path.display().to_string()),
        chars_processed,
        records_written,
        processing_time_ms,
        status: "success".to_string(),
        error: None,
    })
}

/// Process documents concurrently; results sorted by source path
pub async fn process_files_parallel(
    items: Vec<WorkItem>,
    task: Task,
    ctx: Arc<ProcessingContext>,
    config: BatchConfig,
    progress: Option<ProgressBar>,
) -> Result<Vec<FileStats>> {
    info!("Starting {} batch over {} documents", task.name(), items.len());

    let mut results = stream::iter(items)
        .map(|item| {
            let ctx = Arc::clone(&ctx);
            let task = &task;
            let config = &config;
            async move {
                let result = process_document(&item, task, ctx, config).await;
                (item, result)
            }
        })
        .buffer_unordered(config.concurrency.max(1));

    let mut stats = Vec::new();
    while let Some((item, result)) = results.next().await {
        if let Some(progress) = &progress {
            progress.inc(1);
        }
        match result {
            Ok(file_stats) => stats.push(file_stats),
            Err(e) => {
                if config.fail_fast {
                    return Err(e);
                }
                warn!("Failed to process {}: {:#}", item.source.display(), e);
                stats.push(FileStats::failed(&item.source, &e));
            }
        }
    }

    stats.sort_by(|a, b| a.path.cmp(&b.path));
    info!("Completed {} batch: {} documents", task.name(), stats.len());
    Ok(stats)
}

/// Write one `<id>.txt` per story as input for the external annotator
///
/// Existing files are kept unless `overwrite_all`. Story ids that would escape the
/// output directory are reported as failures.
pub async fn export_story_texts(stories: &[Story], config: &BatchConfig) -> Result<Vec<FileStats>> {
    tokio::fs::create_dir_all(&config.out_dir).await?;
    let mut stats = Vec::with_capacity(stories.len());

    for story in stories {
        let source = Path::new(&story.id);
        let result = export_story_text(story, config).await;
        match result {
            Ok(file_stats) => stats.push(file_stats),
            Err(e) => {
                if config.fail_fast {
                    return Err(e);
                }
                warn!("Failed to export story {}: {:#}", story.id, e);
                stats.push(FileStats::failed(source, &e));
            }
        }
    }

    info!("Exported {} story texts to {}", stats.len(), config.out_dir.display());
    Ok(stats)
}

async fn export_story_text(story: &Story, config: &BatchConfig) -> Result<FileStats> {
    if story.id.is_empty() || story.id.contains(['/', '\\']) || story.id == ".." {
        anyhow::bail!("Story id {:?} is not usable as a file name", story.id);
    }

    let output_path = config.out_dir.join(format!("{}.txt", story.id));
    if output_path.exists() && !config.overwrite_all {
        return Ok(FileStats::skipped(Path::new(&story.id), &output_path));
    }

    let start_time = Instant::now();
    let text = story.full_text();
    write_atomically(&output_path, text.as_bytes()).await?;

    Ok(FileStats {
        path: story.id.clone(),
        output_path: Some(output_path.display().to_string()),
        chars_processed: text.chars().count() as u64,
        records_written: story.chapters.len() as u64,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
        status: "success".to_string(),
        error: None,
    })
}
