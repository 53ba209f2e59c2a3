use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use dialognet::discovery::{
    find_input_files, pair_by_stem, DiscoveredInputs, DiscoveryConfig, FileValidation,
};
use dialognet::fanfic::{fandom_network, filter_stories, load_stories, save_stories, StoryFilter};
use dialognet::parallel_processing::{
    export_story_texts, process_files_parallel, write_table, BatchConfig, FileStats,
    ProcessingContext, RunStats, Task, WorkItem,
};
use dialognet::{CharacterBins, NormalizerConfig, ScreenplayParser, SegmenterConfig, DEFAULT_WINDOW_SIZE};

#[derive(Parser, Debug)]
#[command(name = "dialognet")]
#[command(about = "Screenplay dialog extraction and character co-occurrence networks")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Character-bin JSON (canonical name -> aliases)
    #[arg(long, global = true, default_value = "character_bins.json")]
    bins: PathBuf,

    /// Production title used in running page headers
    #[arg(long, global = true, default_value = "HANNIBAL")]
    title: String,

    /// Minimum leading spaces of a speaker cue
    #[arg(long, global = true, default_value_t = 10)]
    speaker_indent: usize,

    /// Minimum leading spaces of a dialog line
    #[arg(long, global = true, default_value_t = 5)]
    dialog_indent: usize,

    /// Overwrite outputs that already exist
    #[arg(long, global = true)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, global = true, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Corpus name added as a column to dialog tables
    #[arg(long, global = true)]
    corpus_name: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one dialog table per document
    Dialog {
        /// Directory of source documents
        input_dir: PathBuf,
        /// Directory for `<stem>_dialog.tsv` tables
        out_dir: PathBuf,
        /// Source document format
        #[arg(long, value_enum, default_value_t = SourceKind::Screenplay)]
        kind: SourceKind,
        /// Add each document's position in the sorted corpus as a column
        #[arg(long)]
        frame_numbers: bool,
    },
    /// Build one scene co-occurrence network per screenplay
    ScreenplayNetwork {
        /// Directory of screenplay `.txt` files
        input_dir: PathBuf,
        /// Directory for `<stem>_network.tsv` tables
        out_dir: PathBuf,
    },
    /// Build one sliding-window network per annotated novel
    NovelNetwork {
        /// Directory of annotator `.tokens` files
        tokens_dir: PathBuf,
        /// Directory of annotator `.book` files with matching stems
        book_dir: PathBuf,
        /// Directory for `<stem>_network.tsv` tables
        out_dir: PathBuf,
        /// Mentions per window
        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        dist: usize,
    },
    /// Build one network over a fan-fiction corpus, one unit per story
    FandomNetwork {
        /// JSON array of stories
        stories: PathBuf,
        /// Network TSV to write
        output: PathBuf,
    },
    /// Clean a scraped fan-fiction corpus
    FanficFilter {
        /// JSON array of stories
        stories: PathBuf,
        /// Filtered JSON array to write
        output: PathBuf,
        /// Required first fandom
        #[arg(long, default_value = "Hannibal (TV)")]
        fandom: String,
        /// Keep stories from every fandom
        #[arg(long, conflicts_with = "fandom")]
        any_fandom: bool,
    },
    /// Write each story's text to `<id>.txt` for annotation
    FanficTexts {
        /// JSON array of stories
        stories: PathBuf,
        /// Directory for story texts
        out_dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SourceKind {
    /// Plain-text screenplays (`.txt`)
    Screenplay,
    /// Annotator book files (`.book`)
    Book,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging keeps batch runs greppable per document
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let cli = Cli::parse();

    info!("Starting dialognet");
    info!(?cli, "Parsed CLI arguments");

    let start_time = Instant::now();
    let (command_name, stats) = run(&cli).await?;
    let run_stats = RunStats::from_files(
        command_name,
        stats,
        start_time.elapsed().as_millis() as u64,
    );

    run_stats.save(&cli.common.stats_out).await?;

    println!("dialognet v{} - {} complete", env!("CARGO_PKG_VERSION"), command_name);
    println!(
        "Succeeded: {}, skipped: {}, failed: {}",
        run_stats.succeeded, run_stats.skipped, run_stats.failed
    );
    println!("Stats written to {}", cli.common.stats_out.display());

    info!(
        "Run completed: {} succeeded, {} skipped, {} failed in {}ms",
        run_stats.succeeded, run_stats.skipped, run_stats.failed, run_stats.total_time_ms
    );

    Ok(())
}

async fn run(cli: &Cli) -> Result<(&'static str, Vec<FileStats>)> {
    let common = &cli.common;

    match &cli.command {
        Command::Dialog {
            input_dir,
            out_dir,
            kind,
            frame_numbers,
        } => {
            let (task, extension) = match kind {
                SourceKind::Screenplay => (Task::ScreenplayDialog, "txt"),
                SourceKind::Book => (Task::BookDialog, "book"),
            };
            let DiscoveredInputs { files, invalid } = discover(common, input_dir, extension).await?;
            let items = files
                .into_iter()
                .enumerate()
                .map(|(frame, source)| WorkItem {
                    frame_number: frame_numbers.then_some(frame),
                    ..WorkItem::new(source)
                })
                .collect();
            let stats = run_batch(common, task, items, out_dir).await?;
            Ok(("dialog", with_invalid_inputs(stats, &invalid)))
        }

        Command::ScreenplayNetwork { input_dir, out_dir } => {
            let DiscoveredInputs { files, invalid } = discover(common, input_dir, "txt").await?;
            let items = files.into_iter().map(WorkItem::new).collect();
            let stats = run_batch(common, Task::ScreenplayNetwork, items, out_dir).await?;
            Ok(("screenplay-network", with_invalid_inputs(stats, &invalid)))
        }

        Command::NovelNetwork {
            tokens_dir,
            book_dir,
            out_dir,
            dist,
        } => {
            if *dist == 0 {
                anyhow::bail!("--dist must be at least 1");
            }
            let DiscoveredInputs { files, invalid } = discover(common, tokens_dir, "tokens").await?;
            let items = pair_by_stem(&files, existing_dir(book_dir)?, "book")
                .into_iter()
                .map(|(source, companion)| WorkItem {
                    companion,
                    ..WorkItem::new(source)
                })
                .collect();
            let task = Task::NovelNetwork { window_size: *dist };
            let stats = run_batch(common, task, items, out_dir).await?;
            Ok(("novel-network", with_invalid_inputs(stats, &invalid)))
        }

        Command::FandomNetwork { stories, output } => {
            let start_time = Instant::now();
            let bins = load_bins(&common.bins).await?;
            let stories = load_stories(stories).await?;
            let network = fandom_network(&stories, &bins);
            write_table(output, &network.to_tsv()?).await?;

            info!("Fandom network: {} stories, {} edges", stories.len(), network.len());
            Ok((
                "fandom-network",
                vec![FileStats {
                    path: output.display().to_string(),
                    output_path: Some(output.display().to_string()),
                    chars_processed: 0,
                    records_written: network.len() as u64,
                    processing_time_ms: start_time.elapsed().as_millis() as u64,
                    status: "success".to_string(),
                    error: None,
                }],
            ))
        }

        Command::FanficFilter {
            stories,
            output,
            fandom,
            any_fandom,
        } => {
            let start_time = Instant::now();
            let filter = StoryFilter {
                primary_fandom: (!any_fandom).then(|| fandom.clone()),
                ..StoryFilter::default()
            };
            let kept = filter_stories(load_stories(stories).await?, &filter);
            save_stories(&kept, output).await?;

            Ok((
                "fanfic-filter",
                vec![FileStats {
                    path: stories.display().to_string(),
                    output_path: Some(output.display().to_string()),
                    chars_processed: 0,
                    records_written: kept.len() as u64,
                    processing_time_ms: start_time.elapsed().as_millis() as u64,
                    status: "success".to_string(),
                    error: None,
                }],
            ))
        }

        Command::FanficTexts { stories, out_dir } => {
            let stories = load_stories(stories).await?;
            let stats = export_story_texts(&stories, &batch_config(common, out_dir)).await?;
            Ok(("fanfic-texts", stats))
        }
    }
}

async fn run_batch(
    common: &CommonArgs,
    task: Task,
    items: Vec<WorkItem>,
    out_dir: &Path,
) -> Result<Vec<FileStats>> {
    let parser = ScreenplayParser::new(
        NormalizerConfig {
            production_title: common.title.clone(),
        },
        SegmenterConfig {
            speaker_min_indent: common.speaker_indent,
            dialog_min_indent: common.dialog_indent,
            ..SegmenterConfig::default()
        },
    )?;
    let ctx = Arc::new(ProcessingContext {
        parser,
        bins: load_bins(&common.bins).await?,
        corpus_name: common.corpus_name.clone(),
    });

    println!("Found {} documents for {}", items.len(), task.name());

    let progress = if common.no_progress {
        None
    } else {
        let bar = ProgressBar::new(items.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(bar)
    };

    let stats = process_files_parallel(
        items,
        task,
        ctx,
        batch_config(common, out_dir),
        progress.clone(),
    )
    .await?;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(stats)
}

async fn discover(common: &CommonArgs, input_dir: &Path, extension: &str) -> Result<DiscoveredInputs> {
    let config = DiscoveryConfig {
        fail_fast: common.fail_fast,
        ..DiscoveryConfig::for_extension(extension)
    };
    find_input_files(existing_dir(input_dir)?, config).await
}

// WHY: inputs rejected during discovery still count as failures in the run stats
fn with_invalid_inputs(mut stats: Vec<FileStats>, invalid: &[FileValidation]) -> Vec<FileStats> {
    stats.extend(invalid.iter().map(FileStats::invalid_input));
    stats.sort_by(|a, b| a.path.cmp(&b.path));
    stats
}

fn batch_config(common: &CommonArgs, out_dir: &Path) -> BatchConfig {
    BatchConfig {
        overwrite_all: common.overwrite_all,
        fail_fast: common.fail_fast,
        ..BatchConfig::new(out_dir)
    }
}

// WHY: a missing bin file still yields usable output through the title-case fallback
async fn load_bins(path: &Path) -> Result<CharacterBins> {
    if path.exists() {
        CharacterBins::load(path).await
    } else {
        warn!("Character bins {} not found; speakers keep title-cased labels", path.display());
        Ok(CharacterBins::default())
    }
}

fn existing_dir(path: &Path) -> Result<&Path> {
    if !path.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", path.display());
    }
    Ok(path)
}

