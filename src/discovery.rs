use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Configuration for input discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// File extension to match, without the dot (`txt`, `book`, `tokens`)
    pub extension: String,
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            fail_fast: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn for_extension(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            ..Default::default()
        }
    }
}

/// Result of file discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Discovers all files `<dir>/*.<extension>` directly inside the given directory.
/// Returns an async stream of validated file paths.
pub fn discover_files(
    input_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let input_path = input_dir.as_ref().to_path_buf();

    futures::stream::unfold(
        DiscoveryState::new(input_path, config),
        |mut state| async move {
            state.next_file().await.map(|result| (result, state))
        },
    )
}

/// Internal state for file discovery iteration
struct DiscoveryState {
    input_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(input_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            input_dir,
            config,
            glob_iter: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let escaped_dir = glob::Pattern::escape(&self.input_dir.display().to_string());
            let pattern = format!("{}/*.{}", escaped_dir, self.config.extension);
            debug!("Starting file discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("File discovery initialized for: {}", self.input_dir.display());
                }
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        match glob_iter.next() {
            Some(Ok(path)) => {
                debug!("Found file: {}", path.display());
                Some(self.validate_file(path).await)
            }
            Some(Err(e)) => {
                let error_msg = format!("Glob iteration error: {e}");
                warn!("{}", error_msg);

                if self.config.fail_fast {
                    Some(Err(anyhow::anyhow!(error_msg)))
                } else {
                    Box::pin(self.next_file()).await
                }
            }
            None => {
                info!("File discovery completed");
                None
            }
        }
    }

    async fn validate_file(&self, path: PathBuf) -> Result<FileValidation> {
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(FileValidation { path, error: None }),
            Ok(_) => {
                let error = format!("Path is not a file: {}", path.display());
                self.invalid(path, error)
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", path.display(), e);
                self.invalid(path, error)
            }
        }
    }

    fn invalid(&self, path: PathBuf, error: String) -> Result<FileValidation> {
        warn!("{}", error);
        if self.config.fail_fast {
            Err(anyhow::anyhow!(error))
        } else {
            Ok(FileValidation {
                path,
                error: Some(error),
            })
        }
    }
}

/// Collect all discovered files into a Vec, sorted by path
pub async fn collect_discovered_files(
    input_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(input_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;

    if invalid_count > 0 {
        warn!("Found {} files with validation issues", invalid_count);
    }

    info!("File discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Inputs found in one directory, split by validation outcome
#[derive(Debug, Clone, Default)]
pub struct DiscoveredInputs {
    /// Readable files, sorted by path
    pub files: Vec<PathBuf>,
    /// Matches that cannot be processed, reported as failures by the caller
    pub invalid: Vec<FileValidation>,
}

/// Find all files matching the configured extension
///
/// With `fail_fast`, the first unusable match is an error instead of an entry in `invalid`.
pub async fn find_input_files(
    input_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<DiscoveredInputs> {
    let mut inputs = DiscoveredInputs::default();
    for validation in collect_discovered_files(input_dir, config).await? {
        if validation.error.is_none() {
            inputs.files.push(validation.path);
        } else {
            inputs.invalid.push(validation);
        }
    }
    Ok(inputs)
}

/// Document stem: file name up to its first dot
pub fn document_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Pair each primary file with the companion of the same stem in another directory
///
/// Primaries without a companion are returned with `None` so callers can report them.
pub fn pair_by_stem(
    primaries: &[PathBuf],
    companion_dir: &Path,
    companion_extension: &str,
) -> Vec<(PathBuf, Option<PathBuf>)> {
    primaries
        .iter()
        .map(|primary| {
            let stem = document_stem(primary);
            let candidate = companion_dir.join(format!("{stem}.{companion_extension}"));
            let companion = candidate.is_file().then_some(candidate);
            if companion.is_none() {
                warn!("No .{} companion for {}", companion_extension, primary.display());
            }
            (primary.clone(), companion)
        })
        .collect()
}
