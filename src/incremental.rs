// WHY: Output naming and skip-if-done checks shared by every batch command
// One table per source document, named after the document stem

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::discovery::document_stem;

/// Kind of table written for a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Dialog,
    Network,
}

impl OutputKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputKind::Dialog => "_dialog.tsv",
            OutputKind::Network => "_network.tsv",
        }
    }
}

/// Output table path for a source document: `<out_dir>/<stem><suffix>`
///
/// # Example
/// ```
/// use dialognet::incremental::{generate_output_path, OutputKind};
/// use std::path::Path;
/// let out = generate_output_path(Path::new("scripts/s1e01.txt"), Path::new("out"), OutputKind::Dialog);
/// assert_eq!(out, Path::new("out/s1e01_dialog.tsv"));
/// ```
pub fn generate_output_path(source_path: &Path, out_dir: &Path, kind: OutputKind) -> PathBuf {
    out_dir.join(format!("{}{}", document_stem(source_path), kind.suffix()))
}

/// Sibling path an output is written to before being renamed into place
///
/// Only the final name counts as done, so a run that dies mid-write leaves
/// nothing that a later run would skip.
pub fn partial_path(output_path: &Path) -> PathBuf {
    let mut name = output_path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    output_path.with_file_name(name)
}

/// Check if the output table for a source document already exists
pub fn output_exists(source_path: &Path, out_dir: &Path, kind: OutputKind) -> bool {
    generate_output_path(source_path, out_dir, kind).exists()
}

/// Whether a source document still needs processing
pub fn should_process(source_path: &Path, out_dir: &Path, kind: OutputKind, overwrite_all: bool) -> bool {
    overwrite_all || !output_exists(source_path, out_dir, kind)
}

/// Content with a guaranteed trailing newline
pub fn with_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}
