// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture with separate input and output directories
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        let out_dir = temp_dir.path().join("out");
        fs::create_dir_all(&input_dir).expect("Failed to create input directory");

        Self {
            temp_dir,
            input_dir,
            out_dir,
        }
    }

    /// Create an input document with given content
    pub fn create_input<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.input_dir.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Create a file next to the input directory, e.g. a companion corpus
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }

    pub fn read_output(&self, name: &str) -> Result<String, std::io::Error> {
        fs::read_to_string(self.output_path(name))
    }

    /// Pre-populate an output table, as left by an earlier run
    pub fn create_output(&self, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(&self.out_dir).expect("Failed to create output directory");
        let path = self.output_path(name);
        fs::write(&path, content).expect("Failed to write output file");
        path
    }
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines",
            context,
            expected_lines.len(),
            actual_lines.len()
        );
    }
}
