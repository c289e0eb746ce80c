//! Batch runner.
//!
//! Files are read and processed on rayon's global pool. A failure in one
//! file (unreadable, malformed) becomes a `malformed-source` issue for that
//! file and never aborts the batch.

use std::fs;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::revert::{RevertOptions, revert_code};
use crate::core::transform::{TransformOptions, transform_code};
use crate::core::FileOutcome;
use crate::issues::Issue;

/// One processed file.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub file_path: String,
    pub outcome: FileOutcome,
}

impl BatchEntry {
    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }
}

/// Run the forward pass over every file.
pub fn transform_files(files: &[String], options: &TransformOptions<'_>) -> Vec<BatchEntry> {
    run_batch(files, |code, file_path| transform_code(code, file_path, options))
}

/// Run the inverse pass over every file.
pub fn revert_files(files: &[String], options: &RevertOptions<'_>) -> Vec<BatchEntry> {
    run_batch(files, |code, file_path| revert_code(code, file_path, options))
}

/// Entries come back in input order.
fn run_batch<F>(files: &[String], pass: F) -> Vec<BatchEntry>
where
    F: Fn(&str, &str) -> Result<FileOutcome> + Sync,
{
    files
        .par_iter()
        .map(|file_path| {
            let outcome = fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read {}", file_path))
                .and_then(|code| {
                    pass(&code, file_path.as_str()).or_else(|e| {
                        Ok(FileOutcome::unchanged(&code)
                            .with_issues(vec![Issue::malformed(file_path.as_str(), &e)]))
                    })
                })
                .unwrap_or_else(|e| {
                    FileOutcome::unchanged("").with_issues(vec![Issue::malformed(file_path.as_str(), &e)])
                });
            BatchEntry {
                file_path: file_path.clone(),
                outcome,
            }
        })
        .collect()
}

/// All issues of a batch, sorted for reporting.
pub fn collect_issues(entries: &[BatchEntry]) -> Vec<Issue> {
    let mut issues: Vec<Issue> = entries
        .iter()
        .flat_map(|entry| entry.outcome.issues.iter().cloned())
        .collect();
    issues.sort();
    issues
}
