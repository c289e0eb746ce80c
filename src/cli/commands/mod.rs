pub mod context;
pub mod init;
pub mod revert;
pub mod transform;

use crate::issues::{Issue, Severity};

#[derive(Debug)]
pub enum CommandSummary {
    Transform(TransformSummary),
    Revert(RevertSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct TransformSummary {
    /// Files whose text changed, as displayed.
    pub changed_files: Vec<String>,
    /// Distinct texts collected that had no key yet.
    pub extracted_count: usize,
    /// Keys added to the locale file (apply only).
    pub new_key_count: usize,
    pub locale_file: String,
    pub is_apply: bool,
    /// Apply skipped because of key conflicts under the `error` policy.
    pub blocked: bool,
}

#[derive(Debug)]
pub struct RevertSummary {
    pub locale: String,
    /// Requested locale that is not configured, if the base locale was used instead.
    pub fallback_from: Option<String>,
    pub output_root: String,
    pub written_count: usize,
    /// Written files that differ from their source.
    pub reverted_count: usize,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running an autoglot command.
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    /// All issues, sorted for reporting.
    pub issues: Vec<Issue>,
    /// Number of files that could not be read or parsed.
    pub malformed_count: usize,
    /// Number of source files processed.
    pub source_files: usize,
}

pub fn finish(summary: CommandSummary, mut issues: Vec<Issue>, source_files: usize) -> CommandResult {
    issues.sort();

    let malformed_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::MalformedSource(_)))
        .count();

    let mut error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();

    if let CommandSummary::Init(ref summary) = summary
        && summary.error.is_some()
    {
        error_count += 1;
    }

    CommandResult {
        summary,
        error_count,
        issues,
        malformed_count,
        source_files,
    }
}
