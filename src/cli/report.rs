//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format; command summaries follow.
//! Kept apart from the core passes so autoglot can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, InitSummary, RevertSummary, TransformSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
///
/// Issues are expected to be sorted already (see [`Issue`]'s `Ord`).
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let max_line_width = calculate_max_line_width(issues);

    for issue in issues {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(issues, writer);
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

/// Print a parse warning to a custom writer.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

pub fn print(result: &CommandResult, verbose: bool) {
    // Without -v, parse failures collapse into a single warning line.
    let shown: Vec<Issue> = result
        .issues
        .iter()
        .filter(|i| verbose || !matches!(i, Issue::MalformedSource(_)))
        .cloned()
        .collect();
    report(&shown);

    let mut out = io::stdout().lock();
    match &result.summary {
        CommandSummary::Transform(summary) => {
            print_transform_to(summary, result.source_files, &mut out)
        }
        CommandSummary::Revert(summary) => print_revert_to(summary, &mut out),
        CommandSummary::Init(summary) => print_init(summary),
    }

    print_parse_warning(result.malformed_count, verbose);
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Source(ctx) => {
            let line = ctx.line();
            let col = ctx.col();
            let source_line = &ctx.source_line;

            // Clickable location: --> path:line:col
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                ctx.file_path(),
                line,
                col
            );

            let caret_char = match severity {
                Severity::Error => "^".red(),
                Severity::Warning => "^".yellow(),
            };
            let _ = writeln!(
                writer,
                "{:>width$} {}",
                "",
                "|".blue(),
                width = max_line_width
            );
            let _ = writeln!(
                writer,
                "{:>width$} {} {}",
                line.to_string().blue(),
                "|".blue(),
                source_line,
                width = max_line_width
            );

            // col is 1-based
            let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
            let caret_padding = UnicodeWidthStr::width(prefix.as_str());
            let _ = writeln!(
                writer,
                "{:>width$} {} {:>padding$}{}",
                "",
                "|".blue(),
                "",
                caret_char,
                width = max_line_width,
                padding = caret_padding
            );
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})\n",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

fn print_transform_to<W: Write>(summary: &TransformSummary, source_files: usize, writer: &mut W) {
    if summary.blocked {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            "Key conflicts found; nothing was written (keyConflict is \"error\")".red()
        );
        return;
    }

    if summary.changed_files.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} - nothing to extract",
                plural(source_files, "source file")
            )
            .green()
        );
        return;
    }

    if summary.is_apply {
        let _ = writeln!(
            writer,
            "{} {}, added {} to {}.",
            "Rewrote".green().bold(),
            plural(summary.changed_files.len(), "file"),
            plural(summary.new_key_count, "key"),
            summary.locale_file
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} ({} for {}):",
            "Would rewrite".yellow().bold(),
            plural(summary.changed_files.len(), "file"),
            plural(summary.extracted_count, "new text"),
            summary.locale_file
        );
        for file in &summary.changed_files {
            let _ = writeln!(writer, "  - {}", file);
        }
        let _ = writeln!(
            writer,
            "Run with {} to rewrite these files.",
            "--apply".cyan()
        );
    }
}

fn print_revert_to<W: Write>(summary: &RevertSummary, writer: &mut W) {
    if let Some(requested) = &summary.fallback_from {
        eprintln!(
            "{} locale \"{}\" is not configured, using \"{}\"",
            "warning:".bold().yellow(),
            requested,
            summary.locale
        );
    }

    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Wrote {} to {} ({} reverted, locale {})",
            plural(summary.written_count, "file"),
            summary.output_root,
            summary.reverted_count,
            summary.locale
        )
        .green()
    );
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
    if let Some(error) = &summary.error {
        eprintln!("{} {}", "error:".bold().red(), error);
    }
}

// ============================================================
// Tests
// ============================================================
