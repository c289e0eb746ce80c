//! Issue types reported by the transform and revert passes.
//!
//! Every suppressed substitution or skipped cleanup produces one of these,
//! so nothing is dropped silently. Each issue is self-contained with all
//! information the reporter needs to display it.

use enum_dispatch::enum_dispatch;

use crate::core::{KeyConflictPolicy, SourceContext};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    UnsupportedDialect,
    MissingLocaleKey,
    AmbiguousCleanup,
    MalformedSource,
    KeyConflict,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::UnsupportedDialect => write!(f, "unsupported-dialect"),
            Rule::MissingLocaleKey => write!(f, "missing-locale-key"),
            Rule::AmbiguousCleanup => write!(f, "ambiguous-cleanup"),
            Rule::MalformedSource => write!(f, "malformed-source"),
            Rule::KeyConflict => write!(f, "key-conflict"),
        }
    }
}

// ============================================================
// Reasons
// ============================================================

/// Why a file was not routed to any dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Extension is not one of the supported script or component extensions.
    UnknownExtension,
    /// Extension is supported but no call rule is configured for it.
    NoCallRule,
}

/// Why injected statements were kept after a revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupReason {
    /// Translation calls are still present in the file.
    CallsRemain { count: usize },
    /// The statement appears more than once.
    DuplicateStatement,
    /// Names bound by the statement are still referenced.
    StillReferenced { names: Vec<String> },
}

impl std::fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupReason::CallsRemain { count } => {
                write!(f, "{} translation call(s) remain in the file", count)
            }
            CleanupReason::DuplicateStatement => write!(f, "statement appears more than once"),
            CleanupReason::StillReferenced { names } => {
                write!(f, "still referenced: {}", names.join(", "))
            }
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// File extension with no dialect or no call rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedDialectIssue {
    pub file_path: String,
    pub extension: String,
    pub reason: UnsupportedReason,
}

impl UnsupportedDialectIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnsupportedDialect
    }
}

/// Translation call whose key is absent from the locale dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingLocaleKeyIssue {
    pub context: SourceContext,
    pub key: String,
    pub locale: String,
}

impl MissingLocaleKeyIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MissingLocaleKey
    }
}

/// Injected import/declaration that was kept after reverting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousCleanupIssue {
    pub context: SourceContext,
    pub statement: String,
    pub reason: CleanupReason,
}

impl AmbiguousCleanupIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::AmbiguousCleanup
    }
}

/// File that could not be parsed (or read). Scoped to that file only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSourceIssue {
    pub file_path: String,
    pub error: String,
}

impl MalformedSourceIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MalformedSource
    }
}

/// Two distinct texts generated the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflictIssue {
    pub locale_file: String,
    pub key: String,
    pub kept: String,
    pub discarded: String,
    pub policy: KeyConflictPolicy,
}

impl KeyConflictIssue {
    pub fn rule() -> Rule {
        Rule::KeyConflict
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// An issue found while transforming or reverting.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    UnsupportedDialect(UnsupportedDialectIssue),
    MissingLocaleKey(MissingLocaleKeyIssue),
    AmbiguousCleanup(AmbiguousCleanupIssue),
    MalformedSource(MalformedSourceIssue),
    KeyConflict(KeyConflictIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }

    pub fn malformed(file_path: impl Into<String>, error: &anyhow::Error) -> Self {
        Issue::MalformedSource(MalformedSourceIssue {
            file_path: file_path.into(),
            error: format!("{:#}", error),
        })
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Source code location (has source_line for context display).
    Source(&'a SourceContext),
    /// File-level only (no line context).
    File { path: &'a str },
}

/// Trait for types that can be reported to CLI.
///
/// Implemented by all issue types; `enum_dispatch` forwards calls on `Issue`.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display (key, text, error, etc.).
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    fn hint(&self) -> Option<&str> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for UnsupportedDialectIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        match self.reason {
            UnsupportedReason::UnknownExtension => {
                format!("unsupported extension .{}", self.extension)
            }
            UnsupportedReason::NoCallRule => {
                format!("no call rule configured for .{}", self.extension)
            }
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<&str> {
        match self.reason {
            UnsupportedReason::UnknownExtension => None,
            UnsupportedReason::NoCallRule => Some("add an entry to i18nCallRules"),
        }
    }
}

impl Report for MissingLocaleKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("not found in locale {}; call left unchanged", self.locale))
    }
}

impl Report for AmbiguousCleanupIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.statement.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("kept: {}", self.reason))
    }
}

impl Report for MalformedSourceIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for KeyConflictIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.locale_file,
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        match self.policy {
            KeyConflictPolicy::Error => Severity::Error,
            KeyConflictPolicy::FirstWriterWins | KeyConflictPolicy::LastWriterWins => {
                Severity::Warning
            }
        }
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "kept \"{}\", discarded \"{}\" ({})",
            self.kept, self.discarded, self.policy
        ))
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_file_path(&self) -> &str {
        match self.location() {
            ReportLocation::Source(ctx) => &ctx.location.file_path,
            ReportLocation::File { path } => path,
        }
    }

    fn sort_line(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.location.line,
            ReportLocation::File { .. } => 0,
        }
    }

    fn sort_col(&self) -> usize {
        match self.location() {
            ReportLocation::Source(ctx) => ctx.location.col,
            ReportLocation::File { .. } => 0,
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_file_path()
            .cmp(other.sort_file_path())
            .then_with(|| self.sort_line().cmp(&other.sort_line()))
            .then_with(|| self.sort_col().cmp(&other.sort_col()))
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Tests
// ============================================================
