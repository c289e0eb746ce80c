//! Transformation engine.
//!
//! ## Pipeline
//!
//! ```text
//! route(file) ──► parse (swc / markup) ──► Extractor / Reverter ──► EditSet::apply
//!                                              │
//!                                     Collector / LocaleDictionary
//! ```
//!
//! Both passes patch the original text through an [`EditSet`], so unchanged
//! regions keep their exact formatting.

pub mod batch;
pub mod classifier;
pub mod collector;
pub mod dialect;
pub mod edit;
pub mod escape;
pub mod file_scanner;
pub mod locale;
pub mod parsers;
pub mod revert;
pub mod rule;
pub mod source;
pub mod transform;

pub use classifier::{Classifier, IGNORE_SENTINEL, TextScript};
pub use collector::{Collector, KeyCollector, KeyConflictPolicy};
pub use dialect::{Dialect, Route, SourceDialect, route};
pub use edit::EditSet;
pub use locale::{LocaleDictionary, LocaleFile};
pub use revert::{RevertOptions, revert_code};
pub use rule::{CallRule, CallRules};
pub use source::{SourceContext, SourceLocation};
pub use transform::{TransformOptions, transform_code};

use crate::issues::Issue;

/// Rewritten source text of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub code: String,
    pub changed: bool,
}

/// Result of running one pass over one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub result: TransformResult,
    pub issues: Vec<Issue>,
}

impl FileOutcome {
    pub fn unchanged(code: &str) -> Self {
        Self {
            result: TransformResult {
                code: code.to_string(),
                changed: false,
            },
            issues: Vec::new(),
        }
    }

    /// `changed` is derived from the text, so a pass whose edits cancel out
    /// still reports no change.
    pub fn rewritten(original: &str, code: String) -> Self {
        let changed = code != original;
        Self {
            result: TransformResult { code, changed },
            issues: Vec::new(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues.extend(issues);
        self
    }

    pub fn code(&self) -> &str {
        &self.result.code
    }

    pub fn changed(&self) -> bool {
        self.result.changed
    }
}
