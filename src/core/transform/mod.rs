//! Forward pass: natural-language literals become translation calls.

mod component;
mod extractor;
mod inject;
mod script;

pub use component::transform_component;
pub(crate) use component::{parse_block, parse_embedded};
pub use extractor::Extractor;
pub use inject::inject_statements;
pub use script::transform_script;

use anyhow::Result;

use crate::core::classifier::Classifier;
use crate::core::collector::Collector;
use crate::core::dialect::{Dialect, route};
use crate::core::rule::CallRules;
use crate::core::FileOutcome;
use crate::issues::Issue;

/// Everything the forward pass needs besides the file itself.
pub struct TransformOptions<'a> {
    pub rules: &'a CallRules,
    pub collector: &'a dyn Collector,
    pub classifier: Classifier,
}

/// Run the forward pass over one file.
///
/// An unsupported extension is reported and leaves the file untouched; a
/// parse failure is returned as an error.
pub fn transform_code(
    code: &str,
    file_path: &str,
    options: &TransformOptions<'_>,
) -> Result<FileOutcome> {
    match route(file_path, options.rules) {
        Ok(route) => route.dialect.transform(code, file_path, route.rule, options),
        Err(issue) => {
            Ok(FileOutcome::unchanged(code).with_issues(vec![Issue::UnsupportedDialect(issue)]))
        }
    }
}
