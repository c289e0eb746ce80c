//! Inverse pass: translation calls become literals again.
//!
//! Calls are resolved against one [`LocaleDictionary`]. A call whose key is
//! missing or dynamic is left in place; the injected import and declaration
//! are removed only when nothing can still need them (see [`cleanup`]).

mod cleanup;
mod component;
mod reverter;
mod script;

pub use component::revert_component;
pub use script::revert_script;

use anyhow::Result;

use crate::core::FileOutcome;
use crate::core::dialect::{Dialect, route};
use crate::core::locale::LocaleDictionary;
use crate::core::rule::CallRules;
use crate::issues::Issue;

/// Everything the inverse pass needs besides the file itself.
pub struct RevertOptions<'a> {
    pub rules: &'a CallRules,
    pub dictionary: &'a LocaleDictionary,
}

/// Run the inverse pass over one file.
pub fn revert_code(code: &str, file_path: &str, options: &RevertOptions<'_>) -> Result<FileOutcome> {
    match route(file_path, options.rules) {
        Ok(route) => route.dialect.revert(code, file_path, route.rule, options),
        Err(issue) => {
            Ok(FileOutcome::unchanged(code).with_issues(vec![Issue::UnsupportedDialect(issue)]))
        }
    }
}
