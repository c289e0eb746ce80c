use anyhow::{Context, Result};

use crate::core::FileOutcome;
use crate::core::edit::expand_to_lines;
use crate::core::parsers::script::{ScriptSyntax, parse_script};
use crate::core::revert::RevertOptions;
use crate::core::revert::cleanup::plan_cleanup;
use crate::core::revert::reverter::RevertState;
use crate::core::rule::CallRule;

/// Inverse pass for a plain or typed script file.
pub fn revert_script(
    code: &str,
    file_path: &str,
    syntax: ScriptSyntax,
    rule: &CallRule,
    options: &RevertOptions<'_>,
) -> Result<FileOutcome> {
    let parsed = parse_script(code, syntax, file_path, 0)
        .with_context(|| format!("Failed to parse {}", file_path))?;

    let mut state = RevertState::new(code, file_path, rule, options.dictionary);
    state.run(&parsed, None);
    for range in plan_cleanup(&mut state, &parsed, rule) {
        state.edits.delete(expand_to_lines(code, range));
    }
    state.finish()
}
