use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use super::context::ProjectContext;
use super::{CommandResult, CommandSummary, RevertSummary, finish};
use crate::cli::args::RevertCommand;
use crate::core::batch::{collect_issues, revert_files};
use crate::core::{LocaleDictionary, RevertOptions};
use crate::issues::Issue;
use crate::utils::{revert_output_path, revert_output_root};

pub fn revert(cmd: RevertCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::load(cmd.common.path.as_deref(), cmd.common.verbose)?;
    let config = &ctx.config;

    let requested = cmd
        .locale
        .clone()
        .unwrap_or_else(|| config.base_locale.clone());
    let (locale, fallback_from) = if config.has_locale(&requested) {
        (requested, None)
    } else {
        (config.base_locale.clone(), Some(requested))
    };

    let dictionary = LocaleDictionary::load(&ctx.locale_path(&locale), &locale)?;
    let options = RevertOptions {
        rules: &config.i18n_call_rules,
        dictionary: &dictionary,
    };
    let entries = revert_files(&ctx.files, &options);

    let base_dir = ctx.base_dir();
    let out_dir: PathBuf = match &cmd.out_dir {
        Some(dir) => ctx.cwd.join(dir).components().collect(),
        None => ctx.resolve(&config.output_dir),
    };

    let mut written_count = 0;
    let mut reverted_count = 0;
    for entry in &entries {
        // Unsupported and unreadable files have no copy.
        let skipped = entry
            .outcome
            .issues
            .iter()
            .any(|i| matches!(i, Issue::UnsupportedDialect(_) | Issue::MalformedSource(_)));
        if skipped {
            continue;
        }

        let output = revert_output_path(&out_dir, &base_dir, &ctx.cwd.join(&entry.file_path));
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&output, entry.outcome.code())
            .with_context(|| format!("Failed to write {}", output.display()))?;

        written_count += 1;
        if entry.changed() {
            reverted_count += 1;
        }
    }

    let output_root = revert_output_root(&out_dir, &base_dir);
    Ok(finish(
        CommandSummary::Revert(RevertSummary {
            locale,
            fallback_from,
            output_root: ctx.display(&output_root),
            written_count,
            reverted_count,
        }),
        collect_issues(&entries),
        ctx.files.len(),
    ))
}
