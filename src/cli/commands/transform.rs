use std::fs;

use anyhow::{Context, Result};

use super::context::ProjectContext;
use super::{CommandResult, CommandSummary, TransformSummary, finish};
use crate::cli::args::TransformCommand;
use crate::core::batch::{collect_issues, transform_files};
use crate::core::{
    Classifier, Collector, KeyCollector, KeyConflictPolicy, LocaleDictionary, LocaleFile,
    TransformOptions,
};

pub fn transform(cmd: TransformCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::load(cmd.common.path.as_deref(), cmd.common.verbose)?;
    let config = &ctx.config;
    let locale_path = ctx.locale_path(&config.base_locale);
    let locale_file = ctx.display(&locale_path);

    let collector = KeyCollector::new(&config.key_prefix, config.key_conflict);
    if locale_path.exists() {
        let existing = LocaleDictionary::load(&locale_path, &config.base_locale)?;
        collector.seed(existing.iter());
    }

    let options = TransformOptions {
        rules: &config.i18n_call_rules,
        collector: &collector as &dyn Collector,
        classifier: Classifier::new(config.text_script),
    };
    let entries = transform_files(&ctx.files, &options);

    let mut issues = collect_issues(&entries);
    issues.extend(collector.conflict_issues(&locale_file));

    let blocked = cmd.apply
        && collector.policy() == KeyConflictPolicy::Error
        && !collector.conflicts().is_empty();

    let changed: Vec<_> = entries.iter().filter(|e| e.changed()).collect();
    let mut new_key_count = 0;
    if cmd.apply && !blocked {
        for entry in &changed {
            fs::write(&entry.file_path, entry.outcome.code())
                .with_context(|| format!("Failed to write {}", entry.file_path))?;
        }
        if collector.added_count() > 0 {
            let mut file = LocaleFile::open_or_create(&locale_path)?;
            new_key_count = file.merge(&collector.entries());
            file.save()?;
        }
    }

    Ok(finish(
        CommandSummary::Transform(TransformSummary {
            changed_files: changed.iter().map(|e| e.file_path.clone()).collect(),
            extracted_count: collector.added_count(),
            new_key_count,
            locale_file,
            is_apply: cmd.apply,
            blocked,
        }),
        issues,
        ctx.files.len(),
    ))
}
