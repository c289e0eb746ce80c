use anyhow::{Context, Result};

use crate::core::FileOutcome;
use crate::core::edit::EditSet;
use crate::core::parsers::script::{ScriptSyntax, parse_script};
use crate::core::rule::CallRule;
use crate::core::transform::{Extractor, TransformOptions, inject_statements};

/// Forward pass for a plain or typed script file.
pub fn transform_script(
    code: &str,
    file_path: &str,
    syntax: ScriptSyntax,
    rule: &CallRule,
    options: &TransformOptions<'_>,
) -> Result<FileOutcome> {
    let parsed = parse_script(code, syntax, file_path, 0)
        .with_context(|| format!("Failed to parse {}", file_path))?;

    let mut edits = EditSet::new();
    let count = Extractor::new(
        &parsed,
        code,
        rule,
        options.collector,
        options.classifier,
        &mut edits,
    )
    .run();
    if count == 0 {
        return Ok(FileOutcome::unchanged(code));
    }

    inject_statements(&parsed, code, 0..code.len(), rule, &mut edits);
    let output = edits.apply(code)?;
    Ok(FileOutcome::rewritten(code, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::Classifier;
    use crate::core::collector::{KeyCollector, KeyConflictPolicy};
    use crate::core::rule::CallRules;
    use crate::core::transform::transform_code;
    use crate::core::Collector;
    use pretty_assertions::assert_eq;

    fn run(code: &str, file: &str, collector: &KeyCollector) -> FileOutcome {
        let rules = CallRules::default();
        let options = TransformOptions {
            rules: &rules,
            collector,
            classifier: Classifier::default(),
        };
        transform_code(code, file, &options).unwrap()
    }

    #[test]
    fn test_transform_ts_file() {
        let collector = KeyCollector::new("", KeyConflictPolicy::Error);
        let code = "export const title = '标题';\nexport const size = 10;\n";
        let outcome = run(code, "src/a.ts", &collector);
        let key = collector.get_key("标题");
        assert!(outcome.changed());
        assert_eq!(
            outcome.code(),
            format!(
                "import i18n from '@/i18n'\nexport const title = i18n.t('{}');\nexport const size = 10;\n",
                key
            )
        );
        assert_eq!(collector.entries().get(&key).map(String::as_str), Some("标题"));
    }

    #[test]
    fn test_no_op_without_target_text() {
        let collector = KeyCollector::new("", KeyConflictPolicy::Error);
        let code = "const a = 'hello';\nconst b = 42;\n";
        let outcome = run(code, "a.js", &collector);
        assert!(!outcome.changed());
        assert_eq!(outcome.code(), code);
        assert!(collector.entries().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let collector = KeyCollector::new("", KeyConflictPolicy::Error);
        let code = "const a = <p title=\"提示\">你好 {name}</p>;\n";
        let once = run(code, "a.jsx", &collector);
        let twice = run(once.code(), "a.jsx", &collector);
        assert!(once.changed());
        assert!(!twice.changed());
        assert_eq!(twice.code(), once.code());
    }

    #[test]
    fn test_parse_error_is_err() {
        let collector = KeyCollector::new("", KeyConflictPolicy::Error);
        let rules = CallRules::default();
        let options = TransformOptions {
            rules: &rules,
            collector: &collector,
            classifier: Classifier::default(),
        };
        let err = transform_code("const = '中';", "bad.ts", &options).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to parse bad.ts"));
    }

    #[test]
    fn test_unsupported_extension_reported() {
        let collector = KeyCollector::new("", KeyConflictPolicy::Error);
        let outcome = run("中文", "notes.md", &collector);
        assert!(!outcome.changed());
        assert_eq!(outcome.issues.len(), 1);
    }
}
