//! Removal of the injected import and declaration after a revert.

use std::ops::Range;

use swc_ecma_ast::{Decl, ImportSpecifier, ModuleDecl, ModuleItem, ObjectPatProp, Pat, Stmt};

use crate::core::parsers::script::ParsedScript;
use crate::core::revert::reverter::RevertState;
use crate::core::rule::{CallRule, normalize_statement};
use crate::core::source::SourceContext;
use crate::issues::{AmbiguousCleanupIssue, CleanupReason, Issue};

/// Ranges of injected statements that can be deleted from `parsed`.
///
/// A statement is only removed when the pass reverted at least one call,
/// no matching call is left in the file, it appears exactly once, and none
/// of the names it binds is referenced anywhere else. Every statement that
/// matches but cannot be removed yields an `ambiguous-cleanup` issue.
pub fn plan_cleanup(
    state: &mut RevertState<'_>,
    parsed: &ParsedScript,
    rule: &CallRule,
) -> Vec<Range<usize>> {
    if state.reverted == 0 {
        return Vec::new();
    }

    let declarations = rule
        .declaration()
        .map(|statement| (statement, matching_items(parsed, state.source(), statement)))
        .filter(|(_, items)| !items.is_empty());
    let imports = rule
        .import()
        .map(|statement| (statement, matching_items(parsed, state.source(), statement)))
        .filter(|(_, items)| !items.is_empty());

    if state.remaining > 0 {
        for (statement, items) in declarations.iter().chain(imports.iter()) {
            let reason = CleanupReason::CallsRemain {
                count: state.remaining,
            };
            report(state, parsed, items[0], statement, reason);
        }
        return Vec::new();
    }

    let mut removed: Vec<Range<usize>> = Vec::new();
    // Declaration first: the import is usually only referenced by it.
    for (statement, items) in declarations.iter().chain(imports.iter()) {
        if items.len() > 1 {
            report(state, parsed, items[0], statement, CleanupReason::DuplicateStatement);
            continue;
        }
        let item = items[0];
        let range = parsed.range_of(item);
        let names = bound_names(item);

        let mut excluded = removed.clone();
        excluded.push(range.clone());
        let mut referenced: Vec<String> = state
            .references
            .iter()
            .filter(|(name, at)| names.contains(name) && !within_any(at, &excluded))
            .map(|(name, _)| name.clone())
            .collect();
        referenced.dedup();

        if referenced.is_empty() {
            removed.push(range);
        } else {
            report(
                state,
                parsed,
                item,
                statement,
                CleanupReason::StillReferenced { names: referenced },
            );
        }
    }
    removed
}

fn matching_items<'p>(parsed: &'p ParsedScript, source: &str, statement: &str) -> Vec<&'p ModuleItem> {
    let wanted = normalize_statement(statement);
    parsed
        .module
        .body
        .iter()
        .filter(|item| {
            source
                .get(parsed.range_of(*item))
                .is_some_and(|text| normalize_statement(text) == wanted)
        })
        .collect()
}

fn report(
    state: &mut RevertState<'_>,
    parsed: &ParsedScript,
    item: &ModuleItem,
    statement: &str,
    reason: CleanupReason,
) {
    let offset = parsed.range_of(item).start;
    let issue = AmbiguousCleanupIssue {
        context: SourceContext::at(state.file_path(), state.source(), offset),
        statement: statement.to_string(),
        reason,
    };
    state.issues.push(Issue::AmbiguousCleanup(issue));
}

fn within_any(range: &Range<usize>, outer: &[Range<usize>]) -> bool {
    outer
        .iter()
        .any(|o| o.start <= range.start && range.end <= o.end)
}

/// Names introduced by an import or variable declaration.
fn bound_names(item: &ModuleItem) -> Vec<String> {
    let mut names = Vec::new();
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
            for specifier in &import.specifiers {
                let local = match specifier {
                    ImportSpecifier::Named(named) => &named.local,
                    ImportSpecifier::Default(default) => &default.local,
                    ImportSpecifier::Namespace(namespace) => &namespace.local,
                };
                names.push(local.sym.to_string());
            }
        }
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
            for declarator in &var.decls {
                pat_names(&declarator.name, &mut names);
            }
        }
        _ => {}
    }
    names
}

fn pat_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => out.push(binding.id.sym.to_string()),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                pat_names(elem, out);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => pat_names(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.id.sym.to_string()),
                    ObjectPatProp::Rest(rest) => pat_names(&rest.arg, out),
                }
            }
        }
        Pat::Rest(rest) => pat_names(&rest.arg, out),
        Pat::Assign(assign) => pat_names(&assign.left, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::locale::LocaleDictionary;
    use crate::core::parsers::script::{ScriptSyntax, parse_script};

    fn plan(code: &str, rule: &CallRule) -> (Vec<String>, Vec<Issue>) {
        let dict = LocaleDictionary::from_entries("zh", [("k1", "你好")]);
        let parsed = parse_script(code, ScriptSyntax::typed(false), "a.ts", 0).unwrap();
        let mut state = RevertState::new(code, "a.ts", rule, &dict);
        state.run(&parsed, None);
        let ranges = plan_cleanup(&mut state, &parsed, rule);
        let removed = ranges.into_iter().map(|r| code[r].to_string()).collect();
        (removed, state.issues)
    }

    fn vue_rule() -> CallRule {
        CallRule::new("t")
            .with_import("import { useI18n } from 'vue-i18n'")
            .with_declaration("const { t } = useI18n()")
    }

    #[test]
    fn test_removes_declaration_then_import() {
        let code = "import { useI18n } from \"vue-i18n\";\nconst { t } = useI18n();\nconst a = t('k1');\n";
        let (removed, issues) = plan(code, &vue_rule());
        assert_eq!(
            removed,
            vec!["const { t } = useI18n();", "import { useI18n } from \"vue-i18n\";"]
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_remaining_calls_block_cleanup() {
        let code = "import { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\nconst a = t('k1')\nconst b = t('gone')\n";
        let (removed, issues) = plan(code, &vue_rule());
        assert!(removed.is_empty());
        let reasons: Vec<String> = issues
            .iter()
            .filter_map(|i| match i {
                Issue::AmbiguousCleanup(c) => Some(c.reason.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(reasons.len(), 2);
        // One missing key issue plus two cleanup issues.
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_duplicate_declaration_is_kept() {
        let code = "import { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\nconst { t } = useI18n()\nconst a = t('k1')\n";
        let (removed, issues) = plan(code, &vue_rule());
        // The import is still referenced by the kept declarations.
        assert!(removed.is_empty());
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            Issue::AmbiguousCleanup(AmbiguousCleanupIssue {
                reason: CleanupReason::DuplicateStatement,
                ..
            })
        ));
    }

    #[test]
    fn test_other_reference_keeps_import() {
        let rule = CallRule::new("t")
            .with_caller("i18n")
            .with_import("import i18n from '@/i18n'");
        let code = "import i18n from '@/i18n'\nconst a = i18n.t('k1')\ni18n.locale = 'en'\n";
        let (removed, issues) = plan(code, &rule);
        assert!(removed.is_empty());
        let Issue::AmbiguousCleanup(issue) = &issues[0] else {
            panic!("expected cleanup issue");
        };
        assert_eq!(
            issue.reason,
            CleanupReason::StillReferenced {
                names: vec!["i18n".to_string()]
            }
        );
    }

    #[test]
    fn test_nothing_reverted_nothing_removed() {
        let code = "import { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\n";
        let (removed, issues) = plan(code, &vue_rule());
        assert!(removed.is_empty());
        assert!(issues.is_empty());
    }
}
