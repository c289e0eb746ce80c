use std::collections::HashSet;
use std::ops::Range;

use swc_ecma_ast::{Expr, Lit, ModuleDecl, ModuleItem, Stmt};

use crate::core::edit::{EditSet, line_start, next_line_start};
use crate::core::parsers::script::ParsedScript;
use crate::core::rule::{CallRule, normalize_statement};

/// Insert the rule's import and declaration into a script once.
///
/// `region` is the script's extent in the document (the whole file, or the
/// content of a `<script>` block). The import goes before the first
/// non-directive item; the declaration after the last existing import.
/// Statements already present are left alone.
pub fn inject_statements(
    parsed: &ParsedScript,
    source: &str,
    region: Range<usize>,
    rule: &CallRule,
    edits: &mut EditSet,
) {
    let items = &parsed.module.body;
    let existing: HashSet<String> = items
        .iter()
        .map(|item| normalize_statement(&source[parsed.range_of(item)]))
        .collect();
    let missing = |statement: Option<&str>| -> Option<String> {
        statement
            .filter(|s| !existing.contains(&normalize_statement(s)))
            .map(str::to_string)
    };
    let import = missing(rule.import());
    let declaration = missing(rule.declaration());
    if import.is_none() && declaration.is_none() {
        return;
    }

    let directives = items.iter().take_while(|item| is_directive(item)).count();
    let anchor = match items.get(directives) {
        Some(item) => item_anchor(source, &region, parsed.range_of(item)),
        None => empty_anchor(source, &region, items.last().map(|i| parsed.range_of(i))),
    };

    if let Some(import) = &import {
        edits.insert(anchor.at, format!("{}{}{}\n", anchor.prefix, anchor.indent, import));
    }

    let Some(declaration) = declaration else {
        return;
    };
    let last_import = items
        .iter()
        .rev()
        .find(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))));
    match last_import {
        Some(item) => {
            let range = parsed.range_of(item);
            let at = next_line_start(source, range.end).min(region.end);
            let indent = leading_indent(source, range.start);
            if source[..at].ends_with('\n') && source[range.end..at].trim().is_empty() {
                edits.insert(at, format!("{}{}\n", indent, declaration));
            } else {
                edits.insert(range.end, format!("\n{}{}", indent, declaration));
            }
        }
        None => {
            let prefix = if import.is_some() { "" } else { anchor.prefix };
            edits.insert(
                anchor.at,
                format!("{}{}{}\n", prefix, anchor.indent, declaration),
            );
        }
    }
}

struct Anchor<'s> {
    at: usize,
    prefix: &'static str,
    indent: &'s str,
}

/// Insert on the line of `item`, keeping its indentation.
fn item_anchor<'s>(source: &'s str, region: &Range<usize>, item: Range<usize>) -> Anchor<'s> {
    let start = line_start(source, item.start).max(region.start);
    let before = &source[start..item.start];
    if before.trim().is_empty() {
        Anchor {
            at: start,
            prefix: "",
            indent: before,
        }
    } else {
        Anchor {
            at: item.start,
            prefix: "",
            indent: "",
        }
    }
}

/// No code items: after the last directive, or at the top of the region.
fn empty_anchor<'s>(source: &'s str, region: &Range<usize>, last: Option<Range<usize>>) -> Anchor<'s> {
    let at = match last {
        Some(range) => next_line_start(source, range.end).min(region.end),
        None if source[region.clone()].starts_with('\n') => region.start + 1,
        None => region.start,
    };
    let prefix = if at > region.start && !source[..at].ends_with('\n') {
        "\n"
    } else {
        ""
    };
    Anchor {
        at,
        prefix,
        indent: "",
    }
}

fn leading_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let before = &source[start..offset];
    if before.trim().is_empty() { before } else { "" }
}

fn is_directive(item: &ModuleItem) -> bool {
    match item {
        ModuleItem::Stmt(Stmt::Expr(stmt)) => matches!(&*stmt.expr, Expr::Lit(Lit::Str(_))),
        _ => false,
    }
}
