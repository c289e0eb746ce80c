use std::ops::Range;

use swc_ecma_ast::{
    CallExpr, Callee, ClassMember, Expr, JSXAttr, JSXAttrOrSpread, JSXAttrValue, JSXElementChild,
    Lit, ModuleItem, PropOrSpread, Stmt, Str, TaggedTpl, Tpl, TplElement, TsEnumDecl,
    VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::classifier::Classifier;
use crate::core::collector::Collector;
use crate::core::edit::EditSet;
use crate::core::escape::quote_of;
use crate::core::parsers::script::ParsedScript;
use crate::core::rule::CallRule;

/// Walks one parsed script and replaces every translatable literal with a
/// translation call.
///
/// Collector calls happen in document order. Literals in positions where a
/// call would not be valid code (import sources, property keys, literal
/// types, enum initializers, tagged templates) are never visited.
pub struct Extractor<'a> {
    parsed: &'a ParsedScript,
    source: &'a str,
    rule: &'a CallRule,
    collector: &'a dyn Collector,
    classifier: Classifier,
    /// Quote forced on synthesized keys (inside a markup attribute).
    forced_quote: Option<char>,
    edits: &'a mut EditSet,
    count: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(
        parsed: &'a ParsedScript,
        source: &'a str,
        rule: &'a CallRule,
        collector: &'a dyn Collector,
        classifier: Classifier,
        edits: &'a mut EditSet,
    ) -> Self {
        Self {
            parsed,
            source,
            rule,
            collector,
            classifier,
            forced_quote: None,
            edits,
            count: 0,
        }
    }

    pub fn with_quote(mut self, quote: Option<char>) -> Self {
        self.forced_quote = quote;
        self
    }

    /// Run over the whole module; returns the number of substitutions.
    pub fn run(mut self) -> usize {
        let parsed = self.parsed;
        parsed.module.visit_with(&mut self);
        self.count
    }

    fn suppressed(&self, range: &Range<usize>) -> bool {
        self.parsed.is_suppressed(range.start)
    }

    /// Register `text` and return the call that replaces it.
    fn call_for(&mut self, text: &str, quote: char) -> String {
        let key = self.collector.get_key(text);
        self.collector.add(text);
        self.count += 1;
        self.rule
            .synthesize(&key, self.forced_quote.unwrap_or(quote))
    }

    fn string_literal(&mut self, s: &Str) {
        let Some(value) = s.value.as_str() else {
            return;
        };
        if !self.classifier.is_translatable(value) {
            return;
        }
        let range = self.parsed.range(s.span);
        let call = self.call_for(value, quote_of(s.raw.as_deref()));
        self.edits.replace(range, call);
    }

    fn template_segment(&mut self, quasi: &TplElement) {
        let Some(cooked) = quasi.cooked.as_ref().and_then(|c| c.as_str()) else {
            return;
        };
        if !self.classifier.is_translatable(cooked) {
            return;
        }
        let Some(range) = self.quasi_range(quasi) else {
            return;
        };
        let source = self.source;
        let Some((trimmed, text)) = trim_template_raw(&source[range.clone()], cooked) else {
            return;
        };
        let start = range.start + trimmed.start;
        let end = range.start + trimmed.end;
        if !self.classifier.is_translatable(text) || self.parsed.is_suppressed(start) {
            return;
        }

        let call = self.call_for(text, '\'');
        self.edits.replace(start..end, format!("${{{}}}", call));
    }

    /// Source range of the raw segment text, without the delimiters.
    fn quasi_range(&self, quasi: &TplElement) -> Option<Range<usize>> {
        let mut range = self.parsed.range(quasi.span);
        let raw = quasi.raw.as_str();
        let text = self.source.get(range.clone())?;
        if text == raw {
            return Some(range);
        }
        if text.starts_with('`') || text.starts_with('}') {
            range.start += 1;
        }
        if text.ends_with("${") {
            range.end -= 2;
        } else if text.ends_with('`') {
            range.end -= 1;
        }
        (self.source.get(range.clone())? == raw).then_some(range)
    }

    fn jsx_text(&mut self, range: Range<usize>) {
        let source = self.source;
        let raw = &source[range.clone()];
        let trimmed = raw.trim();
        if !self.classifier.is_translatable(trimmed) {
            return;
        }
        let start = range.start + (raw.len() - raw.trim_start().len());
        if self.parsed.is_suppressed(start) {
            return;
        }
        let end = start + trimmed.len();

        let call = self.call_for(&collapse_jsx_whitespace(trimmed), '\'');
        self.edits.replace(start..end, format!("{{{}}}", call));
    }
}

/// JSX drops line breaks and the indentation around them.
/// Range of `raw` without its unescaped surrounding whitespace, and the
/// cooked text that range stands for.
///
/// Escapes such as `\n` are kept, so `` `\n你好` `` still yields a newline.
fn trim_template_raw<'c>(raw: &str, cooked: &'c str) -> Option<(Range<usize>, &'c str)> {
    let lead = raw.len() - raw.trim_start().len();
    let mut trail = raw.trim_end().len().max(lead);
    // A backslash escapes the first whitespace character after it.
    let backslashes = raw[..trail].chars().rev().take_while(|&c| c == '\\').count();
    if backslashes % 2 == 1 {
        let rest = &raw[trail..];
        trail += match rest.chars().next() {
            _ if rest.starts_with("\r\n") => 2,
            Some(c) => c.len_utf8(),
            None => 0,
        };
    }
    let text = cooked
        .strip_prefix(normalize_newlines(&raw[..lead]).as_str())?
        .strip_suffix(normalize_newlines(&raw[trail..]).as_str())?;
    Some((lead..trail, text))
}

/// Template literals cook `\r\n` and `\r` to `\n`.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn collapse_jsx_whitespace(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'a> Visit for Extractor<'a> {
    fn visit_module_item(&mut self, node: &ModuleItem) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_class_member(&mut self, node: &ClassMember) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_prop_or_spread(&mut self, node: &PropOrSpread) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_expr(&mut self, node: &Expr) {
        if self.suppressed(&self.parsed.range_of(node)) {
            return;
        }
        match node {
            Expr::Lit(Lit::Str(s)) => self.string_literal(s),
            _ => node.visit_children_with(self),
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        // `import('...')` takes a module specifier.
        if matches!(node.callee, Callee::Import(_)) {
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        for (index, quasi) in node.quasis.iter().enumerate() {
            self.template_segment(quasi);
            if let Some(expr) = node.exprs.get(index) {
                expr.visit_with(self);
            }
        }
    }

    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        node.tag.visit_with(self);
        for expr in &node.tpl.exprs {
            expr.visit_with(self);
        }
    }

    fn visit_ts_enum_decl(&mut self, _node: &TsEnumDecl) {}

    fn visit_jsx_attr_or_spread(&mut self, node: &JSXAttrOrSpread) {
        if !self.suppressed(&self.parsed.range_of(node)) {
            node.visit_children_with(self);
        }
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        match &node.value {
            Some(JSXAttrValue::Str(s)) => {
                let Some(value) = s.value.as_str() else {
                    return;
                };
                if !self.classifier.is_translatable(value) {
                    return;
                }
                let range = self.parsed.range(s.span);
                let call = self.call_for(value, quote_of(s.raw.as_deref()));
                self.edits.replace(range, format!("{{{}}}", call));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_jsx_element_child(&mut self, node: &JSXElementChild) {
        let range = self.parsed.range_of(node);
        if self.suppressed(&range) {
            return;
        }
        match node {
            JSXElementChild::JSXText(_) => self.jsx_text(range),
            _ => node.visit_children_with(self),
        }
    }
}
