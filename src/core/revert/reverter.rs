use std::ops::Range;

use anyhow::Result;
use swc_ecma_ast::{
    CallExpr, Expr, ExprOrSpread, Ident, JSXAttr, JSXAttrValue, JSXElementChild, JSXExpr,
    OptChainBase, OptChainExpr, Tpl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::FileOutcome;
use crate::core::edit::EditSet;
use crate::core::escape::{is_jsx_text_safe, js_string, template_raw};
use crate::core::locale::LocaleDictionary;
use crate::core::parsers::script::ParsedScript;
use crate::core::rule::{CallMatcher, CallRule, call_parts, static_key};
use crate::core::source::SourceContext;
use crate::issues::{Issue, MissingLocaleKeyIssue};

/// What a matching call resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Localized text, and the quote the key was written with.
    Text { text: String, quote: char },
    /// Static key absent from the dictionary.
    Missing(String),
    /// Key is not a static string.
    Dynamic,
}

/// Per-file state of the inverse pass, shared by every script and
/// template fragment of the file.
pub struct RevertState<'a> {
    matcher: CallMatcher,
    dictionary: &'a LocaleDictionary,
    file_path: &'a str,
    source: &'a str,
    pub edits: EditSet,
    /// Calls replaced by text.
    pub reverted: usize,
    /// Matching calls left in place (missing or dynamic key).
    pub remaining: usize,
    /// Every identifier reference seen, with its document range.
    pub references: Vec<(String, Range<usize>)>,
    pub issues: Vec<Issue>,
}

impl<'a> RevertState<'a> {
    pub fn new(
        source: &'a str,
        file_path: &'a str,
        rule: &CallRule,
        dictionary: &'a LocaleDictionary,
    ) -> Self {
        Self {
            matcher: rule.matcher(),
            dictionary,
            file_path,
            source,
            edits: EditSet::new(),
            reverted: 0,
            remaining: 0,
            references: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn file_path(&self) -> &'a str {
        self.file_path
    }

    /// Resolve a call if its callee matches the rule. Pure; emits nothing.
    pub fn resolve(&self, callee: &Expr, args: &[ExprOrSpread]) -> Option<Resolution> {
        if !self.matcher.matches(callee) {
            return None;
        }
        let Some((key, quote)) = static_key(args) else {
            return Some(Resolution::Dynamic);
        };
        Some(match self.dictionary.get(&key) {
            Some(text) => Resolution::Text {
                text: text.to_string(),
                quote,
            },
            None => Resolution::Missing(key),
        })
    }

    /// Localized text if `expr` is exactly one resolvable call.
    pub fn exact_text(&self, expr: &Expr) -> Option<(String, char)> {
        let (callee, args) = call_parts(expr)?;
        match self.resolve(callee, args)? {
            Resolution::Text { text, quote } => Some((text, quote)),
            _ => None,
        }
    }

    /// Replace a whole construct holding one resolved call.
    pub fn replace_exact(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.edits.replace(range, replacement);
        self.reverted += 1;
    }

    /// Revert every matching call in `parsed`.
    pub fn run(&mut self, parsed: &ParsedScript, forced_quote: Option<char>) {
        let mut reverter = Reverter {
            state: self,
            parsed,
            forced_quote,
        };
        parsed.module.visit_with(&mut reverter);
    }

    fn missing_key(&mut self, key: String, offset: usize) {
        self.issues
            .push(Issue::MissingLocaleKey(MissingLocaleKeyIssue {
                context: SourceContext::at(self.file_path, self.source, offset),
                key,
                locale: self.dictionary.locale().to_string(),
            }));
    }

    /// Apply the collected edits.
    pub fn finish(self) -> Result<FileOutcome> {
        let output = self.edits.apply(self.source)?;
        Ok(FileOutcome::rewritten(self.source, output).with_issues(self.issues))
    }
}

struct Reverter<'s, 'a> {
    state: &'s mut RevertState<'a>,
    parsed: &'s ParsedScript,
    forced_quote: Option<char>,
}

impl<'s, 'a> Reverter<'s, 'a> {
    /// `${call}` in a template literal: the `${`..`}` range around `expr`.
    fn placeholder_range(&self, expr: &Expr) -> Option<Range<usize>> {
        let range = self.parsed.range_of(expr);
        let source = self.state.source;
        let before = source[..range.start].trim_end();
        let after = &source[range.end..];
        let after_trimmed = after.trim_start();
        if !before.ends_with("${") || !after_trimmed.starts_with('}') {
            return None;
        }
        let start = before.len() - 2;
        let end = range.end + (after.len() - after_trimmed.len()) + 1;
        Some(start..end)
    }

    /// Replace a resolved call spanning `range`, or record why it stays.
    ///
    /// Returns whether the children still need visiting.
    fn revert_call(&mut self, range: Range<usize>, resolution: Resolution) -> bool {
        match resolution {
            Resolution::Text { text, quote } => {
                let literal = js_string(&text, self.forced_quote.unwrap_or(quote));
                self.state.replace_exact(range, literal);
                false
            }
            Resolution::Missing(key) => {
                self.state.remaining += 1;
                self.state.missing_key(key, range.start);
                true
            }
            Resolution::Dynamic => {
                self.state.remaining += 1;
                true
            }
        }
    }

    fn jsx_container_expr<'n>(&self, expr: &'n JSXExpr) -> Option<&'n Expr> {
        match expr {
            JSXExpr::Expr(expr) => Some(expr),
            JSXExpr::JSXEmptyExpr(_) => None,
        }
    }
}

impl<'s, 'a> Visit for Reverter<'s, 'a> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        let resolution = node
            .callee
            .as_expr()
            .and_then(|callee| self.state.resolve(callee, &node.args));
        let descend = match resolution {
            Some(resolution) => self.revert_call(self.parsed.range_of(node), resolution),
            None => true,
        };
        if descend {
            node.visit_children_with(self);
        }
    }

    /// `i18n?.t('k')` and `t?.('k')`.
    fn visit_opt_chain_expr(&mut self, node: &OptChainExpr) {
        let resolution = match &*node.base {
            OptChainBase::Call(call) => self.state.resolve(&call.callee, &call.args),
            OptChainBase::Member(_) => None,
        };
        let descend = match resolution {
            Some(resolution) => self.revert_call(self.parsed.range_of(node), resolution),
            None => true,
        };
        if descend {
            node.visit_children_with(self);
        }
    }

    fn visit_ident(&mut self, node: &Ident) {
        let range = self.parsed.range_of(node);
        self.state.references.push((node.sym.to_string(), range));
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        for expr in &node.exprs {
            let exact = self.state.exact_text(expr);
            match (exact, self.placeholder_range(expr)) {
                (Some((text, _)), Some(range)) => {
                    self.state.replace_exact(range, template_raw(&text));
                }
                _ => expr.visit_with(self),
            }
        }
    }

    fn visit_jsx_element_child(&mut self, node: &JSXElementChild) {
        if let JSXElementChild::JSXExprContainer(container) = node
            && let Some(expr) = self.jsx_container_expr(&container.expr)
            && let Some((text, _)) = self.state.exact_text(expr)
            && is_jsx_text_safe(&text)
        {
            let range = self.parsed.range_of(container);
            self.state.replace_exact(range, text);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        if let Some(JSXAttrValue::JSXExprContainer(container)) = &node.value
            && let Some(expr) = self.jsx_container_expr(&container.expr)
            && let Some((text, quote)) = self.state.exact_text(expr)
        {
            let other = if quote == '"' { '\'' } else { '"' };
            let delimiter = [quote, other].into_iter().find(|q| !text.contains(*q));
            if let Some(delimiter) = delimiter {
                let range = self.parsed.range_of(container);
                self.state
                    .replace_exact(range, format!("{}{}{}", delimiter, text, delimiter));
                return;
            }
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::script::{ScriptSyntax, parse_script};
    use pretty_assertions::assert_eq;

    fn dictionary() -> LocaleDictionary {
        LocaleDictionary::from_entries(
            "zh",
            [("k1", "你好"), ("k2", "世界"), ("k3", "含\"引号'")],
        )
    }

    fn revert(code: &str, rule: &CallRule) -> (String, RevertState<'static>) {
        let dict: &'static LocaleDictionary = Box::leak(Box::new(dictionary()));
        let code: &'static str = Box::leak(code.to_string().into_boxed_str());
        let parsed = parse_script(code, ScriptSyntax::typed(true), "a.tsx", 0).unwrap();
        let mut state = RevertState::new(code, "a.tsx", rule, dict);
        state.run(&parsed, None);
        let output = state.edits.apply(code).unwrap();
        (output, state)
    }

    #[test]
    fn test_string_call_reverted() {
        let rule = CallRule::new("t").with_caller("i18n");
        let (out, state) = revert("const a = i18n.t('k1');\nconst b = i18n.t(\"k2\");\n", &rule);
        assert_eq!(out, "const a = '你好';\nconst b = \"世界\";\n");
        assert_eq!(state.reverted, 2);
        assert_eq!(state.remaining, 0);
    }

    #[test]
    fn test_missing_key_left_unchanged() {
        let rule = CallRule::new("t");
        let code = "const a = t('nope');\n";
        let (out, state) = revert(code, &rule);
        assert_eq!(out, code);
        assert_eq!(state.remaining, 1);
        assert_eq!(state.issues.len(), 1);
        let Issue::MissingLocaleKey(issue) = &state.issues[0] else {
            panic!("expected missing key issue");
        };
        assert_eq!(issue.key, "nope");
        assert_eq!(issue.context.line(), 1);
        assert_eq!(issue.context.col(), 11);
    }

    #[test]
    fn test_template_placeholder_reverted() {
        let rule = CallRule::new("t");
        let (out, _) = revert("const m = `${t('k1')} ${n} ${ t('k2') }`;\n", &rule);
        assert_eq!(out, "const m = `你好 ${n} 世界`;\n");
    }

    #[test]
    fn test_jsx_shapes_reverted() {
        let rule = CallRule::new("t");
        let code = "const el = <div title={t(\"k1\")} alt={t('k3')}>\n  {t('k2')}\n</div>;\n";
        let (out, state) = revert(code, &rule);
        assert_eq!(
            out,
            "const el = <div title=\"你好\" alt={'含\"引号\\''}>\n  世界\n</div>;\n"
        );
        assert_eq!(state.reverted, 3);
    }

    #[test]
    fn test_dynamic_key_counts_as_remaining() {
        let rule = CallRule::new("t");
        let (out, state) = revert("t(key, t('k1'));\n", &rule);
        assert_eq!(out, "t(key, '你好');\n");
        assert_eq!(state.remaining, 1);
        assert!(state.issues.is_empty());
    }

    #[test]
    fn test_optional_calls_reverted() {
        let rule = CallRule::new("t").with_caller("i18n");
        let (out, state) = revert(
            "const a = i18n?.t('k1');\nconst b = i18n.t?.(\"k2\");\nconst c = i18n?.t('nope');\n",
            &rule,
        );
        assert_eq!(
            out,
            "const a = '你好';\nconst b = \"世界\";\nconst c = i18n?.t('nope');\n"
        );
        assert_eq!(state.reverted, 2);
        assert_eq!(state.remaining, 1);
        assert_eq!(state.issues.len(), 1);
    }

    #[test]
    fn test_optional_call_in_template_and_jsx() {
        let rule = CallRule::new("t");
        let (out, _) = revert("const m = `${t?.('k1')}!`;\nconst el = <p>{t?.('k2')}</p>;\n", &rule);
        assert_eq!(out, "const m = `你好!`;\nconst el = <p>世界</p>;\n");
    }

    #[test]
    fn test_references_skip_reverted_callees() {
        let rule = CallRule::new("t");
        let (_, state) = revert("const x = t('k1');\nuse(t);\n", &rule);
        let names: Vec<&str> = state.references.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x", "use", "t"]);
    }
}
