//! Translation call rules: what a synthesized call looks like, and how to
//! recognize one again after the code has been reformatted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swc_ecma_ast::{Expr, ExprOrSpread, Lit, MemberExpr, MemberProp, OptChainBase};

use crate::core::escape::{js_string, quote_of};

/// Per-extension template for a translation call and its companion statements.
///
/// ```json
/// {
///   "transCaller": "",
///   "transIdentifier": "t",
///   "importDeclaration": "import { useI18n } from 'vue-i18n'",
///   "variableDeclaration": "const { t } = useI18n()"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRule {
    /// Dotted expression the function is accessed on (`i18n`, `this`,
    /// `i18n.global`). Empty means a bare call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_caller: Option<String>,
    pub trans_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_declaration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_declaration: Option<String>,
}

impl CallRule {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            trans_caller: None,
            trans_identifier: identifier.into(),
            import_declaration: None,
            variable_declaration: None,
        }
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.trans_caller = Some(caller.into());
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import_declaration = Some(import.into());
        self
    }

    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.variable_declaration = Some(declaration.into());
        self
    }

    pub fn caller(&self) -> Option<&str> {
        self.trans_caller
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Callee text, e.g. `i18n.t` or `t`.
    pub fn callee(&self) -> String {
        match self.caller() {
            Some(caller) => format!("{}.{}", caller, self.trans_identifier.trim()),
            None => self.trans_identifier.trim().to_string(),
        }
    }

    /// Synthesize `callee('key')` using `quote` for the key literal.
    pub fn synthesize(&self, key: &str, quote: char) -> String {
        format!("{}({})", self.callee(), js_string(key, quote))
    }

    pub fn import(&self) -> Option<&str> {
        non_empty(self.import_declaration.as_deref())
    }

    pub fn declaration(&self) -> Option<&str> {
        non_empty(self.variable_declaration.as_deref())
    }

    pub fn matcher(&self) -> CallMatcher {
        let mut path: Vec<String> = self
            .caller()
            .map(|c| c.split('.').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        path.push(self.trans_identifier.trim().to_string());
        CallMatcher { path }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Normalized form of a statement for "is this the one we injected" checks.
///
/// Whitespace, a trailing semicolon and the quote style are not significant.
pub fn normalize_statement(statement: &str) -> String {
    statement
        .trim()
        .trim_end_matches(';')
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '"' || c == '`' { '\'' } else { c })
        .collect()
}

/// Call rules keyed by file extension (without the dot).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CallRules(BTreeMap<String, CallRule>);

impl CallRules {
    pub fn get(&self, extension: &str) -> Option<&CallRule> {
        self.0.get(extension)
    }

    pub fn insert(&mut self, extension: impl Into<String>, rule: CallRule) {
        self.0.insert(extension.into(), rule);
    }

    /// Fill in built-in rules for extensions the user did not configure.
    pub fn with_defaults(mut self) -> Self {
        for (ext, rule) in Self::default().0 {
            self.0.entry(ext).or_insert(rule);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CallRule)> {
        self.0.iter()
    }
}

impl Default for CallRules {
    fn default() -> Self {
        let script = CallRule::new("t")
            .with_caller("i18n")
            .with_import("import i18n from '@/i18n'");
        let vue = CallRule::new("t")
            .with_import("import { useI18n } from 'vue-i18n'")
            .with_declaration("const { t } = useI18n()");

        let mut rules = BTreeMap::new();
        for ext in ["js", "jsx", "cjs", "mjs", "ts", "tsx"] {
            rules.insert(ext.to_string(), script.clone());
        }
        rules.insert("vue".to_string(), vue);
        Self(rules)
    }
}

/// Structural predicate over a call's callee.
///
/// Matches the dotted path `caller.identifier` regardless of formatting,
/// parentheses, optional chaining or computed string members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMatcher {
    path: Vec<String>,
}

impl CallMatcher {
    pub fn matches(&self, callee: &Expr) -> bool {
        let mut segments = Vec::with_capacity(self.path.len());
        callee_path(callee, &mut segments) && segments == self.path
    }
}

fn callee_path(expr: &Expr, out: &mut Vec<String>) -> bool {
    match expr {
        Expr::Ident(ident) => {
            out.push(ident.sym.to_string());
            true
        }
        Expr::This(_) => {
            out.push("this".to_string());
            true
        }
        Expr::Paren(paren) => callee_path(&paren.expr, out),
        Expr::Member(member) => member_path(member, out),
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => member_path(member, out),
            OptChainBase::Call(_) => false,
        },
        _ => false,
    }
}

fn member_path(member: &MemberExpr, out: &mut Vec<String>) -> bool {
    if !callee_path(&member.obj, out) {
        return false;
    }
    match &member.prop {
        MemberProp::Ident(name) => {
            out.push(name.sym.to_string());
            true
        }
        MemberProp::Computed(computed) => match &*computed.expr {
            Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
                Some(value) => {
                    out.push(value.to_string());
                    true
                }
                None => false,
            },
            _ => false,
        },
        _ => false,
    }
}

/// Callee and arguments of a plain or optional call (`f(a)`, `o?.f(a)`,
/// `f?.(a)`).
pub fn call_parts(expr: &Expr) -> Option<(&Expr, &[ExprOrSpread])> {
    match expr {
        Expr::Call(call) => Some((&**call.callee.as_expr()?, call.args.as_slice())),
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Call(call) => Some((&*call.callee, call.args.as_slice())),
            OptChainBase::Member(_) => None,
        },
        Expr::Paren(paren) => call_parts(&paren.expr),
        _ => None,
    }
}

/// Static key passed as the first argument of a translation call.
///
/// Returns the key and the quote character it was written with.
pub fn static_key(args: &[ExprOrSpread]) -> Option<(String, char)> {
    let first = args.first()?;
    if first.spread.is_some() {
        return None;
    }
    let mut expr = &*first.expr;
    while let Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    match expr {
        Expr::Lit(Lit::Str(s)) => {
            Some((s.value.as_str()?.to_string(), quote_of(s.raw.as_deref())))
        }
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let cooked = tpl.quasis.first()?.cooked.as_ref()?;
            Some((cooked.as_str()?.to_string(), '\''))
        }
        _ => None,
    }
}
