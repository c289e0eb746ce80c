//! Script parser adapter built on swc.
//!
//! Spans coming out of swc are relative to a private `SourceMap`; every
//! [`ParsedScript`] knows where its text sits in the enclosing document so
//! callers only ever deal in document byte offsets.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{
    FileName, GLOBALS, Globals, SourceMap, Span, Spanned,
    comments::{Comment, SingleThreadedComments},
};
use swc_ecma_ast::{Expr, Module, ModuleItem, Stmt};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::core::classifier::is_sentinel_comment;
use crate::core::edit::line_col;

/// Grammar used to parse a piece of script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSyntax {
    typed: bool,
    jsx: bool,
}

impl ScriptSyntax {
    /// JavaScript with JSX.
    pub fn plain() -> Self {
        Self::es(true)
    }

    pub fn es(jsx: bool) -> Self {
        Self { typed: false, jsx }
    }

    pub fn typed(tsx: bool) -> Self {
        Self {
            typed: true,
            jsx: tsx,
        }
    }

    /// Syntax for a component `<script lang="...">` block.
    pub fn from_lang(lang: Option<&str>) -> Self {
        match lang.map(str::trim) {
            Some("ts") => Self::typed(false),
            Some("tsx") => Self::typed(true),
            Some("jsx") => Self::es(true),
            _ => Self::es(false),
        }
    }

    /// Same grammar without JSX, for template expressions.
    pub fn template(self) -> Self {
        Self { jsx: false, ..self }
    }

    fn to_swc(self) -> Syntax {
        if self.typed {
            Syntax::Typescript(TsSyntax {
                tsx: self.jsx,
                decorators: true,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx: self.jsx,
                decorators: true,
                ..Default::default()
            })
        }
    }
}

/// A parsed module plus the mapping from swc positions to document offsets.
#[derive(Debug)]
pub struct ParsedScript {
    pub module: Module,
    /// Text handed to swc (may carry a wrapper around the fragment).
    text: String,
    start_pos: u32,
    /// Document offset of the first byte of the fragment.
    base: usize,
    /// Bytes of wrapper text preceding the fragment.
    prefix_len: usize,
    len: usize,
    /// Document offsets of nodes an ignore sentinel points at.
    suppressed: HashSet<usize>,
}

impl ParsedScript {
    /// Document byte range of `span`.
    pub fn range(&self, span: Span) -> Range<usize> {
        self.offset(span.lo.0)..self.offset(span.hi.0)
    }

    pub fn range_of<T: Spanned>(&self, node: &T) -> Range<usize> {
        self.range(node.span())
    }

    fn offset(&self, pos: u32) -> usize {
        let local = pos.saturating_sub(self.start_pos) as usize;
        self.to_document(local)
    }

    fn to_document(&self, local: usize) -> usize {
        local.saturating_sub(self.prefix_len).min(self.len) + self.base
    }

    /// Returns true if an ignore sentinel comment directly precedes `offset`.
    pub fn is_suppressed(&self, offset: usize) -> bool {
        self.suppressed.contains(&offset)
    }

    /// The fragment as a single expression, if it is one.
    pub fn expression(&self) -> Option<&Expr> {
        let [ModuleItem::Stmt(Stmt::Expr(stmt))] = self.module.body.as_slice() else {
            return None;
        };
        match &*stmt.expr {
            Expr::Paren(paren) if self.prefix_len > 0 => Some(&paren.expr),
            expr => Some(expr),
        }
    }

    fn collect_suppressions(&mut self, comments: &SingleThreadedComments) {
        let (leading, trailing) = comments.borrow_all();
        let sentinels: Vec<&Comment> = leading
            .values()
            .chain(trailing.values())
            .flatten()
            .filter(|c| is_sentinel_comment(&c.text))
            .collect();

        for comment in sentinels {
            let lo = comment.span.lo.0.saturating_sub(self.start_pos) as usize;
            let hi = comment.span.hi.0.saturating_sub(self.start_pos) as usize;
            if let Some(target) = sentinel_target(&self.text, lo, hi) {
                let offset = self.to_document(target);
                self.suppressed.insert(offset);
            }
        }
    }
}

/// Offset of the first token after a sentinel comment spanning `lo..hi`.
///
/// A JSX comment container `{/* ... */}` is stepped over so the sentinel
/// points at the next child.
fn sentinel_target(text: &str, lo: usize, hi: usize) -> Option<usize> {
    let skip_ws = |from: usize| -> usize {
        let rest = text.get(from..).unwrap_or("");
        from + (rest.len() - rest.trim_start().len())
    };

    let mut target = skip_ws(hi);
    let opened_container = text
        .get(..lo)
        .map(|before| before.trim_end().ends_with('{'))
        .unwrap_or(false);
    if opened_container && text.get(target..)?.starts_with('}') {
        target = skip_ws(target + 1);
    }
    (target < text.len()).then_some(target)
}

/// Parse a complete script at document offset `base`.
pub fn parse_script(code: &str, syntax: ScriptSyntax, file_path: &str, base: usize) -> Result<ParsedScript> {
    parse_text(code.to_string(), syntax, file_path, base, 0, code.len()).map_err(|(offset, msg)| {
        let (line, col) = line_col(code, offset);
        anyhow!("{} at {}:{}", msg, line, col)
    })
}

/// Parse an embedded expression (template interpolation, attribute binding).
///
/// The fragment is parsed as a parenthesized expression first so object
/// literals and sequences work; event handlers holding statements fall back
/// to a statement list.
pub fn parse_fragment(code: &str, syntax: ScriptSyntax, file_path: &str, base: usize) -> Result<ParsedScript> {
    let wrapped = format!("({}\n)", code);
    match parse_text(wrapped, syntax, file_path, base, 1, code.len()) {
        Ok(parsed) if parsed.expression().is_some() => Ok(parsed),
        first => parse_text(code.to_string(), syntax, file_path, base, 0, code.len()).map_err(
            |(_, fallback)| match first {
                Err((_, msg)) => anyhow!("{}", msg),
                Ok(_) => anyhow!("{}", fallback),
            },
        ),
    }
}

fn parse_text(
    text: String,
    syntax: ScriptSyntax,
    file_path: &str,
    base: usize,
    prefix_len: usize,
    len: usize,
) -> std::result::Result<ParsedScript, (usize, String)> {
    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), text.clone());
        let start_pos = source_file.start_pos.0;

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            syntax.to_swc(),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let module = parser.parse_module().map_err(|e| {
            let offset = e.span().lo.0.saturating_sub(start_pos) as usize;
            (offset.saturating_sub(prefix_len), e.into_kind().msg().to_string())
        })?;

        let mut parsed = ParsedScript {
            module,
            text,
            start_pos,
            base,
            prefix_len,
            len,
            suppressed: HashSet::new(),
        };
        parsed.collect_suppressions(&comments);
        Ok(parsed)
    })
}
