use std::ops::Range;

use anyhow::{Context, Result};

use crate::core::FileOutcome;
use crate::core::edit::expand_to_lines;
use crate::core::escape::{attr_value, is_markup_text_safe, quote_inside};
use crate::core::parsers::markup::{AttrKind, Attribute, Element, Interpolation, Node, parse_markup};
use crate::core::parsers::script::{ParsedScript, ScriptSyntax};
use crate::core::revert::RevertOptions;
use crate::core::revert::cleanup::plan_cleanup;
use crate::core::revert::reverter::RevertState;
use crate::core::rule::CallRule;
use crate::core::transform::{parse_block, parse_embedded};

/// Inverse pass for a component document.
///
/// Cleanup runs on the `<script setup>` block, or the first script block
/// when there is none. A setup block left with no content is removed.
pub fn revert_component(
    code: &str,
    file_path: &str,
    rule: &CallRule,
    options: &RevertOptions<'_>,
) -> Result<FileOutcome> {
    let document =
        parse_markup(code).with_context(|| format!("Failed to parse {}", file_path))?;
    let template_syntax = ScriptSyntax::from_lang(document.script_lang(code)).template();

    let mut state = RevertState::new(code, file_path, rule, options.dictionary);
    let mut scripts: Vec<(ParsedScript, &Element)> = Vec::new();

    for block in document.blocks() {
        match block.name.as_str() {
            "template" => {
                let mut reverter = TemplateReverter {
                    state: &mut state,
                    file_path,
                    syntax: template_syntax,
                };
                reverter.nodes(&block.children)?;
            }
            "script" => {
                let parsed = parse_block(code, file_path, block)?;
                state.run(&parsed, None);
                scripts.push((parsed, block));
            }
            _ => {}
        }
    }

    let target = scripts
        .iter()
        .find(|(_, block)| block.has_attr("setup"))
        .or(scripts.first());
    if let Some((parsed, block)) = target {
        let removals = plan_cleanup(&mut state, parsed, rule);
        if !removals.is_empty() && block.has_attr("setup") && leaves_empty(code, block, &removals) {
            state.edits.delete(block_removal(code, block.range.clone()));
        } else {
            for range in removals {
                state.edits.delete(expand_to_lines(code, range));
            }
        }
    }
    state.finish()
}

/// Returns true if nothing but whitespace remains in `block` after `removals`.
fn leaves_empty(code: &str, block: &Element, removals: &[Range<usize>]) -> bool {
    let mut sorted = removals.to_vec();
    sorted.sort_by_key(|r| r.start);
    let mut cursor = block.content.start;
    for range in sorted {
        if !code[cursor..range.start].trim().is_empty() {
            return false;
        }
        cursor = cursor.max(range.end);
    }
    code[cursor..block.content.end].trim().is_empty()
}

/// The block's lines, plus the blank line separating it from the
/// previous block when it ends the file.
fn block_removal(code: &str, block: Range<usize>) -> Range<usize> {
    let mut range = expand_to_lines(code, block);
    if range.end == code.len() && code[..range.start].ends_with("\n\n") {
        range.start -= 1;
    }
    range
}

struct TemplateReverter<'s, 'a> {
    state: &'s mut RevertState<'a>,
    file_path: &'a str,
    syntax: ScriptSyntax,
}

impl<'s, 'a> TemplateReverter<'s, 'a> {
    fn nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Element(element) => self.element(element)?,
                Node::Interpolation(interp) => self.interpolation(interp)?,
                Node::Text(_) | Node::Comment(_) => {}
            }
        }
        Ok(())
    }

    fn element(&mut self, element: &Element) -> Result<()> {
        if element.has_attr("v-pre") {
            return Ok(());
        }
        for attr in &element.attrs {
            match attr.kind(self.state.source()) {
                AttrKind::Binding { name, expr } => self.binding(attr, &name, expr)?,
                AttrKind::Expression(expr) => {
                    if let Some(parsed) = self.parse(expr)? {
                        self.state.run(&parsed, Some(quote_inside(attr.quote())));
                    }
                }
                AttrKind::Static(_) | AttrKind::Skip => {}
            }
        }
        self.nodes(&element.children)
    }

    /// `:title="t('key')"` becomes `title="文本"`.
    fn binding(&mut self, attr: &Attribute, name: &str, expr: Range<usize>) -> Result<()> {
        let Some(parsed) = self.parse(expr)? else {
            return Ok(());
        };
        if let Some((text, _)) = parsed.expression().and_then(|e| self.state.exact_text(e)) {
            let delimiter = attr.quote().unwrap_or('"');
            let value = attr_value(&text, delimiter);
            self.state.replace_exact(
                attr.range.clone(),
                format!("{}={}{}{}", name, delimiter, value, delimiter),
            );
            return Ok(());
        }
        self.state.run(&parsed, Some(quote_inside(attr.quote())));
        Ok(())
    }

    /// `{{ t('key') }}` becomes the text when it can stand as template text.
    fn interpolation(&mut self, interp: &Interpolation) -> Result<()> {
        let Some(parsed) = self.parse(interp.expr.clone())? else {
            return Ok(());
        };
        let exact = parsed.expression().and_then(|e| self.state.exact_text(e));
        match exact {
            Some((text, _)) if is_markup_text_safe(&text) => {
                self.state.replace_exact(interp.range.clone(), text);
            }
            _ => self.state.run(&parsed, None),
        }
        Ok(())
    }

    fn parse(&self, range: Range<usize>) -> Result<Option<ParsedScript>> {
        let source = self.state.source();
        if source[range.clone()].trim().is_empty() {
            return Ok(None);
        }
        parse_embedded(source, self.file_path, range, self.syntax).map(Some)
    }
}
