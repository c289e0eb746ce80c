//! Component document (`.vue`) parser.
//!
//! Produces a lossless tree of byte ranges over the original text: top-level
//! blocks, elements with their attributes, text, `{{ }}` interpolations and
//! comments. Nothing is decoded or normalized; consumers slice the source.

use std::ops::Range;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use crate::core::edit::line_col;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose content is text and interpolations, but no tags.
const RCDATA_ELEMENTS: &[&str] = &["textarea"];

/// `alias in source` / `(item, index) of source`; group 1 is the source.
static V_FOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^.*?\s+(?:in|of)\s+(.*?)\s*$").unwrap());

const INTERPOLATION_START: &str = "{{";
const INTERPOLATION_END: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Range<usize>),
    Interpolation(Interpolation),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Whole element including the end tag, if any.
    pub range: Range<usize>,
    pub start_tag: Range<usize>,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Between the start tag and the end tag. Raw for raw-text elements.
    pub content: Range<usize>,
    pub self_closing: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.name.to_ascii_lowercase().as_str())
    }

    fn is_rcdata(&self) -> bool {
        RCDATA_ELEMENTS.contains(&self.name.to_ascii_lowercase().as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Name plus `=value`, quotes included.
    pub range: Range<usize>,
    pub value: Option<AttrValue>,
}

/// How an attribute value takes part in translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKind {
    /// Plain attribute; the value is literal text.
    Static(Range<usize>),
    /// `:name` / `v-bind:name` binding of a single attribute.
    Binding { name: String, expr: Range<usize> },
    /// Directive or handler whose value (or part of it) is script.
    Expression(Range<usize>),
    /// No value, slot patterns, and anything else that holds no text.
    Skip,
}

impl Attribute {
    pub fn value_text<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.value.as_ref().map(|v| &source[v.range.clone()])
    }

    pub fn quote(&self) -> Option<char> {
        self.value.as_ref().and_then(|v| v.quote)
    }

    pub fn kind(&self, source: &str) -> AttrKind {
        let Some(value) = &self.value else {
            return AttrKind::Skip;
        };
        let range = value.range.clone();
        let name = self.name.as_str();

        if name.starts_with('#') || name.starts_with("v-slot") || name == "v-pre" {
            return AttrKind::Skip;
        }
        if name == "v-for" {
            return V_FOR_REGEX
                .captures(&source[range.clone()])
                .and_then(|caps| caps.get(1))
                .map(|m| AttrKind::Expression(range.start + m.start()..range.start + m.end()))
                .unwrap_or(AttrKind::Skip);
        }

        let bound = name
            .strip_prefix(':')
            .or_else(|| name.strip_prefix("v-bind:"));
        if let Some(bound) = bound {
            let plain = !bound.is_empty() && !bound.contains(['.', '[']);
            return if plain {
                AttrKind::Binding {
                    name: bound.to_string(),
                    expr: range,
                }
            } else {
                AttrKind::Expression(range)
            };
        }
        if name.starts_with('@') || name.starts_with("v-") {
            return AttrKind::Expression(range);
        }
        AttrKind::Static(range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue {
    /// Inside the quotes.
    pub range: Range<usize>,
    pub quote: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub range: Range<usize>,
    /// Between `{{` and `}}`.
    pub expr: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub range: Range<usize>,
    pub body: Range<usize>,
}

/// Parsed component document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcDocument {
    pub nodes: Vec<Node>,
}

impl SfcDocument {
    pub fn blocks(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Top-level `<script>` blocks in document order.
    pub fn scripts(&self) -> impl Iterator<Item = &Element> {
        self.blocks().filter(|b| b.name == "script")
    }

    /// `lang` of the first script block that declares one.
    pub fn script_lang<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.scripts()
            .find_map(|s| s.attr("lang").and_then(|a| a.value_text(source)))
    }
}

pub fn parse_markup(source: &str) -> Result<SfcDocument> {
    let mut parser = MarkupParser {
        source,
        pos: 0,
        stack: Vec::new(),
        root: Vec::new(),
    };
    parser.build()?;
    Ok(SfcDocument { nodes: parser.root })
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    element: Element,
}

struct MarkupParser<'a> {
    source: &'a str,
    pos: usize,
    stack: Vec<OpenElement>,
    root: Vec<Node>,
}

impl<'a> MarkupParser<'a> {
    fn build(&mut self) -> Result<()> {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            if rest.starts_with("<!--") {
                self.consume_comment()?;
            } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
                self.consume_end_tag()?;
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.consume_start_tag()?;
            } else if rest.starts_with("<!") {
                self.consume_declaration()?;
            } else if rest.starts_with(INTERPOLATION_START) {
                self.consume_interpolation()?;
            } else {
                self.consume_text();
            }
        }

        if let Some(open) = self.stack.last() {
            return self.error(
                open.element.range.start,
                &format!("Unclosed element <{}>", open.element.name),
            );
        }
        Ok(())
    }

    fn consume_comment(&mut self) -> Result<()> {
        let start = self.pos;
        let body_start = start + 4;
        let Some(end) = self.source[body_start..].find("-->") else {
            return self.error(start, "Unterminated comment");
        };
        let body_end = body_start + end;
        self.pos = body_end + 3;
        self.add_to_parent(Node::Comment(Comment {
            range: start..self.pos,
            body: body_start..body_end,
        }));
        Ok(())
    }

    /// `<!DOCTYPE ...>` and similar are kept as comments.
    fn consume_declaration(&mut self) -> Result<()> {
        let start = self.pos;
        let Some(end) = self.source[start..].find('>') else {
            return self.error(start, "Unterminated declaration");
        };
        self.pos = start + end + 1;
        self.add_to_parent(Node::Comment(Comment {
            range: start..self.pos,
            body: start + 2..start + end,
        }));
        Ok(())
    }

    fn consume_interpolation(&mut self) -> Result<()> {
        let start = self.pos;
        let expr_start = start + INTERPOLATION_START.len();
        let Some(end) = self.source[expr_start..].find(INTERPOLATION_END) else {
            return self.error(start, "Unterminated interpolation");
        };
        let expr_end = expr_start + end;
        self.pos = expr_end + INTERPOLATION_END.len();
        self.add_to_parent(Node::Interpolation(Interpolation {
            range: start..self.pos,
            expr: expr_start..expr_end,
        }));
        Ok(())
    }

    fn consume_text(&mut self) {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        // The first character is text even if it looks like markup.
        let mut pos = start + self.source[start..].chars().next().map_or(1, char::len_utf8);
        while pos < bytes.len() {
            let rest = &self.source[pos..];
            if rest.starts_with(INTERPOLATION_START)
                || rest.starts_with("<!")
                || (rest.starts_with("</") && starts_tag_name(&rest[2..]))
                || (rest.starts_with('<') && starts_tag_name(&rest[1..]))
            {
                break;
            }
            pos += rest.chars().next().map(char::len_utf8).unwrap_or(1);
        }
        self.pos = pos;
        self.add_to_parent(Node::Text(start..pos));
    }

    fn consume_start_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_while(|c| !c.is_whitespace() && c != '/' && c != '>');
        let mut attrs = Vec::new();

        let self_closing = loop {
            self.skip_whitespace();
            let rest = &self.source[self.pos..];
            if rest.is_empty() {
                return self.error(start, &format!("Unterminated start tag <{}>", name));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            attrs.push(self.consume_attr(start, &name)?);
        };

        let start_tag = start..self.pos;
        let mut element = Element {
            name,
            range: start_tag.clone(),
            start_tag: start_tag.clone(),
            attrs,
            children: Vec::new(),
            content: self.pos..self.pos,
            self_closing,
        };

        if self_closing || VOID_ELEMENTS.contains(&element.name.to_ascii_lowercase().as_str()) {
            self.add_to_parent(Node::Element(element));
        } else if element.is_raw_text() || element.is_rcdata() {
            let close = format!("</{}", element.name.to_ascii_lowercase());
            let content_start = self.pos;
            let Some(found) = self.source[content_start..].to_ascii_lowercase().find(&close) else {
                return self.error(start, &format!("Unclosed element <{}>", element.name));
            };
            let content_end = content_start + found;
            let Some(gt) = self.source[content_end..].find('>') else {
                return self.error(content_end, &format!("Unterminated end tag </{}>", element.name));
            };
            self.pos = content_end + gt + 1;
            element.content = content_start..content_end;
            element.range = start..self.pos;
            if element.is_rcdata() {
                element.children = self.rcdata_children(content_start..content_end)?;
            }
            self.add_to_parent(Node::Element(element));
        } else {
            self.stack.push(OpenElement { element });
        }
        Ok(())
    }

    /// Text and `{{ }}` interpolations; `<` never opens a tag here.
    fn rcdata_children(&self, content: Range<usize>) -> Result<Vec<Node>> {
        let mut children = Vec::new();
        let mut pos = content.start;
        while pos < content.end {
            let Some(open) = self.source[pos..content.end].find(INTERPOLATION_START) else {
                children.push(Node::Text(pos..content.end));
                break;
            };
            let start = pos + open;
            if start > pos {
                children.push(Node::Text(pos..start));
            }
            let expr_start = start + INTERPOLATION_START.len();
            let Some(close) = self.source[expr_start..content.end].find(INTERPOLATION_END) else {
                return self.error(start, "Unterminated interpolation");
            };
            let expr_end = expr_start + close;
            pos = expr_end + INTERPOLATION_END.len();
            children.push(Node::Interpolation(Interpolation {
                range: start..pos,
                expr: expr_start..expr_end,
            }));
        }
        Ok(children)
    }

    fn consume_attr(&mut self, tag_start: usize, tag_name: &str) -> Result<Attribute> {
        let start = self.pos;
        let name = self.read_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/');
        let name = if name.is_empty() {
            // Stray `=`; take it as a name so the tag keeps advancing.
            self.read_one()
        } else {
            name
        };

        let after_name = self.pos;
        self.skip_whitespace();
        if !self.source[self.pos..].starts_with('=') {
            self.pos = after_name;
            return Ok(Attribute {
                name,
                range: start..after_name,
                value: None,
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.source[self.pos..].chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let value_start = self.pos + 1;
                let Some(end) = self.source[value_start..].find(quote) else {
                    return self.error(
                        tag_start,
                        &format!("Unterminated attribute value in <{}>", tag_name),
                    );
                };
                self.pos = value_start + end + 1;
                AttrValue {
                    range: value_start..value_start + end,
                    quote: Some(quote),
                }
            }
            Some(_) => {
                let value_start = self.pos;
                self.read_while(|c| !c.is_whitespace() && c != '>');
                AttrValue {
                    range: value_start..self.pos,
                    quote: None,
                }
            }
            None => {
                return self.error(tag_start, &format!("Unterminated start tag <{}>", tag_name));
            }
        };

        Ok(Attribute {
            name,
            range: start..self.pos,
            value: Some(value),
        })
    }

    fn consume_end_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_while(|c| !c.is_whitespace() && c != '>');
        let Some(gt) = self.source[self.pos..].find('>') else {
            return self.error(start, &format!("Unterminated end tag </{}>", name));
        };
        self.pos += gt + 1;

        let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| open.element.name.eq_ignore_ascii_case(&name))
        else {
            return self.error(start, &format!("Unexpected closing tag </{}>", name));
        };

        // Elements left open inside the matched one end where it ends.
        while self.stack.len() > depth + 1 {
            self.pop_container(start, start);
        }
        self.pop_container(start, self.pos);
        Ok(())
    }

    fn pop_container(&mut self, content_end: usize, end: usize) {
        if let Some(open) = self.stack.pop() {
            let mut element = open.element;
            element.content = element.start_tag.end..content_end;
            element.range = element.range.start..end;
            self.add_to_parent(Node::Element(element));
        }
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(open) => open.element.children.push(node),
            None => self.root.push(node),
        }
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        for c in self.source[start..].chars() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.source[start..self.pos].to_string()
    }

    fn read_one(&mut self) -> String {
        let start = self.pos;
        if let Some(c) = self.source[start..].chars().next() {
            self.pos += c.len_utf8();
        }
        self.source[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    fn error<T>(&self, offset: usize, message: &str) -> Result<T> {
        let (line, col) = line_col(self.source, offset);
        bail!("{} at {}:{}", message, line, col)
    }
}

fn starts_tag_name(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
