use std::ops::Range;

use anyhow::{Context, Result};

use crate::core::FileOutcome;
use crate::core::classifier::is_sentinel_comment;
use crate::core::edit::{EditSet, line_col};
use crate::core::escape::quote_inside;
use crate::core::parsers::markup::{AttrKind, Attribute, Element, Node, SfcDocument, parse_markup};
use crate::core::parsers::script::{ParsedScript, ScriptSyntax, parse_fragment, parse_script};
use crate::core::rule::CallRule;
use crate::core::transform::{Extractor, TransformOptions, inject_statements};

/// Forward pass for a component document.
///
/// Blocks are visited in document order, so a template placed before the
/// script has its text collected first. Statements are injected into the
/// `<script setup>` block, else the first `<script>` block; a setup block
/// is created only when the document has no script.
pub fn transform_component(
    code: &str,
    file_path: &str,
    rule: &CallRule,
    options: &TransformOptions<'_>,
) -> Result<FileOutcome> {
    let document =
        parse_markup(code).with_context(|| format!("Failed to parse {}", file_path))?;
    let template_syntax = ScriptSyntax::from_lang(document.script_lang(code)).template();

    let mut edits = EditSet::new();
    let mut count = 0;
    let mut setup: Option<(ParsedScript, Range<usize>)> = None;
    let mut first_script: Option<(ParsedScript, Range<usize>)> = None;

    for node in unsuppressed(&document.nodes, code) {
        let Node::Element(block) = node else {
            continue;
        };
        match block.name.as_str() {
            "template" => {
                let mut walker = TemplateWalker {
                    source: code,
                    file_path,
                    rule,
                    options,
                    syntax: template_syntax,
                    edits: &mut edits,
                    count: 0,
                };
                walker.nodes(&block.children)?;
                count += walker.count;
            }
            "script" => {
                let parsed = parse_block(code, file_path, block)?;
                count += Extractor::new(
                    &parsed,
                    code,
                    rule,
                    options.collector,
                    options.classifier,
                    &mut edits,
                )
                .run();
                if block.has_attr("setup") && setup.is_none() {
                    setup = Some((parsed, block.content.clone()));
                } else if first_script.is_none() {
                    first_script = Some((parsed, block.content.clone()));
                }
            }
            _ => {}
        }
    }

    if count == 0 {
        return Ok(FileOutcome::unchanged(code));
    }

    match setup.as_ref().or(first_script.as_ref()) {
        Some((parsed, region)) => inject_statements(parsed, code, region.clone(), rule, &mut edits),
        None => append_setup_block(code, &document, rule, &mut edits),
    }
    let output = edits.apply(code)?;
    Ok(FileOutcome::rewritten(code, output))
}

/// Parse the content of a `<script>` block in document coordinates.
pub(crate) fn parse_block(code: &str, file_path: &str, block: &Element) -> Result<ParsedScript> {
    let lang = block.attr("lang").and_then(|a| a.value_text(code));
    let content = block.content.clone();
    parse_script(
        &code[content.clone()],
        ScriptSyntax::from_lang(lang),
        file_path,
        content.start,
    )
    .with_context(|| {
        let (line, _) = line_col(code, block.range.start);
        format!("Failed to parse <script> block of {} (line {})", file_path, line)
    })
}

/// Parse an embedded expression, with the document position as context.
pub(crate) fn parse_embedded(
    code: &str,
    file_path: &str,
    range: Range<usize>,
    syntax: ScriptSyntax,
) -> Result<ParsedScript> {
    parse_fragment(&code[range.clone()], syntax, file_path, range.start).with_context(|| {
        let (line, col) = line_col(code, range.start);
        format!("Invalid template expression in {} at {}:{}", file_path, line, col)
    })
}

/// Siblings not covered by an ignore sentinel comment.
///
/// The sentinel applies to the next non-whitespace sibling only.
fn unsuppressed<'n>(nodes: &'n [Node], source: &str) -> Vec<&'n Node> {
    let mut suppress_next = false;
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Comment(comment) => {
                if is_sentinel_comment(&source[comment.body.clone()]) {
                    suppress_next = true;
                }
                continue;
            }
            Node::Text(range) if source[range.clone()].trim().is_empty() => continue,
            _ => {}
        }
        if std::mem::take(&mut suppress_next) {
            continue;
        }
        kept.push(node);
    }
    kept
}

fn append_setup_block(code: &str, document: &SfcDocument, rule: &CallRule, edits: &mut EditSet) {
    let statements: Vec<&str> = [rule.import(), rule.declaration()]
        .into_iter()
        .flatten()
        .collect();
    if statements.is_empty() {
        return;
    }
    let lang = document
        .script_lang(code)
        .map(|lang| format!(" lang=\"{}\"", lang))
        .unwrap_or_default();
    let separator = match code {
        "" => "",
        c if c.ends_with('\n') => "\n",
        _ => "\n\n",
    };
    edits.insert(
        code.len(),
        format!(
            "{}<script setup{}>\n{}\n</script>\n",
            separator,
            lang,
            statements.join("\n")
        ),
    );
}

struct TemplateWalker<'a, 'o> {
    source: &'a str,
    file_path: &'a str,
    rule: &'a CallRule,
    options: &'a TransformOptions<'o>,
    syntax: ScriptSyntax,
    edits: &'a mut EditSet,
    count: usize,
}

impl<'a, 'o> TemplateWalker<'a, 'o> {
    fn nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in unsuppressed(nodes, self.source) {
            match node {
                Node::Element(element) => self.element(element)?,
                Node::Text(range) => self.text(range.clone()),
                Node::Interpolation(interp) => self.expression(interp.expr.clone(), None)?,
                Node::Comment(_) => {}
            }
        }
        Ok(())
    }

    fn element(&mut self, element: &Element) -> Result<()> {
        if element.has_attr("v-pre") {
            return Ok(());
        }
        for attr in &element.attrs {
            self.attribute(attr)?;
        }
        self.nodes(&element.children)
    }

    fn attribute(&mut self, attr: &Attribute) -> Result<()> {
        match attr.kind(self.source) {
            AttrKind::Static(range) => {
                self.static_attribute(attr, range);
                Ok(())
            }
            AttrKind::Binding { expr, .. } | AttrKind::Expression(expr) => {
                self.expression(expr, Some(quote_inside(attr.quote())))
            }
            AttrKind::Skip => Ok(()),
        }
    }

    /// `title="文本"` becomes `:title="t('key')"`.
    fn static_attribute(&mut self, attr: &Attribute, range: Range<usize>) {
        let source = self.source;
        let text = &source[range];
        if !self.options.classifier.is_translatable(text) {
            return;
        }
        let delimiter = attr.quote().unwrap_or('"');
        let call = self.call_for(text, quote_inside(Some(delimiter)));
        self.edits.replace(
            attr.range.clone(),
            format!(":{}={}{}{}", attr.name, delimiter, call, delimiter),
        );
    }

    /// Text becomes `{{ t('key') }}`; surrounding whitespace stays.
    fn text(&mut self, range: Range<usize>) {
        let source = self.source;
        let raw = &source[range.clone()];
        let trimmed = raw.trim();
        if !self.options.classifier.is_translatable(trimmed) {
            return;
        }
        let start = range.start + (raw.len() - raw.trim_start().len());
        let call = self.call_for(trimmed, '\'');
        self.edits
            .replace(start..start + trimmed.len(), format!("{{{{ {} }}}}", call));
    }

    fn expression(&mut self, range: Range<usize>, quote: Option<char>) -> Result<()> {
        if self.source[range.clone()].trim().is_empty() {
            return Ok(());
        }
        let parsed = parse_embedded(self.source, self.file_path, range, self.syntax)?;
        self.count += Extractor::new(
            &parsed,
            self.source,
            self.rule,
            self.options.collector,
            self.options.classifier,
            &mut *self.edits,
        )
        .with_quote(quote)
        .run();
        Ok(())
    }

    fn call_for(&mut self, text: &str, quote: char) -> String {
        let key = self.options.collector.get_key(text);
        self.options.collector.add(text);
        self.count += 1;
        self.rule.synthesize(&key, quote)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::core::classifier::Classifier;
    use crate::core::collector::Collector;
    use crate::core::rule::CallRules;
    use crate::core::transform::transform_code;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingCollector {
        texts: Mutex<Vec<String>>,
    }

    impl Collector for RecordingCollector {
        fn add(&self, text: &str) {
            self.texts.lock().unwrap().push(text.to_string());
        }

        fn get_key(&self, _text: &str) -> String {
            format!("k{}", self.texts.lock().unwrap().len())
        }
    }

    fn run(code: &str) -> (FileOutcome, Vec<String>) {
        let rules = CallRules::default();
        let collector = RecordingCollector::default();
        let options = TransformOptions {
            rules: &rules,
            collector: &collector,
            classifier: Classifier::default(),
        };
        let outcome = transform_code(code, "App.vue", &options).unwrap();
        let texts = collector.texts.lock().unwrap().clone();
        (outcome, texts)
    }

    #[test]
    fn test_document_order() {
        let code = "<template>\n  <div>这{{title}}</div>\n</template>\n<script setup>\nlet title = \"标题\"\n</script>\n";
        let (outcome, texts) = run(code);
        assert_eq!(texts, vec!["这", "标题"]);
        assert_eq!(
            outcome.code(),
            "<template>\n  <div>{{ t('k0') }}{{title}}</div>\n</template>\n<script setup>\nimport { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\nlet title = t(\"k1\")\n</script>\n"
        );
    }

    #[test]
    fn test_attribute_and_handler_extraction() {
        let code = "<template>\n  <button @click=\"()=>{a=t('我啊')}\" :title=\"'好呢'\">x</button>\n</template>\n";
        let (outcome, texts) = run(code);
        assert_eq!(texts, vec!["我啊", "好呢"]);
        assert!(outcome.code().contains("@click=\"()=>{a=t(t('k0'))}\" :title=\"t('k1')\""));
    }

    #[test]
    fn test_static_attribute_becomes_binding() {
        let code = "<template><input placeholder='请输入' type=\"text\"></template>\n<script setup lang=\"ts\">\nconst a = 1\n</script>\n";
        let (outcome, _) = run(code);
        assert!(outcome.code().contains("<input :placeholder='t(\"k0\")' type=\"text\">"));
        assert!(outcome.code().contains("<script setup lang=\"ts\">\nimport { useI18n }"));
    }

    #[test]
    fn test_sentinel_suppresses_element_subtree() {
        let code = "<template>\n  <!-- autoglot-ignore -->\n  <p title=\"忽略\">忽略<b>忽略</b></p>\n  <p>保留</p>\n</template>\n";
        let (_, texts) = run(code);
        assert_eq!(texts, vec!["保留"]);
    }

    #[test]
    fn test_legacy_sentinel_suppresses_element() {
        let code = "<template>\n  <!-- auto-i18n-ignore -->\n  <p>忽略</p>\n  <p>保留</p>\n</template>\n";
        let (_, texts) = run(code);
        assert_eq!(texts, vec!["保留"]);
    }

    #[test]
    fn test_creates_setup_block_when_missing() {
        let code = "<template><p>你好</p></template>";
        let (outcome, _) = run(code);
        assert_eq!(
            outcome.code(),
            "<template><p>{{ t('k0') }}</p></template>\n\n<script setup>\nimport { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\n</script>\n"
        );
    }

    #[test]
    fn test_injects_into_existing_script_block() {
        let code = "<template><p>你好</p></template>\n<script>\nexport default { data() { return { m: '标题' } } }\n</script>\n";
        let (outcome, _) = run(code);
        assert_eq!(
            outcome.code(),
            "<template><p>{{ t('k0') }}</p></template>\n<script>\nimport { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\nexport default { data() { return { m: t('k1') } } }\n</script>\n"
        );
        assert_eq!(outcome.code().matches("<script").count(), 1);
    }

    #[test]
    fn test_setup_block_preferred_over_plain_script() {
        let code = "<script>\nexport default { name: 'A' }\n</script>\n<script setup>\nconst m = '标题'\n</script>\n";
        let (outcome, _) = run(code);
        assert_eq!(
            outcome.code(),
            "<script>\nexport default { name: 'A' }\n</script>\n<script setup>\nimport { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\nconst m = t('k0')\n</script>\n"
        );
    }

    #[test]
    fn test_template_text_starting_with_cjk() {
        let (outcome, texts) = run("<template><p>你好</p><textarea>说明</textarea></template>");
        assert_eq!(texts, vec!["你好", "说明"]);
        assert!(outcome.code().starts_with("<template><p>{{ t('k0') }}</p><textarea>{{ t('k1') }}</textarea></template>"));
    }

    #[test]
    fn test_v_for_and_slots() {
        let code = "<template><li v-for=\"x in ['甲', '乙']\" #item=\"{ 丙 }\">{{ x }}</li></template>";
        let (_, texts) = run(code);
        assert_eq!(texts, vec!["甲", "乙"]);
    }

    #[test]
    fn test_v_pre_skipped() {
        let (outcome, texts) = run("<template><p v-pre>{{ 原样 }}</p></template>");
        assert!(texts.is_empty());
        assert!(!outcome.changed());
    }

    #[test]
    fn test_malformed_template_is_err() {
        let rules = CallRules::default();
        let collector = RecordingCollector::default();
        let options = TransformOptions {
            rules: &rules,
            collector: &collector,
            classifier: Classifier::default(),
        };
        assert!(transform_code("<template><p>{{ a + }}</p></template>", "A.vue", &options).is_err());
        assert!(transform_code("<template><p></template>", "A.vue", &options).is_ok());
        assert!(transform_code("<template>", "A.vue", &options).is_err());
    }
}
