//! Byte-range rewrites over original source text.
//!
//! Both parser adapters serialize by patching the original text rather than
//! regenerating it from the tree, so everything the transformers do not touch
//! (formatting, comments, quote style) survives unchanged.

use std::ops::Range;

use anyhow::{Result, bail};

/// A single replacement of `range` in the original text.
///
/// An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Ordered collection of edits against one source text.
#[derive(Debug, Default, Clone)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.edits.push(TextEdit {
            range,
            replacement: replacement.into(),
        });
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    pub fn delete(&mut self, range: Range<usize>) {
        self.replace(range, String::new());
    }

    /// Apply all edits to `source`.
    ///
    /// Insertions at the same offset keep the order they were added in.
    /// Overlapping replacements are rejected.
    pub fn apply(&self, source: &str) -> Result<String> {
        let mut ordered: Vec<(usize, &TextEdit)> = self.edits.iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(a.range.end.cmp(&b.range.end))
                .then(ia.cmp(ib))
        });

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for (_, edit) in ordered {
            let Range { start, end } = edit.range;
            if start < cursor {
                bail!(
                    "Overlapping edits at byte {}..{} (previous edit ends at {})",
                    start,
                    end,
                    cursor
                );
            }
            if end > source.len() || !source.is_char_boundary(start) || !source.is_char_boundary(end)
            {
                bail!("Edit range {}..{} is outside the source text", start, end);
            }
            output.push_str(&source[cursor..start]);
            output.push_str(&edit.replacement);
            cursor = end;
        }
        output.push_str(&source[cursor..]);
        Ok(output)
    }
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset just past the newline ending the line containing `offset`,
/// or the end of the text for the last line.
pub fn next_line_start(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map(|i| offset + i + 1)
        .unwrap_or(source.len())
}

/// Range covering `range` plus its whole line(s) when nothing else shares them.
///
/// Used when deleting a statement so no blank line is left behind.
pub fn expand_to_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let start = line_start(source, range.start);
    let end = next_line_start(source, range.end);
    let before_blank = source[start..range.start].trim().is_empty();
    let after_blank = source[range.end..end].trim().is_empty();
    if before_blank && after_blank {
        start..end
    } else {
        range
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let start = line_start(source, offset);
    let line = source[..start].matches('\n').count() + 1;
    let col = source[start..offset].chars().count() + 1;
    (line, col)
}

/// Content of the line containing `offset`, without the newline.
pub fn line_text(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let start = line_start(source, offset);
    let end = source[start..]
        .find('\n')
        .map(|i| start + i)
        .unwrap_or(source.len());
    source[start..end].trim_end_matches('\r')
}
