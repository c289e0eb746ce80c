//! Quoting helpers for regenerated literals.

/// JS string literal for `text` delimited by `quote` (`'` or `"`).
///
/// ```
/// use autoglot::core::escape::js_string;
///
/// assert_eq!(js_string("你好", '\''), "'你好'");
/// assert_eq!(js_string("it's", '\''), r"'it\'s'");
/// assert_eq!(js_string("a\nb", '"'), r#""a\nb""#);
/// ```
pub fn js_string(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Raw text for a template-literal segment.
pub fn template_raw(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Markup attribute value for an attribute delimited by `quote`.
pub fn attr_value(text: &str, quote: char) -> String {
    match quote {
        '\'' => text.replace('\'', "&#39;"),
        _ => text.replace('"', "&quot;"),
    }
}

/// Returns true if `text` can stand as JSX text without changing meaning.
pub fn is_jsx_text_safe(text: &str) -> bool {
    !text.is_empty()
        && text.trim() == text
        && !text.contains(['{', '}', '<', '>', '\n'])
}

/// Returns true if `text` can stand as template text without changing meaning.
pub fn is_markup_text_safe(text: &str) -> bool {
    !text.is_empty()
        && text.trim() == text
        && !text.contains('<')
        && !text.contains("{{")
        && !text.contains("}}")
}

/// Quote character of a raw string literal, defaulting to `'`.
pub fn quote_of(raw: Option<&str>) -> char {
    match raw.and_then(|r| r.chars().next()) {
        Some('"') => '"',
        _ => '\'',
    }
}

/// Quote to use inside a markup attribute delimited by `delimiter`.
pub fn quote_inside(delimiter: Option<char>) -> char {
    match delimiter {
        Some('\'') => '"',
        _ => '\'',
    }
}
