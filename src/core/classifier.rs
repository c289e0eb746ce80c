//! Decides whether a piece of source text needs localization.
//!
//! Classification is content-based: a literal qualifies when its trimmed text
//! is non-empty and contains at least one character of the configured target
//! script. Where the literal sits (attribute, condition, handler argument)
//! never exempts it; only the ignore sentinel does.

use serde::{Deserialize, Serialize};

/// Comment marker that suppresses transformation of the next sibling subtree.
///
/// Recognized in `// ...`, `/* ... */`, `{/* ... */}` and `<!-- ... -->` comments.
pub const IGNORE_SENTINEL: &str = "autoglot-ignore";

/// Marker used by projects already annotated for the `auto-i18n` tool.
pub const LEGACY_IGNORE_SENTINEL: &str = "auto-i18n-ignore";

/// Writing system whose characters make a literal translatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextScript {
    /// CJK ideographs (Chinese source text).
    #[default]
    Han,
    /// Hiragana, katakana and CJK ideographs (Japanese source text).
    Kana,
    /// Hangul syllables and jamo.
    Hangul,
    Cyrillic,
    /// Any Unicode alphabetic character.
    Alphabetic,
}

impl TextScript {
    pub fn contains(self, c: char) -> bool {
        match self {
            TextScript::Han => is_han(c),
            TextScript::Kana => is_han(c) || is_kana(c),
            TextScript::Hangul => matches!(c,
                '\u{1100}'..='\u{11FF}'
                | '\u{3130}'..='\u{318F}'
                | '\u{A960}'..='\u{A97F}'
                | '\u{AC00}'..='\u{D7AF}'
                | '\u{D7B0}'..='\u{D7FF}'),
            TextScript::Cyrillic => matches!(c, '\u{0400}'..='\u{052F}' | '\u{1C80}'..='\u{1C8F}'),
            TextScript::Alphabetic => c.is_alphabetic(),
        }
    }
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{2A700}'..='\u{2EBEF}'
        | '\u{30000}'..='\u{3134F}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}')
}

/// Content-based literal classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    pub script: TextScript,
}

impl Classifier {
    pub fn new(script: TextScript) -> Self {
        Self { script }
    }

    /// Returns true if `text` should be replaced by a translation call.
    ///
    /// ```
    /// use autoglot::core::{Classifier, TextScript};
    ///
    /// let classifier = Classifier::new(TextScript::Han);
    /// assert!(classifier.is_translatable("你好"));
    /// assert!(classifier.is_translatable(" 共 3 条 "));
    /// assert!(!classifier.is_translatable("Hello"));
    /// assert!(!classifier.is_translatable("100%"));
    /// assert!(!classifier.is_translatable("  "));
    /// ```
    pub fn is_translatable(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty() && text.chars().any(|c| self.script.contains(c))
    }
}

/// Returns true if a comment body (without delimiters) is an ignore sentinel.
pub fn is_sentinel_comment(body: &str) -> bool {
    let body = body.trim().trim_start_matches('*').trim();
    body == IGNORE_SENTINEL || body == LEGACY_IGNORE_SENTINEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_han_classification() {
        let classifier = Classifier::default();
        assert!(classifier.is_translatable("标题"));
        assert!(classifier.is_translatable("第1页"));
        assert!(!classifier.is_translatable("123"));
        assert!(!classifier.is_translatable("，。！"));
        assert!(!classifier.is_translatable("Submit"));
        assert!(!classifier.is_translatable(""));
    }

    #[test]
    fn test_kana_includes_han() {
        let classifier = Classifier::new(TextScript::Kana);
        assert!(classifier.is_translatable("こんにちは"));
        assert!(classifier.is_translatable("日本"));
        assert!(!classifier.is_translatable("안녕"));
    }

    #[test]
    fn test_other_scripts() {
        assert!(Classifier::new(TextScript::Hangul).is_translatable("안녕하세요"));
        assert!(Classifier::new(TextScript::Cyrillic).is_translatable("Привет"));
        assert!(Classifier::new(TextScript::Alphabetic).is_translatable("Hello"));
        assert!(!Classifier::new(TextScript::Alphabetic).is_translatable("$100"));
    }

    #[test]
    fn test_sentinel_comment() {
        assert!(is_sentinel_comment(" autoglot-ignore "));
        assert!(is_sentinel_comment("* autoglot-ignore"));
        assert!(is_sentinel_comment(" auto-i18n-ignore "));
        assert!(is_sentinel_comment("*auto-i18n-ignore "));
        assert!(!is_sentinel_comment("autoglot-ignore-next"));
        assert!(!is_sentinel_comment("auto-i18n"));
        assert!(!is_sentinel_comment("todo"));
    }

    #[test]
    fn test_script_deserialize() {
        let script: TextScript = serde_json::from_str("\"alphabetic\"").unwrap();
        assert_eq!(script, TextScript::Alphabetic);
    }
}
