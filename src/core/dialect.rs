//! Dialect routing.
//!
//! Each supported extension maps to one [`SourceDialect`]; the variant owns
//! the parser/transformer/reverter combination for that grammar.

use std::path::Path;

use anyhow::Result;
use enum_dispatch::enum_dispatch;

use crate::core::parsers::script::ScriptSyntax;
use crate::core::revert::{RevertOptions, revert_component, revert_script};
use crate::core::rule::{CallRule, CallRules};
use crate::core::transform::{TransformOptions, transform_component, transform_script};
use crate::core::FileOutcome;
use crate::issues::{UnsupportedDialectIssue, UnsupportedReason};

/// Forward and inverse pass for one grammar.
#[enum_dispatch]
pub trait Dialect {
    fn transform(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &TransformOptions<'_>,
    ) -> Result<FileOutcome>;

    fn revert(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &RevertOptions<'_>,
    ) -> Result<FileOutcome>;
}

/// JavaScript with JSX (`js`, `jsx`, `cjs`, `mjs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainScript;

/// TypeScript (`ts`), or TypeScript with JSX (`tsx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedScript {
    pub tsx: bool,
}

/// Markup with embedded script blocks (`vue`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDocument;

#[enum_dispatch(Dialect)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDialect {
    PlainScript,
    TypedScript,
    ComponentDocument,
}

impl Dialect for PlainScript {
    fn transform(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &TransformOptions<'_>,
    ) -> Result<FileOutcome> {
        transform_script(code, file_path, ScriptSyntax::plain(), rule, options)
    }

    fn revert(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &RevertOptions<'_>,
    ) -> Result<FileOutcome> {
        revert_script(code, file_path, ScriptSyntax::plain(), rule, options)
    }
}

impl Dialect for TypedScript {
    fn transform(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &TransformOptions<'_>,
    ) -> Result<FileOutcome> {
        transform_script(code, file_path, ScriptSyntax::typed(self.tsx), rule, options)
    }

    fn revert(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &RevertOptions<'_>,
    ) -> Result<FileOutcome> {
        revert_script(code, file_path, ScriptSyntax::typed(self.tsx), rule, options)
    }
}

impl Dialect for ComponentDocument {
    fn transform(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &TransformOptions<'_>,
    ) -> Result<FileOutcome> {
        transform_component(code, file_path, rule, options)
    }

    fn revert(
        &self,
        code: &str,
        file_path: &str,
        rule: &CallRule,
        options: &RevertOptions<'_>,
    ) -> Result<FileOutcome> {
        revert_component(code, file_path, rule, options)
    }
}

impl SourceDialect {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "js" | "jsx" | "cjs" | "mjs" => Some(PlainScript.into()),
            "ts" => Some(TypedScript { tsx: false }.into()),
            "tsx" => Some(TypedScript { tsx: true }.into()),
            "vue" => Some(ComponentDocument.into()),
            _ => None,
        }
    }
}

/// Extensions with a built-in dialect.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "jsx", "cjs", "mjs", "ts", "tsx", "vue"];

/// The dialect and call rule selected for one file.
#[derive(Debug, Clone)]
pub struct Route<'a> {
    pub dialect: SourceDialect,
    pub extension: String,
    pub rule: &'a CallRule,
}

/// Select the dialect and rule for `file_path` by extension.
pub fn route<'a>(
    file_path: &str,
    rules: &'a CallRules,
) -> std::result::Result<Route<'a>, UnsupportedDialectIssue> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let unsupported = |reason| UnsupportedDialectIssue {
        file_path: file_path.to_string(),
        extension: extension.clone(),
        reason,
    };

    let dialect = SourceDialect::from_extension(&extension)
        .ok_or_else(|| unsupported(UnsupportedReason::UnknownExtension))?;
    let rule = rules
        .get(&extension)
        .ok_or_else(|| unsupported(UnsupportedReason::NoCallRule))?;

    Ok(Route {
        dialect,
        extension,
        rule,
    })
}
