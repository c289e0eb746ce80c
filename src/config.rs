use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{CallRules, KeyConflictPolicy, TextScript};

pub const CONFIG_FILE_NAME: &str = ".autoglotrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories to scan, relative to the config file. Empty scans the
    /// whole project.
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_locales_dir")]
    pub locales_dir: String,
    #[serde(default = "default_base_locale")]
    pub base_locale: String,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    /// Where `revert` writes its copies.
    #[serde(default = "default_output_dir", alias = "outputFileDir")]
    pub output_dir: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default)]
    pub key_conflict: KeyConflictPolicy,
    #[serde(default)]
    pub text_script: TextScript,
    /// Configured extensions replace the built-in rule; others keep it.
    #[serde(default, deserialize_with = "deserialize_call_rules")]
    pub i18n_call_rules: CallRules,
}

fn deserialize_call_rules<'de, D>(deserializer: D) -> std::result::Result<CallRules, D::Error>
where
    D: Deserializer<'de>,
{
    CallRules::deserialize(deserializer).map(CallRules::with_defaults)
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**"]
        .map(String::from)
        .to_vec()
}

fn default_locales_dir() -> String {
    "./locales".to_string()
}

fn default_base_locale() -> String {
    "zh-CN".to_string()
}

fn default_locales() -> Vec<String> {
    ["zh-CN", "en"].map(String::from).to_vec()
}

fn default_output_dir() -> String {
    "./.autoglot".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: default_ignores(),
            locales_dir: default_locales_dir(),
            base_locale: default_base_locale(),
            locales: default_locales(),
            output_dir: default_output_dir(),
            key_prefix: String::new(),
            key_conflict: KeyConflictPolicy::default(),
            text_script: TextScript::default(),
            i18n_call_rules: CallRules::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Rejects invalid glob patterns, an empty base locale, and call rules
    /// without a function identifier.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directories, so `[id]` is
        // valid without escaping.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.base_locale.trim().is_empty() {
            bail!("'baseLocale' must not be empty");
        }

        for (extension, rule) in self.i18n_call_rules.iter() {
            if rule.trans_identifier.trim().is_empty() {
                bail!(
                    "'i18nCallRules.{}.transIdentifier' must not be empty",
                    extension
                );
            }
        }

        Ok(())
    }

    /// Returns true if `locale` has a configured locale file.
    pub fn has_locale(&self, locale: &str) -> bool {
        locale == self.base_locale || self.locales.iter().any(|l| l == locale)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory relative paths in the config resolve against: the config
    /// file's directory, or the start directory when using defaults.
    pub root: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                root,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
