//! Locale files: flattened read access for revert, merge-and-save for transform.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// Path of the JSON file for `locale` under `locales_dir`.
pub fn locale_path(locales_dir: &Path, locale: &str) -> PathBuf {
    locales_dir.join(format!("{}.json", locale))
}

/// Key → localized text for one locale. Read-only during revert.
///
/// Iteration is in key order.
#[derive(Debug, Clone, Default)]
pub struct LocaleDictionary {
    locale: String,
    entries: BTreeMap<String, String>,
}

impl LocaleDictionary {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<K, V>(locale: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            locale: locale.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load `path`, flattening nested objects into dotted keys.
    pub fn load(path: &Path, locale: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read locale file: {}", path.display()))?;
        let json: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse locale file: {}", path.display()))?;

        let mut dictionary = Self::new(locale);
        flatten_json(&json, String::new(), &mut dictionary.entries);
        Ok(dictionary)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

fn flatten_json(value: &Value, prefix: String, result: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_json(val, new_prefix, result);
            }
        }
        Value::String(s) if !prefix.is_empty() => {
            result.insert(prefix, s.clone());
        }
        // Only string leaves can stand in for a literal.
        _ => {}
    }
}

/// Writable locale file preserving existing content and key order.
pub struct LocaleFile {
    file_path: PathBuf,
    data: Map<String, Value>,
}

impl LocaleFile {
    /// Open an existing locale file or start an empty one.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
            match value {
                Value::Object(map) => map,
                _ => bail!("Root of locale file must be an object: {}", path.display()),
            }
        } else {
            Map::new()
        };

        Ok(Self {
            file_path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Insert or overwrite every entry. Dotted keys create nested objects.
    ///
    /// Returns the number of keys that did not exist before.
    pub fn merge(&mut self, entries: &BTreeMap<String, String>) -> usize {
        entries
            .iter()
            .filter(|(key, text)| {
                let parts: Vec<&str> = key.split('.').collect();
                insert_nested(&mut self.data, &parts, Value::String((*text).clone()))
            })
            .count()
    }

    /// Save with 2-space indentation and a trailing newline.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.data).context("Failed to serialize JSON")?;

        fs::write(&self.file_path, format!("{}\n", content))
            .with_context(|| format!("Failed to write file: {}", self.file_path.display()))?;

        Ok(())
    }
}

/// Insert `value` at `path`, creating intermediate objects. Returns true if
/// the key is new.
fn insert_nested(root: &mut Map<String, Value>, path: &[&str], value: Value) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return root.insert(first.to_string(), value).is_none();
    }

    let next_level = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !next_level.is_object() {
        *next_level = Value::Object(Map::new());
    }
    match next_level.as_object_mut() {
        Some(inner) => insert_nested(inner, rest, value),
        None => false,
    }
}
