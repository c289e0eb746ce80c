//! Text → key registry fed by the forward pass.
//!
//! The transformer only sees the two-operation [`Collector`] trait. The
//! shipped implementation, [`KeyCollector`], is shared across the rayon
//! workers of a batch and guards its state with a `Mutex`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::issues::{Issue, KeyConflictIssue};

/// Sink for extracted text.
///
/// Within one file, `get_key` and `add` are called in document order.
pub trait Collector: Send + Sync {
    fn add(&self, text: &str);
    fn get_key(&self, text: &str) -> String;
}

/// What to do when two distinct texts produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyConflictPolicy {
    FirstWriterWins,
    LastWriterWins,
    #[default]
    Error,
}

impl std::fmt::Display for KeyConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyConflictPolicy::FirstWriterWins => write!(f, "first-writer-wins"),
            KeyConflictPolicy::LastWriterWins => write!(f, "last-writer-wins"),
            KeyConflictPolicy::Error => write!(f, "error"),
        }
    }
}

/// A recorded key collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
    pub key: String,
    pub kept: String,
    pub discarded: String,
}

#[derive(Debug, Default)]
struct CollectorState {
    entries: BTreeMap<String, String>,
    keys_by_text: HashMap<String, String>,
    added: BTreeSet<String>,
    conflicts: Vec<KeyConflict>,
}

/// Collector generating `<prefix><fnv1a-32 hex>` keys.
#[derive(Debug)]
pub struct KeyCollector {
    prefix: String,
    policy: KeyConflictPolicy,
    state: Mutex<CollectorState>,
}

impl KeyCollector {
    pub fn new(prefix: impl Into<String>, policy: KeyConflictPolicy) -> Self {
        Self {
            prefix: prefix.into(),
            policy,
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Seed with entries already present in the base locale, so texts keep
    /// their existing keys across runs.
    ///
    /// When several keys hold the same text, the first one seeded wins;
    /// seeding from a [`LocaleDictionary`](crate::core::LocaleDictionary)
    /// makes that the lexicographically smallest key.
    pub fn seed<'a>(&self, entries: impl IntoIterator<Item = (&'a String, &'a String)>) {
        let mut state = self.lock();
        for (key, text) in entries {
            state
                .keys_by_text
                .entry(text.clone())
                .or_insert_with(|| key.clone());
            state.entries.insert(key.clone(), text.clone());
        }
    }

    pub fn policy(&self) -> KeyConflictPolicy {
        self.policy
    }

    /// All entries, seeded and collected.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.lock().entries.clone()
    }

    /// Number of entries added since construction (seeded entries excluded).
    pub fn added_count(&self) -> usize {
        self.lock().added.len()
    }

    pub fn conflicts(&self) -> Vec<KeyConflict> {
        self.lock().conflicts.clone()
    }

    /// Conflicts as reportable issues against `locale_file`.
    pub fn conflict_issues(&self, locale_file: &str) -> Vec<Issue> {
        self.conflicts()
            .into_iter()
            .map(|c| {
                Issue::KeyConflict(KeyConflictIssue {
                    locale_file: locale_file.to_string(),
                    key: c.key,
                    kept: c.kept,
                    discarded: c.discarded,
                    policy: self.policy,
                })
            })
            .collect()
    }

    fn generate(&self, text: &str) -> String {
        format!("{}{:08x}", self.prefix, fnv1a_32(text))
    }

    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Collector for KeyCollector {
    fn add(&self, text: &str) {
        let mut state = self.lock();
        if state.keys_by_text.contains_key(text) {
            return;
        }
        let key = self.generate(text);
        state.keys_by_text.insert(text.to_string(), key.clone());

        let Some(existing) = state.entries.get(&key).cloned() else {
            state.entries.insert(key.clone(), text.to_string());
            state.added.insert(key);
            return;
        };

        let (kept, discarded) = match self.policy {
            KeyConflictPolicy::LastWriterWins => {
                state.entries.insert(key.clone(), text.to_string());
                state.added.insert(key.clone());
                (text.to_string(), existing)
            }
            KeyConflictPolicy::FirstWriterWins | KeyConflictPolicy::Error => {
                (existing, text.to_string())
            }
        };
        state.conflicts.push(KeyConflict {
            key,
            kept,
            discarded,
        });
    }

    fn get_key(&self, text: &str) -> String {
        if let Some(key) = self.lock().keys_by_text.get(text) {
            return key.clone();
        }
        self.generate(text)
    }
}

fn fnv1a_32(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}
