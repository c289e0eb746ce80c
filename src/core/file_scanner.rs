use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::core::dialect::SUPPORTED_EXTENSIONS;

/// Patterns without `*` or `?` are literal paths, so `app/[locale]` is not
/// read as a character class.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Source files in path order.
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

/// Collect source files under `root`.
///
/// `root` may also be a single file, which is returned as-is when it has a
/// supported extension. `includes` are directories (literal or glob)
/// relative to `root`; `ignores` are literal path prefixes or glob
/// patterns matched against the full path.
pub fn scan_files(root: &str, includes: &[String], ignores: &[String], verbose: bool) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let root_path = Path::new(root);
    if root_path.is_file() {
        if is_source_file(root_path) {
            files.insert(root.to_string());
        }
        return ScanResult {
            files,
            skipped_count,
        };
    }

    let mut literal_ignores: Vec<PathBuf> = Vec::new();
    let mut glob_ignores: Vec<Pattern> = Vec::new();
    for p in ignores {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_ignores.push(pattern),
                Err(e) => warn(verbose, format!("Invalid ignore pattern '{}': {}", p, e)),
            }
        } else {
            literal_ignores.push(root_path.join(p));
        }
    }

    for dir in scan_roots(root_path, includes, verbose) {
        let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
            let path = entry.path();
            !literal_ignores.iter().any(|ignore| path.starts_with(ignore))
        });
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn(verbose, format!("Cannot access path: {}", e));
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();
            if glob_ignores.iter().any(|p| p.matches(&path_str)) {
                continue;
            }
            if entry.file_type().is_file() && is_source_file(path) {
                files.insert(path_str.into_owned());
            }
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}

fn scan_roots(root: &Path, includes: &[String], verbose: bool) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![root.to_path_buf()];
    }
    let mut paths = Vec::new();
    for inc in includes {
        let full = root.join(inc);
        if is_glob_pattern(inc) {
            match glob(&full.to_string_lossy()) {
                Ok(entries) => paths.extend(entries.flatten().filter(|p| p.is_dir())),
                Err(e) => warn(verbose, format!("Invalid glob pattern '{}': {}", inc, e)),
            }
        } else if full.exists() {
            paths.push(full);
        } else {
            warn(
                verbose,
                format!("Include path does not exist: {}", full.display()),
            );
        }
    }
    paths
}

fn warn(verbose: bool, message: String) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}
