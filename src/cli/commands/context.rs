//! Per-invocation project state: configuration, paths and the file list.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config};
use crate::core::file_scanner::scan_files;
use crate::core::locale::locale_path;
use crate::utils::display_path;

pub struct ProjectContext {
    pub config: Config,
    /// Directory holding the config file, or `cwd` when using defaults.
    pub root: PathBuf,
    pub cwd: PathBuf,
    /// Explicit PATH argument, absolute.
    pub target: Option<PathBuf>,
    /// Source files to process, relative to `cwd` when under it.
    pub files: Vec<String>,
}

impl ProjectContext {
    pub fn load(path: Option<&Path>, verbose: bool) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        let target = path.map(|p| normalize(&cwd.join(p)));
        if let Some(target) = &target
            && !target.exists()
        {
            bail!("Path does not exist: {}", target.display());
        }

        let search_from = match &target {
            Some(t) if t.is_file() => t.parent().unwrap_or(&cwd).to_path_buf(),
            Some(t) => t.clone(),
            None => cwd.clone(),
        };
        let ConfigLoadResult {
            config,
            root,
            from_file,
        } = load_config(&search_from)?;
        // Without a config file, paths resolve against the working directory.
        let root = if from_file { root } else { cwd.clone() };
        if verbose && !from_file {
            eprintln!(
                "{} no {} found, using defaults",
                "note:".bold(),
                CONFIG_FILE_NAME
            );
        }

        // Revert copies must never be picked up as sources.
        let mut ignores = config.ignores.clone();
        ignores.push(normalize(&root.join(&config.output_dir)).to_string_lossy().into_owned());

        let scan = match &target {
            Some(t) => scan_files(&t.to_string_lossy(), &[], &ignores, verbose),
            None => scan_files(&root.to_string_lossy(), &config.includes, &ignores, verbose),
        };
        if verbose && scan.skipped_count > 0 {
            eprintln!(
                "{} {} path(s) could not be accessed",
                "warning:".bold().yellow(),
                scan.skipped_count
            );
        }
        let files = scan
            .files
            .iter()
            .map(|f| display_path(Path::new(f), &cwd))
            .collect();

        Ok(Self {
            config,
            root,
            cwd,
            target,
            files,
        })
    }

    /// `<root>/<localesDir>/<locale>.json`.
    pub fn locale_path(&self, locale: &str) -> PathBuf {
        locale_path(&self.resolve(&self.config.locales_dir), locale)
    }

    /// A config path resolved against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.root.join(path))
    }

    /// Directory the processed files are relative to: the PATH argument
    /// (its parent for a single file), or the project root.
    pub fn base_dir(&self) -> PathBuf {
        match &self.target {
            Some(t) if t.is_file() => t.parent().unwrap_or(&self.root).to_path_buf(),
            Some(t) => t.clone(),
            None => self.root.clone(),
        }
    }

    pub fn display(&self, path: &Path) -> String {
        display_path(path, &self.cwd)
    }
}

/// Drop `.` components so displayed paths read `locales/en.json`, not
/// `./locales/en.json`.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
