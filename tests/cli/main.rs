use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use serde_json::{Map, Value};
use tempfile::TempDir;

mod init;
mod revert;
mod transform;

const BIN_NAME: &str = "autoglot";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// Project with a `.autoglotrc.json` holding `config`.
    pub fn with_config(config: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(".autoglotrc.json", config)?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for stable output
        cmd
    }

    pub fn transform_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("transform");
        cmd
    }

    pub fn revert_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("revert");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn read_json(&self, path: &str) -> Result<Map<String, Value>> {
        let content = self.read_file(path)?;
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path))
    }

    /// Key under which `text` was stored in a flat locale file.
    pub fn key_for(&self, locale_file: &str, text: &str) -> Result<String> {
        let entries = self.read_json(locale_file)?;
        entries
            .iter()
            .find(|(_, v)| v.as_str() == Some(text))
            .map(|(k, _)| k.clone())
            .with_context(|| format!("No key for {:?} in {}", text, locale_file))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.command().arg("--help").output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("transform"));
    assert!(out.contains("revert"));
    assert!(out.contains("init"));

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));

    Ok(())
}

#[test]
fn test_invalid_config_is_internal_error() -> Result<()> {
    let test = CliTest::with_config(r#"{ "ignores": ["src/["] }"#)?;
    test.write_file("src/a.ts", "const a = '你好';\n")?;

    let output = test.transform_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error:"));

    Ok(())
}

#[test]
fn test_missing_path_is_internal_error() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.transform_command().arg("nowhere").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Path does not exist"));

    Ok(())
}
