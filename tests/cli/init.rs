use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "includes",
        "ignores",
        "localesDir",
        "baseLocale",
        "locales",
        "outputDir",
        "keyConflict",
        "i18nCallRules",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{}'", field);
    }
    assert_eq!(parsed["baseLocale"], "zh-CN");
    assert_eq!(
        parsed["i18nCallRules"]["vue"]["transIdentifier"],
        Value::from("t")
    );

    assert!(content.contains("\n  \""), "Config should use 2-space indentation");
    assert!(content.ends_with("}\n"));

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .autoglotrc.json"));
    let content = test.read_file(".autoglotrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_config("{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".autoglotrc.json already exists"));
    assert_eq!(test.read_file(".autoglotrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/App.vue", "<template><p>你好</p></template>\n")?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(
        output.status.success(),
        "transform should work with the initialized config. stderr: {}",
        stderr(&output)
    );
    assert!(test.root().join("locales/zh-CN.json").exists());

    Ok(())
}
