use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const SCRIPT: &str = "export const title = '标题';\nexport const size = 10;\n";
const COMPONENT: &str = "<template>\n  <div title=\"标题\">这{{title}}</div>\n</template>\n<script setup>\nlet title = \"标题\"\n</script>\n";

#[test]
fn test_round_trip_restores_sources() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", SCRIPT)?;
    test.write_file("src/views/Home.vue", COMPONENT)?;

    let forward = test.transform_command().arg("--apply").output()?;
    assert!(forward.status.success());
    assert_ne!(test.read_file("src/a.ts")?, SCRIPT);

    let output = test.revert_command().arg("src").output()?;

    assert!(output.status.success());
    assert!(
        stdout(&output).contains("Wrote 2 files to .autoglot/revert-src (2 reverted, locale zh-CN)")
    );
    assert_eq!(test.read_file(".autoglot/revert-src/a.ts")?, SCRIPT);
    assert_eq!(
        test.read_file(".autoglot/revert-src/views/Home.vue")?,
        COMPONENT
    );

    Ok(())
}

#[test]
fn test_revert_to_other_locale() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("locales/en.json", "{\n  \"home\": {\n    \"title\": \"Title\"\n  }\n}\n")?;
    test.write_file(
        "src/a.ts",
        "import i18n from '@/i18n'\nexport const title = i18n.t('home.title');\n",
    )?;

    let output = test
        .revert_command()
        .args(["src", "--locale", "en"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        test.read_file(".autoglot/revert-src/a.ts")?,
        "export const title = 'Title';\n"
    );
    // Sources are never modified by revert.
    assert!(test.read_file("src/a.ts")?.contains("i18n.t('home.title')"));

    Ok(())
}

#[test]
fn test_unknown_locale_falls_back_to_base() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("locales/zh-CN.json", "{ \"k1\": \"你好\" }")?;
    test.write_file("src/a.ts", "const a = i18n.t('k1');\n")?;

    let output = test
        .revert_command()
        .args(["src", "-l", "fr"])
        .output()?;

    assert!(output.status.success());
    assert!(stderr(&output).contains("locale \"fr\" is not configured, using \"zh-CN\""));
    assert_eq!(
        test.read_file(".autoglot/revert-src/a.ts")?,
        "const a = '你好';\n"
    );

    Ok(())
}

#[test]
fn test_missing_key_is_reported() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("locales/zh-CN.json", "{ \"k1\": \"你好\" }")?;
    test.write_file(
        "src/a.ts",
        "import i18n from '@/i18n'\nconst a = i18n.t('k1');\nconst b = i18n.t('k9');\n",
    )?;

    let output = test.revert_command().arg("src").output()?;

    // Warnings only.
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("missing-locale-key"));
    assert!(out.contains("ambiguous-cleanup"));
    assert!(out.contains("src/a.ts:3:11"));
    assert_eq!(
        test.read_file(".autoglot/revert-src/a.ts")?,
        "import i18n from '@/i18n'\nconst a = '你好';\nconst b = i18n.t('k9');\n"
    );

    Ok(())
}

#[test]
fn test_out_dir_override() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("locales/zh-CN.json", "{}")?;
    test.write_file("src/a.ts", "const a = 1;\n")?;

    let output = test
        .revert_command()
        .args(["src", "--out-dir", "build"])
        .output()?;

    assert!(output.status.success());
    // Unchanged files are copied too.
    assert_eq!(test.read_file("build/revert-src/a.ts")?, "const a = 1;\n");

    Ok(())
}

#[test]
fn test_output_dir_is_not_rescanned() -> Result<()> {
    let test = CliTest::with_config(r#"{ "includes": [] }"#)?;
    test.write_file("locales/zh-CN.json", "{ \"k1\": \"你好\" }")?;
    test.write_file("src/a.ts", "const a = i18n.t('k1');\n")?;

    test.revert_command().output()?;
    let output = test.revert_command().output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Wrote 1 file to"));

    Ok(())
}

#[test]
fn test_missing_locale_file_is_internal_error() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", "const a = i18n.t('k1');\n")?;

    let output = test.revert_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read locale file"));
    assert!(!test.root().join(".autoglot").exists());

    Ok(())
}
