use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

const LOCALE: &str = "locales/zh-CN.json";
const SCRIPT: &str = "export const title = '标题';\nexport const size = 10;\n";

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", SCRIPT)?;

    let output = test.transform_command().output()?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Would rewrite 1 file (1 new text for locales/zh-CN.json):"));
    assert!(out.contains("  - src/a.ts"));
    assert!(out.contains("Run with --apply"));
    assert_eq!(test.read_file("src/a.ts")?, SCRIPT);
    assert!(!test.root().join(LOCALE).exists());

    Ok(())
}

#[test]
fn test_apply_rewrites_source_and_locale() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", SCRIPT)?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Rewrote 1 file, added 1 key to locales/zh-CN.json."));

    let key = test.key_for(LOCALE, "标题")?;
    assert_eq!(
        test.read_file("src/a.ts")?,
        format!(
            "import i18n from '@/i18n'\nexport const title = i18n.t('{}');\nexport const size = 10;\n",
            key
        )
    );

    Ok(())
}

#[test]
fn test_second_apply_is_a_no_op() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", SCRIPT)?;

    test.transform_command().arg("--apply").output()?;
    let once = test.read_file("src/a.ts")?;
    let locale = test.read_file(LOCALE)?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("nothing to extract"));
    assert_eq!(test.read_file("src/a.ts")?, once);
    assert_eq!(test.read_file(LOCALE)?, locale);

    Ok(())
}

#[test]
fn test_existing_locale_entries_are_kept() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file(LOCALE, "{\n  \"greeting\": \"你好\"\n}\n")?;
    test.write_file("src/a.ts", "const a = '你好';\nconst b = '再见';\n")?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(output.status.success());
    let code = test.read_file("src/a.ts")?;
    // Known text reuses its key.
    assert!(code.contains("const a = i18n.t('greeting');"));

    let locale = test.read_json(LOCALE)?;
    assert_eq!(locale.len(), 2);
    assert_eq!(locale["greeting"], "你好");
    let key = test.key_for(LOCALE, "再见")?;
    assert!(code.contains(&format!("const b = i18n.t('{}');", key)));

    Ok(())
}

#[test]
fn test_vue_component() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file(
        "src/Hello.vue",
        "<template>\n  <p title=\"提示\">你好</p>\n</template>\n",
    )?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(output.status.success());
    let hint = test.key_for(LOCALE, "提示")?;
    let hello = test.key_for(LOCALE, "你好")?;
    let code = test.read_file("src/Hello.vue")?;
    assert!(code.contains(&format!(
        "<p :title=\"t('{}')\">{{{{ t('{}') }}}}</p>",
        hint, hello
    )));
    assert!(code.contains(
        "<script setup>\nimport { useI18n } from 'vue-i18n'\nconst { t } = useI18n()\n</script>\n"
    ));

    Ok(())
}

#[test]
fn test_path_argument_limits_scope() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", "const a = '甲';\n")?;
    test.write_file("src/b.ts", "const b = '乙';\n")?;

    let output = test
        .transform_command()
        .args(["src/b.ts", "--apply"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(test.read_file("src/a.ts")?, "const a = '甲';\n");
    assert_ne!(test.read_file("src/b.ts")?, "const b = '乙';\n");
    assert_eq!(test.read_json(LOCALE)?.len(), 1);

    Ok(())
}

#[test]
fn test_ignored_and_unsupported_files() -> Result<()> {
    let test = CliTest::with_config(r#"{ "ignores": ["**/generated/**"] }"#)?;
    test.write_file("src/generated/a.ts", "const a = '生成';\n")?;
    test.write_file("src/styles.css", "a { content: '样式'; }\n")?;
    test.write_file("src/b.ts", "const b = 1;\n")?;

    let output = test.transform_command().output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Checked 1 source file - nothing to extract"));

    Ok(())
}

#[test]
fn test_malformed_file_does_not_stop_others() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/bad.ts", "const = '坏';\n")?;
    test.write_file("src/good.ts", "const a = '好';\n")?;

    let output = test.transform_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(!out.contains("malformed-source"));
    assert!(crate::stderr(&output).contains("1 file(s) could not be parsed"));
    assert_eq!(test.read_file("src/bad.ts")?, "const = '坏';\n");
    assert!(test.read_file("src/good.ts")?.contains("i18n.t("));

    let verbose = test.transform_command().arg("-v").output()?;
    assert!(stdout(&verbose).contains("malformed-source"));
    assert!(stdout(&verbose).contains("src/bad.ts"));

    Ok(())
}

#[test]
fn test_key_conflict_blocks_apply() -> Result<()> {
    let test = CliTest::with_config("{}")?;
    test.write_file("src/a.ts", "const a = '你好';\n")?;
    test.transform_command().arg("--apply").output()?;
    let key = test.key_for(LOCALE, "你好")?;

    // Same key, different text.
    let locale = format!("{{\n  \"{}\": \"别的\"\n}}\n", key);
    test.write_file(LOCALE, &locale)?;
    test.write_file("src/a.ts", "const a = '你好';\n")?;

    let output = test.transform_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("key-conflict"));
    assert!(out.contains("nothing was written"));
    assert_eq!(test.read_file("src/a.ts")?, "const a = '你好';\n");
    assert_eq!(test.read_file(LOCALE)?, locale);

    Ok(())
}

#[test]
fn test_key_conflict_last_writer_wins() -> Result<()> {
    let test = CliTest::with_config(r#"{ "keyConflict": "last-writer-wins" }"#)?;
    test.write_file("src/a.ts", "const a = '你好';\n")?;
    test.transform_command().arg("--apply").output()?;
    let key = test.key_for(LOCALE, "你好")?;

    test.write_file(LOCALE, &format!("{{\n  \"{}\": \"别的\"\n}}\n", key))?;
    test.write_file("src/a.ts", "const a = '你好';\n")?;

    let output = test.transform_command().arg("--apply").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("key-conflict"));
    assert_eq!(test.read_json(LOCALE)?[&key], "你好");

    Ok(())
}
