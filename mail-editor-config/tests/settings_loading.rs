//! Integration tests for loading mail-editor settings from files.

use mail_editor_config::*;
use std::fs;

const SETTINGS_TOML: &str = r#"
base_host = "http://testserver"
languages = ["en", "nl"]
default_from = "Site <noreply@example.com>"
default_base_template = "mail/base.html"

[static_files]
url = "/static/"
root = "/srv/static"
finders = ["assets"]

[templates.test_template]
name = "Test template"
description = "Test description"
subject_default = "Important message {{ id }}"
body_default = "Test mail sent from testcase with {{ id }}"
subject = [{ name = "id" }]
body = [
    { name = "id", description = "Identifier", example = "420" },
    { variable = "site", required = false },
]
"#;

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mail_editor.toml");
    fs::write(&path, SETTINGS_TOML).unwrap();

    let settings = ConfigManager::new()
        .load_file(&path)
        .unwrap()
        .settings()
        .unwrap();

    assert_eq!(settings.base_host, "http://testserver");
    assert_eq!(settings.languages, vec!["en", "nl"]);
    assert_eq!(settings.static_files.root.to_str(), Some("/srv/static"));
    assert_eq!(settings.static_files.finders.len(), 1);
    assert_eq!(settings.media_files.url, "/media/");

    let spec = settings.templates.get("test_template").unwrap();
    assert_eq!(spec.name, "Test template");
    assert!(spec.subject[0].required);
    assert_eq!(spec.body[0].example, "420");
    assert_eq!(spec.body[1].name, "site");
    assert!(!spec.body[1].required);
}

#[test]
fn test_json_file_overrides_toml() {
    let dir = tempfile::tempdir().unwrap();
    let toml_path = dir.path().join("base.toml");
    let json_path = dir.path().join("local.json");
    fs::write(&toml_path, SETTINGS_TOML).unwrap();
    fs::write(
        &json_path,
        r#"{"base_host": "https://mail.example.com", "static_files": {"root": "/tmp/static"}}"#,
    )
    .unwrap();

    let settings = ConfigManager::new()
        .load_file(&toml_path)
        .unwrap()
        .load_file(&json_path)
        .unwrap()
        .settings()
        .unwrap();

    assert_eq!(settings.base_host, "https://mail.example.com");
    assert_eq!(settings.static_files.url, "/static/");
    assert_eq!(settings.static_files.root.to_str(), Some("/tmp/static"));
    assert!(settings.templates.contains("test_template"));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    fs::write(&path, "base_host: x").unwrap();

    assert!(matches!(
        ConfigManager::new().load_file(&path),
        Err(ConfigError::LoadError(_))
    ));
}
