// Settings file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Formats settings files may be written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Settings file loader
///
/// Every format is normalised into a JSON value so layers from different
/// sources can be merged before deserializing into typed settings.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the format from the file extension.
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("{} has no extension to pick a format from", path.display()))
            })?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("unsupported settings format .{}", ext)))?;

        Ok(Self::new(format))
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse into a JSON tree; the root must be a table.
    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("json: {}", e)))?,
            FileFormat::Toml => {
                let table: toml::Table = toml::from_str(content)
                    .map_err(|e| ConfigError::ParseError(format!("toml: {}", e)))?;
                serde_json::to_value(table).map_err(|e| {
                    ConfigError::ParseError(format!("toml value not representable as json: {}", e))
                })?
            }
        };

        if !value.is_object() {
            return Err(ConfigError::ParseError(
                "top level must be a table".to_string(),
            ));
        }

        Ok(value)
    }
}

/// Deep-merge `overlay` into `base`; tables merge key by key, everything
/// else is replaced.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let json = r#"{"base_host": "https://example.com", "debug": true}"#;

        let result = loader.parse(json).unwrap();
        assert_eq!(result["base_host"], "https://example.com");
    }

    #[test]
    fn test_parse_toml_catalogue() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            base_host = "https://example.com"

            [templates.password_reset]
            name = "Password reset"
            subject = [{ name = "site" }]
            body = [{ name = "reset_link", example = "https://example.com/r/1" }]
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(
            result["templates"]["password_reset"]["body"][0]["name"],
            "reset_link"
        );
    }

    #[test]
    fn test_rejects_non_object_root() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(loader.parse("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(ConfigLoader::auto("settings").is_err());
        assert!(ConfigLoader::auto("settings.toml").is_ok());
    }

    #[test]
    fn test_merge_values() {
        let mut base = json!({
            "base_host": "http://localhost",
            "static_files": {"url": "/static/", "root": "static"}
        });
        merge_values(
            &mut base,
            json!({"static_files": {"root": "/srv/static"}, "debug": true}),
        );

        assert_eq!(base["static_files"]["url"], "/static/");
        assert_eq!(base["static_files"]["root"], "/srv/static");
        assert_eq!(base["debug"], true);
    }
}
