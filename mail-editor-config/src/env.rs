// Environment variable overrides

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::env;

/// Default prefix for settings read from the environment.
pub const ENV_PREFIX: &str = "MAIL_EDITOR";

/// Environment variable loader
///
/// Collects `<PREFIX>_*` variables and maps the recognised ones onto the
/// settings tree, e.g. `MAIL_EDITOR_STATIC_ROOT` -> `static_files.root`.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Collect prefixed variables from the process environment, keyed by
    /// the lower-cased remainder of the name.
    pub fn load(&self) -> HashMap<String, String> {
        Self::collect(&self.prefix, env::vars())
    }

    fn collect(
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> HashMap<String, String> {
        let mut config = HashMap::new();

        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(prefix)
                && let Some(rest) = rest.strip_prefix('_')
                && !rest.is_empty()
            {
                config.insert(rest.to_lowercase(), value);
            }
        }

        config
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = format!("{}_{}", self.prefix, key.to_uppercase());
        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Build the settings overlay from the process environment.
    pub fn overlay(&self) -> Result<Value> {
        overlay_from(&self.prefix, self.load())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

/// Translate collected variables into a settings overlay. Unknown keys are
/// ignored so unrelated `MAIL_EDITOR_*` variables never break loading.
pub(crate) fn overlay_from(prefix: &str, vars: HashMap<String, String>) -> Result<Value> {
    let mut overlay = Map::new();

    for (key, value) in vars {
        match key.as_str() {
            "base_host" | "default_from" | "templates_dir" | "default_base_template" => {
                overlay.insert(key.clone(), Value::String(value));
            }
            "debug" => {
                let flag = parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnvValue {
                    key: format!("{}_DEBUG", prefix),
                    value: value.clone(),
                })?;
                overlay.insert(key.clone(), Value::Bool(flag));
            }
            "static_root" => {
                insert_nested(&mut overlay, "static_files", "root", value);
            }
            "static_url" => {
                insert_nested(&mut overlay, "static_files", "url", value);
            }
            "media_root" => {
                insert_nested(&mut overlay, "media_files", "root", value);
            }
            "media_url" => {
                insert_nested(&mut overlay, "media_files", "url", value);
            }
            "languages" => {
                let languages: Vec<Value> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(|code| Value::String(code.to_string()))
                    .collect();
                overlay.insert(key.clone(), Value::Array(languages));
            }
            _ => {}
        }
    }

    Ok(Value::Object(overlay))
}

fn insert_nested(overlay: &mut Map<String, Value>, section: &str, field: &str, value: String) {
    let entry = overlay
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(table) = entry {
        table.insert(field.to_string(), Value::String(value));
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
