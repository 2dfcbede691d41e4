// Settings and template catalogue loading for mail-editor

pub mod catalogue;
pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use catalogue::{TemplateCatalogue, TemplateField, TemplateSpec, Variable};
pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat, merge_values};
pub use settings::{AssetLocation, MailEditorSettings};
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Layered settings builder.
///
/// Layers are merged in the order they are added; later layers win.
/// [`ConfigManager::load_validated`] deserializes the merged tree once.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Value,
    env_prefix: String,
}

impl ConfigManager {
    /// Empty manager reading `MAIL_EDITOR_` variables.
    pub fn new() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Value::Object(Map::new()),
            env_prefix: prefix.into(),
        }
    }

    /// Merge a file; the format is detected from the extension.
    pub fn load_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = ConfigLoader::auto(path)?.load_file(path)?;
        debug!(path = %path.display(), "Loaded settings file");
        merge_values(&mut self.config, data);
        Ok(self)
    }

    /// Merge a string in the given format.
    pub fn load_str(mut self, content: &str, format: FileFormat) -> Result<Self> {
        let data = ConfigLoader::new(format).parse(content)?;
        merge_values(&mut self.config, data);
        Ok(self)
    }

    /// Merge prefixed environment variables.
    pub fn load_env(mut self) -> Result<Self> {
        let overlay = EnvLoader::new(self.env_prefix.clone()).overlay()?;
        merge_values(&mut self.config, overlay);
        Ok(self)
    }

    /// Read a `.env` file into the process environment, then merge prefixed
    /// environment variables.
    pub fn load_dotenv(self, path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok(); // optional
        }
        self.load_env()
    }

    /// Set a single top-level value.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        let mut overlay = Map::new();
        overlay.insert(key.to_string(), value);
        merge_values(&mut self.config, Value::Object(overlay));
        Ok(self)
    }

    /// The merged, untyped settings tree.
    pub fn raw(&self) -> &Value {
        &self.config
    }

    /// Deserialize and validate the merged settings.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }

    /// Shorthand for `load_validated::<MailEditorSettings>()`.
    pub fn settings(&self) -> Result<MailEditorSettings> {
        self.load_validated()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
