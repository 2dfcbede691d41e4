// Typed mail-editor settings

use crate::TemplateCatalogue;
use crate::validation::{ConfigValidator, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a family of assets is served from and where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLocation {
    /// URL prefix, either root-relative (`/static/`) or absolute.
    pub url: String,
    /// Directory the prefix maps to.
    #[serde(default)]
    pub root: PathBuf,
    /// Extra directories searched when a file is not in `root` yet
    /// (uncollected development assets).
    #[serde(default)]
    pub finders: Vec<PathBuf>,
}

impl AssetLocation {
    pub fn new(url: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            root: root.into(),
            finders: Vec::new(),
        }
    }

    /// Add a fallback lookup directory.
    pub fn with_finder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.finders.push(dir.into());
        self
    }
}

fn default_static() -> AssetLocation {
    AssetLocation::new("/static/", "static")
}

fn default_media() -> AssetLocation {
    AssetLocation::new("/media/", "media")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

/// Process-wide settings, loaded once and passed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailEditorSettings {
    /// Scheme and host relative links are made absolute against.
    pub base_host: String,
    #[serde(default = "default_static")]
    pub static_files: AssetLocation,
    #[serde(default = "default_media")]
    pub media_files: AssetLocation,
    /// Directory base layouts are loaded from.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Layout used when neither the record nor its type names one.
    #[serde(default)]
    pub default_base_template: Option<String>,
    /// Language codes templates are kept for.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Sender address for outgoing mail.
    #[serde(default)]
    pub default_from: Option<String>,
    /// Surface CSS inlining failures instead of swallowing them.
    #[serde(default)]
    pub debug: bool,
    /// Template type catalogue.
    #[serde(default)]
    pub templates: Arc<TemplateCatalogue>,
}

impl MailEditorSettings {
    pub fn new(base_host: impl Into<String>) -> Self {
        Self {
            base_host: base_host.into(),
            static_files: default_static(),
            media_files: default_media(),
            templates_dir: default_templates_dir(),
            default_base_template: None,
            languages: Vec::new(),
            default_from: None,
            debug: false,
            templates: Arc::new(TemplateCatalogue::default()),
        }
    }

    pub fn with_static_files(mut self, location: AssetLocation) -> Self {
        self.static_files = location;
        self
    }

    pub fn with_media_files(mut self, location: AssetLocation) -> Self {
        self.media_files = location;
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    pub fn with_default_base_template(mut self, path: impl Into<String>) -> Self {
        self.default_base_template = Some(path.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_from(mut self, from: impl Into<String>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_catalogue(mut self, catalogue: TemplateCatalogue) -> Self {
        self.templates = Arc::new(catalogue);
        self
    }

    /// Shared handle to the catalogue.
    pub fn catalogue(&self) -> Arc<TemplateCatalogue> {
        Arc::clone(&self.templates)
    }

    /// `base_host` without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_host.trim_end_matches('/')
    }
}

impl Validate for MailEditorSettings {
    fn validate(&self) -> crate::Result<()> {
        ConfigValidator::not_empty(&self.base_host, "base_host")?;
        ConfigValidator::is_url(&self.base_host, "base_host")?;
        ConfigValidator::is_url_prefix(&self.static_files.url, "static_files.url")?;
        ConfigValidator::is_url_prefix(&self.media_files.url, "media_files.url")?;

        if let Some(from) = &self.default_from {
            ConfigValidator::is_email(from, "default_from")?;
        }

        for (template_type, spec) in self.templates.iter() {
            ConfigValidator::not_empty(template_type, "templates.<type>")?;
            for variable in spec.subject.iter().chain(spec.body.iter()) {
                ConfigValidator::not_empty(
                    variable.name.trim(),
                    &format!("templates.{}.variable.name", template_type),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TemplateSpec, Variable};

    #[test]
    fn test_defaults_from_json() {
        let settings: MailEditorSettings =
            serde_json::from_str(r#"{"base_host": "http://testserver/"}"#).unwrap();

        assert_eq!(settings.static_files.url, "/static/");
        assert_eq!(settings.media_files.url, "/media/");
        assert_eq!(settings.base_url(), "http://testserver");
        assert!(settings.templates.is_empty());
        assert!(!settings.debug);
    }

    #[test]
    fn test_validate() {
        assert!(MailEditorSettings::new("https://example.com").validate().is_ok());
        assert!(MailEditorSettings::new("example.com").validate().is_err());
        assert!(MailEditorSettings::new("").validate().is_err());

        let settings = MailEditorSettings::new("https://example.com")
            .with_static_files(AssetLocation::new("static/", "static"));
        assert!(settings.validate().is_err());

        let settings = MailEditorSettings::new("https://example.com").with_catalogue(
            crate::TemplateCatalogue::new().with_template(
                "broken",
                TemplateSpec {
                    body: vec![Variable::required(" ")],
                    ..Default::default()
                },
            ),
        );
        assert!(settings.validate().is_err());
    }
}
