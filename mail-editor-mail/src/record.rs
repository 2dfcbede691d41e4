//! Stored mail templates.

use mail_editor_config::TemplateSpec;
use mail_editor_template::{OutputFormat, TemplateContent, TemplateEngine, TemplateError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;

/// Subject given to new records whose type has no default.
pub const FALLBACK_SUBJECT: &str = "Please fix this template";

/// Body given to new records whose type has no default.
pub const FALLBACK_BODY: &str = "Your content here...";

/// An editable mail template for one type, language and domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailTemplate {
    /// Store-assigned id, `None` until saved.
    #[serde(default)]
    pub id: Option<u64>,
    /// Key into the template catalogue.
    pub template_type: String,
    /// Language code, `None` when the record serves every language.
    #[serde(default)]
    pub language: Option<String>,
    /// Site domain, `None` when the record serves every domain.
    #[serde(default)]
    pub domain: Option<String>,
    pub subject: String,
    pub body: String,
    /// Base layout overriding the one configured for the type.
    #[serde(default)]
    pub base_template_path: Option<String>,
    /// Free-form notes for editors.
    #[serde(default)]
    pub remarks: String,
}

/// Rendered subject and body of a [`MailTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub subject: String,
    /// HTML body, wrapped in its layout when one applies.
    pub body: String,
}

impl MailTemplate {
    pub fn new(template_type: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            template_type: template_type.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// New record seeded from the defaults of `spec`.
    pub fn with_defaults(template_type: impl Into<String>, spec: Option<&TemplateSpec>) -> Self {
        let subject = spec
            .and_then(|s| s.subject_default.clone())
            .unwrap_or_else(|| FALLBACK_SUBJECT.to_string());
        let body = spec
            .and_then(|s| s.body_default.clone())
            .unwrap_or_else(|| FALLBACK_BODY.to_string());

        Self::new(template_type, subject, body)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_base_template(mut self, path: impl Into<String>) -> Self {
        self.base_template_path = Some(path.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    /// Render subject and body.
    ///
    /// The subject is rendered without escaping against `subject_context`,
    /// falling back to `body_context`. The body is HTML-escaped and, when
    /// `layout` is given, embedded in it as `content`. A layout that fails to
    /// load or render is logged and the bare body is returned.
    pub fn render(
        &self,
        engine: &dyn TemplateEngine,
        layout: Option<&str>,
        body_context: &Value,
        subject_context: Option<&Value>,
    ) -> Result<RenderedTemplate> {
        let subject_context = subject_context.unwrap_or(body_context);

        let subject = engine.render_str(&self.subject, subject_context, OutputFormat::Text)?;
        let body = engine.render_str(&self.body, body_context, OutputFormat::Html)?;

        let body = match layout.filter(|path| !path.is_empty()) {
            Some(path) => match engine.render_layout(path, &body, body_context) {
                Ok(wrapped) => wrapped,
                Err(err @ TemplateError::Layout { .. }) => {
                    warn!(
                        template_type = %self.template_type,
                        layout = %path,
                        error = %err,
                        "Base template unavailable, using bare body"
                    );
                    body
                }
                Err(err) => return Err(err.into()),
            },
            None => body,
        };

        debug!(template_type = %self.template_type, "Template rendered");

        Ok(RenderedTemplate {
            subject: subject.trim().to_string(),
            body,
        })
    }
}

impl TemplateContent for MailTemplate {
    fn template_type(&self) -> &str {
        &self.template_type
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_editor_template::MiniJinjaEngine;
    use serde_json::json;

    #[test]
    fn test_with_defaults() {
        let record = MailTemplate::with_defaults("welcome", None);
        assert_eq!(record.subject, FALLBACK_SUBJECT);
        assert_eq!(record.body, FALLBACK_BODY);

        let spec = TemplateSpec {
            subject_default: Some("Welcome {{ name }}".to_string()),
            ..TemplateSpec::default()
        };
        let record = MailTemplate::with_defaults("welcome", Some(&spec));
        assert_eq!(record.subject, "Welcome {{ name }}");
        assert_eq!(record.body, FALLBACK_BODY);
    }

    #[test]
    fn test_render_subject_falls_back_to_body_context() {
        let record = MailTemplate::new("welcome", "Hi {{ name }}", "<p>{{ name }}</p>");
        let rendered = record
            .render(&MiniJinjaEngine::new(), None, &json!({"name": "<Jane>"}), None)
            .unwrap();

        assert_eq!(rendered.subject, "Hi <Jane>");
        assert_eq!(rendered.body, "<p>&lt;Jane&gt;</p>");
    }

    #[test]
    fn test_render_separate_subject_context() {
        let record = MailTemplate::new("welcome", "{{ title }}", "{{ name }}");
        let rendered = record
            .render(
                &MiniJinjaEngine::new(),
                None,
                &json!({"name": "Jane"}),
                Some(&json!({"title": "Hello"})),
            )
            .unwrap();

        assert_eq!(rendered.subject, "Hello");
        assert_eq!(rendered.body, "Jane");
    }

    #[test]
    fn test_render_missing_layout_uses_bare_body() {
        let record = MailTemplate::new("welcome", "Hi", "<p>Body</p>");
        let rendered = record
            .render(&MiniJinjaEngine::new(), Some("mail/base.html"), &json!({}), None)
            .unwrap();

        assert_eq!(rendered.body, "<p>Body</p>");
    }

    #[test]
    fn test_render_with_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.html"),
            "<html><body><h1>{{ site }}</h1>{{ content }}</body></html>",
        )
        .unwrap();

        let record = MailTemplate::new("welcome", "Hi", "<p>{{ site }}</p>");
        let rendered = record
            .render(
                &MiniJinjaEngine::with_templates_dir(dir.path()),
                Some("base.html"),
                &json!({"site": "Shop"}),
                None,
            )
            .unwrap();

        assert_eq!(
            rendered.body,
            "<html><body><h1>Shop</h1><p>Shop</p></body></html>"
        );
    }

    #[test]
    fn test_render_syntax_error() {
        let record = MailTemplate::new("welcome", "Hi {{", "Body");
        let err = record
            .render(&MiniJinjaEngine::new(), None, &json!({}), None)
            .unwrap_err();

        assert!(matches!(
            err,
            crate::MailError::Template(TemplateError::Syntax(_))
        ));
    }
}
