//! MiniJinja-backed parser and engine.
//!
//! MiniJinja's `{{ variable }}` grammar with dotted attribute access is the
//! template language authors write subjects and bodies in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, Value as JinjaValue, path_loader};
use serde_json::Value;
use tracing::debug;

use crate::engine::{OutputFormat, TemplateEngine};
use crate::parser::{ParsedTemplate, TemplateParser, VariableReference};
use crate::{Result, SyntaxDiagnostic, TemplateError};

// Names chosen so the default auto-escape callback picks the right mode.
const TEXT_TEMPLATE_NAME: &str = "subject.txt";
const HTML_TEMPLATE_NAME: &str = "body.html";

/// Build a diagnostic from a MiniJinja error raised for `source`.
pub(crate) fn diagnose(err: &minijinja::Error, source: &str) -> SyntaxDiagnostic {
    let message = err
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| err.kind().to_string());
    SyntaxDiagnostic::new(message, source, err.line(), err.range())
}

/// [`TemplateParser`] using MiniJinja's parser.
///
/// References are collected from the undeclared variables of the compiled
/// template, so names bound by `{% set %}` or loop targets are not reported.
#[derive(Default)]
pub struct MiniJinjaParser {
    env: Environment<'static>,
}

impl MiniJinjaParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateParser for MiniJinjaParser {
    fn parse(&self, source: &str) -> std::result::Result<ParsedTemplate, SyntaxDiagnostic> {
        let template = self
            .env
            .template_from_str(source)
            .map_err(|err| diagnose(&err, source))?;

        Ok(ParsedTemplate::new(
            template
                .undeclared_variables(true)
                .iter()
                .filter_map(|name| VariableReference::parse(name)),
        ))
    }
}

/// [`TemplateEngine`] using MiniJinja.
///
/// Base layouts are loaded from `templates_dir` on demand.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    templates_dir: Option<PathBuf>,
}

impl MiniJinjaEngine {
    /// Engine without a layout directory; every layout lookup fails.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            templates_dir: None,
        }
    }

    /// Engine loading layouts from `dir`.
    pub fn with_templates_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.clone()));
        debug!(dir = %dir.display(), "Template layouts directory configured");

        Self {
            env,
            templates_dir: Some(dir),
        }
    }

    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates_dir.as_deref()
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_str(&self, source: &str, context: &Value, format: OutputFormat) -> Result<String> {
        let name = match format {
            OutputFormat::Text => TEXT_TEMPLATE_NAME,
            OutputFormat::Html => HTML_TEMPLATE_NAME,
        };

        let template = self
            .env
            .template_from_named_str(name, source)
            .map_err(|err| match err.kind() {
                ErrorKind::SyntaxError => TemplateError::Syntax(diagnose(&err, source)),
                _ => TemplateError::from(err),
            })?;

        Ok(template.render(context)?)
    }

    fn render_layout(&self, path: &str, content: &str, context: &Value) -> Result<String> {
        let layout_error = |err: minijinja::Error| TemplateError::Layout {
            path: path.to_string(),
            message: err.to_string(),
        };

        let template = self.env.get_template(path).map_err(layout_error)?;

        let mut ctx: BTreeMap<String, JinjaValue> = BTreeMap::new();
        if let Some(entries) = context.as_object() {
            for (key, value) in entries {
                ctx.insert(key.clone(), JinjaValue::from_serialize(value));
            }
        }
        ctx.insert(
            "content".to_string(),
            JinjaValue::from_safe_string(content.to_string()),
        );

        template.render(ctx).map_err(layout_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_collects_references() {
        let parsed = MiniJinjaParser::new()
            .parse("Hi {{ user.name }}, order {{ order.id }} {% for item in items %}{{ item }}{% endfor %}")
            .unwrap();

        let roots: Vec<_> = parsed.root_names().into_iter().collect();
        assert_eq!(roots, vec!["items", "order", "user"]);
        assert!(parsed.satisfies("user"));
        assert!(parsed.satisfies("order.id"));
        assert!(!parsed.satisfies("item"));
    }

    #[test]
    fn test_parse_syntax_error() {
        let diag = MiniJinjaParser::new().parse("Hi {{ foo bar }}").unwrap_err();

        assert!(diag.message.starts_with("TemplateSyntaxError: "));
        assert_eq!(diag.line, Some(1));
        assert!(diag.excerpt.unwrap().starts_with("1. "));
    }

    #[test]
    fn test_render_text_is_not_escaped() {
        let engine = MiniJinjaEngine::new();
        let out = engine
            .render_str("Re: {{ title }}", &json!({"title": "<b>&</b>"}), OutputFormat::Text)
            .unwrap();
        assert_eq!(out, "Re: <b>&</b>");
    }

    #[test]
    fn test_render_html_is_escaped() {
        let engine = MiniJinjaEngine::new();
        let out = engine
            .render_str("<p>{{ title }}</p>", &json!({"title": "<b>"}), OutputFormat::Html)
            .unwrap();
        assert_eq!(out, "<p>&lt;b&gt;</p>");
    }

    #[test]
    fn test_render_attribute_access() {
        let engine = MiniJinjaEngine::new();
        let out = engine
            .render_str(
                "Total: {{ order.total }}",
                &json!({"order": {"total": "10.00"}}),
                OutputFormat::Text,
            )
            .unwrap();
        assert_eq!(out, "Total: 10.00");
    }

    #[test]
    fn test_render_syntax_error() {
        let err = MiniJinjaEngine::new()
            .render_str("{{ id", &json!({}), OutputFormat::Text)
            .unwrap_err();
        assert!(matches!(err, TemplateError::Syntax(_)));
    }

    #[test]
    fn test_render_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("mails")).unwrap();
        std::fs::write(
            dir.path().join("mails/base.html"),
            "<html><body><h1>{{ site }}</h1>{{ content }}</body></html>",
        )
        .unwrap();

        let engine = MiniJinjaEngine::with_templates_dir(dir.path());
        let out = engine
            .render_layout("mails/base.html", "<p>Hello</p>", &json!({"site": "Shop"}))
            .unwrap();

        assert_eq!(out, "<html><body><h1>Shop</h1><p>Hello</p></body></html>");
    }

    #[test]
    fn test_missing_layout() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MiniJinjaEngine::with_templates_dir(dir.path());

        let err = engine
            .render_layout("missing.html", "<p>x</p>", &json!({}))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Layout { ref path, .. } if path == "missing.html"));
    }
}
