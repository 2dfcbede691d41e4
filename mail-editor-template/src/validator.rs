//! Save-time validation of template variables and syntax.

use std::fmt;
use std::sync::Arc;

use mail_editor_config::{TemplateCatalogue, TemplateField};
use serde::Serialize;
use tracing::debug;

use crate::parser::TemplateParser;
use crate::SyntaxDiagnostic;

/// Text of a template as seen by the validator.
pub trait TemplateContent {
    /// Template type key into the catalogue.
    fn template_type(&self) -> &str;

    fn subject(&self) -> &str;

    fn body(&self) -> &str;

    /// Text of `field`.
    fn field(&self, field: TemplateField) -> &str {
        match field {
            TemplateField::Subject => self.subject(),
            TemplateField::Body => self.body(),
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// The text does not parse.
    SyntaxError,
    /// Required variables are not referenced.
    Invalid,
}

impl FieldErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::SyntaxError => "syntax_error",
            FieldErrorKind::Invalid => "invalid",
        }
    }
}

/// Validation error for a single template field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: TemplateField,
    pub kind: FieldErrorKind,
    pub message: String,
    /// Source diagnostic for syntax errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<SyntaxDiagnostic>,
    /// Missing required variable names, sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl FieldError {
    pub fn syntax(field: TemplateField, diagnostic: SyntaxDiagnostic) -> Self {
        Self {
            field,
            kind: FieldErrorKind::SyntaxError,
            message: diagnostic.to_string(),
            diagnostic: Some(diagnostic),
            missing: Vec::new(),
        }
    }

    /// Error listing `missing` names in placeholder form.
    pub fn missing_variables(field: TemplateField, mut missing: Vec<String>) -> Self {
        missing.sort();
        let placeholders: Vec<String> = missing.iter().map(|name| format!("{{{{ {} }}}}", name)).collect();
        Self {
            field,
            kind: FieldErrorKind::Invalid,
            message: format!(
                "These variables are required, but missing: {}",
                placeholders.join(", ")
            ),
            diagnostic: None,
            missing,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// All field errors of one rejected template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub template_type: String,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Errors for one field.
    pub fn field_errors(&self, field: TemplateField) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "template_type": self.template_type,
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field.as_str(),
                    "code": e.kind.code(),
                    "message": e.message,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template '{}' is invalid:", self.template_type)?;
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Checks template text against the catalogue.
///
/// Each field is parsed and checked independently; a field with a syntax
/// error is not checked for variables. Undeclared variables are allowed.
#[derive(Clone)]
pub struct TemplateValidator {
    catalogue: Arc<TemplateCatalogue>,
    parser: Arc<dyn TemplateParser>,
}

impl TemplateValidator {
    pub fn new(catalogue: Arc<TemplateCatalogue>, parser: Arc<dyn TemplateParser>) -> Self {
        Self { catalogue, parser }
    }

    pub fn catalogue(&self) -> &TemplateCatalogue {
        &self.catalogue
    }

    /// Validate both fields of `template`.
    ///
    /// Types missing from the catalogue are accepted as-is.
    pub fn validate(&self, template: &dyn TemplateContent) -> Result<(), ValidationFailure> {
        let template_type = template.template_type();
        let Some(spec) = self.catalogue.get(template_type) else {
            debug!(template_type, "No variable spec, skipping validation");
            return Ok(());
        };

        let errors: Vec<FieldError> = TemplateField::ALL
            .into_iter()
            .filter_map(|field| {
                let required: Vec<&str> = spec.required_names(field).collect();
                self.validate_field(field, template.field(field), &required)
                    .err()
            })
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        for error in &errors {
            debug!(
                template_type,
                field = %error.field,
                code = error.kind.code(),
                "Template field rejected"
            );
        }

        Err(ValidationFailure {
            template_type: template_type.to_string(),
            errors,
        })
    }

    /// Validate one field's text against its required variable names.
    pub fn validate_field(
        &self,
        field: TemplateField,
        text: &str,
        required: &[&str],
    ) -> Result<(), FieldError> {
        let parsed = self
            .parser
            .parse(text)
            .map_err(|diagnostic| FieldError::syntax(field, diagnostic))?;

        let missing: Vec<String> = required
            .iter()
            .filter(|name| !parsed.satisfies(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FieldError::missing_variables(field, missing))
        }
    }
}

impl fmt::Debug for TemplateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateValidator")
            .field("catalogue", &self.catalogue)
            .finish_non_exhaustive()
    }
}
