//! Template error types.

use thiserror::Error;

use crate::SyntaxDiagnostic;

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template text failed to parse.
    #[error("{0}")]
    Syntax(SyntaxDiagnostic),

    /// Rendering failed (undefined filter, bad value, ...).
    #[error("Template render error: {0}")]
    Render(String),

    /// A base layout could not be loaded or rendered.
    #[error("Base template {path} failed: {message}")]
    Layout {
        /// Layout path relative to the templates directory.
        path: String,
        /// Underlying failure.
        message: String,
    },
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        Self::Render(err.to_string())
    }
}
