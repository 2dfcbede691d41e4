//! Template parsing, validation and rendering for mail-editor.
//!
//! Template text is validated when it is saved: both fields must parse and
//! every required variable of the template type must be referenced.
//!
//! ```
//! use std::sync::Arc;
//! use mail_editor_config::{TemplateCatalogue, TemplateSpec, Variable};
//! use mail_editor_template::{MiniJinjaParser, TemplateValidator};
//!
//! let catalogue = TemplateCatalogue::new().with_template(
//!     "order_shipped",
//!     TemplateSpec {
//!         subject: vec![Variable::required("order")],
//!         ..Default::default()
//!     },
//! );
//! let validator = TemplateValidator::new(Arc::new(catalogue), Arc::new(MiniJinjaParser::new()));
//!
//! let errors = validator
//!     .validate_field(mail_editor_config::TemplateField::Subject, "Order {{ order.id }}", &["order"]);
//! assert!(errors.is_ok());
//! ```

pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod escape;
pub mod help;
pub mod jinja;
pub mod parser;
pub mod preview;
pub mod validator;

pub use diagnostic::SyntaxDiagnostic;
pub use engine::{OutputFormat, TemplateEngine};
pub use error::{Result, TemplateError};
pub use escape::escape_html;
pub use help::{html_list_item, variable_help_text};
pub use jinja::{MiniJinjaEngine, MiniJinjaParser};
pub use parser::{ParsedTemplate, TemplateParser, VariableReference};
pub use preview::{preview_context, preview_contexts, preview_value};
pub use validator::{FieldError, FieldErrorKind, TemplateContent, TemplateValidator, ValidationFailure};
