// Mail Editor - editable e-mail templates for Rust applications
//
// Templates are validated against a per-type variable catalogue when saved,
// rendered into a base layout, post-processed into self-contained mail HTML
// and delivered through a pluggable transport.

// Re-export core functionality
pub use mail_editor_config::{
    AssetLocation, ConfigError, ConfigManager, MailEditorSettings, TemplateCatalogue,
    TemplateField, TemplateSpec, Variable,
};
pub use mail_editor_process::{
    CidAttachment, HtmlProcessor, ProcessError, ProcessOptions, ProcessedDocument, absolutize,
};
pub use mail_editor_template::{
    MiniJinjaEngine, MiniJinjaParser, SyntaxDiagnostic, TemplateEngine, TemplateError,
    TemplateParser, TemplateValidator, ValidationFailure, preview_contexts, variable_help_text,
};

// Re-export member crates
pub use mail_editor_config;
pub use mail_editor_process;
pub use mail_editor_template;

#[cfg(feature = "mail")]
pub use mail_editor_mail;

#[cfg(feature = "mail")]
pub use mail_editor_mail::{
    Address, Attachment, Email, InMemoryTemplateStore, MailEditor, MailError, MailTemplate,
    MemoryTransport, SendOptions, TemplateStore, Transport,
};

#[cfg(feature = "smtp")]
pub use mail_editor_mail::{SmtpConfig, SmtpSecurity, SmtpTransport};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AssetLocation, HtmlProcessor, MailEditorSettings, ProcessOptions, TemplateCatalogue,
        TemplateSpec, Variable,
    };

    #[cfg(feature = "mail")]
    pub use crate::{MailEditor, MailTemplate, SendOptions, TemplateStore, Transport};
}
