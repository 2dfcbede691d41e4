//! # Mail Editor Mail
//!
//! Editable mail templates: storage, rendering, previews and delivery.
//!
//! ## Features
//!
//! - **Template records**: per type, language and domain, validated on save
//! - **Rendering**: subject and body with an optional base layout
//! - **Inline images**: local images are sent as `cid:` attachments
//! - **SMTP Transport**: delivery through lettre with TLS support
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mail_editor_config::ConfigManager;
//! use mail_editor_mail::{InMemoryTemplateStore, MailEditor, SendOptions, SmtpConfig, SmtpTransport};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ConfigManager::new().load_file("mail_editor.toml")?.load_env()?.settings()?;
//!     let store = InMemoryTemplateStore::new(settings.catalogue());
//!     let transport = SmtpTransport::new(SmtpConfig::new("smtp.example.com").starttls())?;
//!
//!     let editor = MailEditor::new(settings, store, transport);
//!     editor.add_missing_templates().await?;
//!
//!     let template = editor.store().get_for_language("welcome", Some("en"), None).await?;
//!     editor
//!         .send_email(
//!             &template,
//!             vec!["jane@example.com".try_into()?],
//!             &json!({"name": "Jane"}),
//!             None,
//!             SendOptions::new().txt(true),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod address;
mod attachment;
mod email;
mod error;
mod record;
mod service;
mod store;
mod text;
mod transport;

pub use address::{Address, IntoAddress};
pub use attachment::{Attachment, ContentDisposition};
pub use email::Email;
pub use error::{MailError, Result};
pub use record::{FALLBACK_BODY, FALLBACK_SUBJECT, MailTemplate, RenderedTemplate};
pub use service::{MailEditor, SendOptions};
pub use store::{InMemoryTemplateStore, TemplateStore};
pub use text::strip_tags;
pub use transport::{MemoryTransport, Transport};

#[cfg(feature = "smtp")]
pub use transport::{SmtpConfig, SmtpSecurity, SmtpTransport};
