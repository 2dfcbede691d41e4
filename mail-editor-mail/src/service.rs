//! Template management, preview and sending.

use std::sync::Arc;
use std::time::Duration;

use mail_editor_config::MailEditorSettings;
use mail_editor_process::{HtmlProcessor, ProcessOptions};
use mail_editor_template::{
    MiniJinjaEngine, MiniJinjaParser, TemplateEngine, TemplateValidator, preview_contexts,
    variable_help_text,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::text::strip_tags;
use crate::transport::Transport;
use crate::{
    Address, Attachment, Email, IntoAddress, MailError, MailTemplate, RenderedTemplate, Result,
    TemplateStore,
};

/// Extra options for [`MailEditor::send_email`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Add a plain-text part derived from the HTML body.
    pub txt: bool,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    /// File attachments, in addition to the inline images.
    pub attachments: Vec<Attachment>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn txt(mut self, txt: bool) -> Self {
        self.txt = txt;
        self
    }

    pub fn cc(mut self, cc: impl IntoAddress) -> Result<Self> {
        self.cc.push(cc.into_address()?);
        Ok(self)
    }

    pub fn bcc(mut self, bcc: impl IntoAddress) -> Result<Self> {
        self.bcc.push(bcc.into_address()?);
        Ok(self)
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Entry point tying settings, storage, rendering, processing and delivery
/// together.
pub struct MailEditor {
    settings: Arc<MailEditorSettings>,
    store: Arc<dyn TemplateStore>,
    engine: Arc<dyn TemplateEngine>,
    validator: TemplateValidator,
    processor: HtmlProcessor,
    transport: Arc<dyn Transport>,
    retry_count: u32,
    retry_delay: Duration,
}

impl MailEditor {
    /// Create a mail editor.
    ///
    /// Layouts are loaded from `settings.templates_dir` and assets resolved
    /// through the configured static and media locations.
    pub fn new(
        settings: MailEditorSettings,
        store: impl TemplateStore + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        let validator = TemplateValidator::new(settings.catalogue(), Arc::new(MiniJinjaParser::new()));
        let engine = MiniJinjaEngine::with_templates_dir(&settings.templates_dir);
        let processor = HtmlProcessor::from_settings(&settings);

        Self {
            settings: Arc::new(settings),
            store: Arc::new(store),
            engine: Arc::new(engine),
            validator,
            processor,
            transport: Arc::new(transport),
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Retry transient delivery failures `count` times, `delay` apart.
    pub fn with_retries(mut self, count: u32, delay: Duration) -> Self {
        self.retry_count = count;
        self.retry_delay = delay;
        self
    }

    /// Replace the rendering engine.
    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Replace the HTML processor.
    pub fn with_processor(mut self, processor: HtmlProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn settings(&self) -> &MailEditorSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }

    pub fn validator(&self) -> &TemplateValidator {
        &self.validator
    }

    /// Validate and persist `template`.
    ///
    /// Invalid records are rejected with [`MailError::Validation`] and not
    /// stored.
    pub async fn save_template(&self, template: MailTemplate) -> Result<MailTemplate> {
        self.validator.validate(&template)?;
        let saved = self.store.save(template).await?;

        debug!(
            id = ?saved.id,
            template_type = %saved.template_type,
            "Mail template saved"
        );
        Ok(saved)
    }

    /// Create a record for every catalogue type that has none.
    ///
    /// With more than one configured language one record per language is
    /// created, otherwise a single language-less record. Returns the number
    /// created.
    pub async fn add_missing_templates(&self) -> Result<usize> {
        let catalogue = self.settings.catalogue();
        let languages: Vec<Option<&str>> = if self.settings.languages.len() > 1 {
            self.settings.languages.iter().map(|l| Some(l.as_str())).collect()
        } else {
            vec![None]
        };

        let mut created = 0;
        for template_type in catalogue.types() {
            for language in &languages {
                let (_, was_created) = self.store.find_or_create(template_type, *language, None).await?;
                if was_created {
                    created += 1;
                }
            }
        }

        info!(created, "Missing mail templates added");
        Ok(created)
    }

    /// Layout for `template`: its own path, then its type's, then the default.
    pub fn layout_for<'a>(&'a self, template: &'a MailTemplate) -> Option<&'a str> {
        template
            .base_template_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .or_else(|| {
                self.settings
                    .templates
                    .get(&template.template_type)
                    .and_then(|spec| spec.base_template.as_deref())
            })
            .or(self.settings.default_base_template.as_deref())
    }

    /// Render `template` with its layout applied.
    pub fn render(
        &self,
        template: &MailTemplate,
        body_context: &Value,
        subject_context: Option<&Value>,
    ) -> Result<RenderedTemplate> {
        template.render(
            self.engine.as_ref(),
            self.layout_for(template),
            body_context,
            subject_context,
        )
    }

    /// HTML help listing the variables available to `template_type`.
    pub fn help_text(&self, template_type: &str) -> String {
        variable_help_text(&self.settings.templates, template_type)
    }

    fn example_contexts(&self, template: &MailTemplate) -> (Value, Value) {
        self.settings
            .templates
            .get(&template.template_type)
            .map(preview_contexts)
            .unwrap_or_else(|| (json!({}), json!({})))
    }

    /// Browser preview of `template` rendered with example values.
    ///
    /// Images keep their absolute URLs.
    pub fn preview_html(&self, template: &MailTemplate) -> Result<String> {
        let (subject_context, body_context) = self.example_contexts(template);
        let rendered = self.render(template, &body_context, Some(&subject_context))?;

        let options = ProcessOptions::new()
            .extract_attachments(false)
            .debug(self.settings.debug);
        let processed = self
            .processor
            .process(&rendered.body, self.settings.base_url(), &options)?;

        Ok(processed.html)
    }

    /// Render, process and deliver `template` to `to`.
    ///
    /// Returns the number of messages delivered.
    pub async fn send_email(
        &self,
        template: &MailTemplate,
        to: Vec<Address>,
        body_context: &Value,
        subject_context: Option<&Value>,
        options: SendOptions,
    ) -> Result<usize> {
        let rendered = self.render(template, body_context, subject_context)?;

        let process = ProcessOptions::new()
            .extract_attachments(true)
            .debug(self.settings.debug);
        let processed = self
            .processor
            .process(&rendered.body, self.settings.base_url(), &process)?;

        let from = self
            .settings
            .default_from
            .as_deref()
            .ok_or(MailError::MissingField("from"))?;

        let mut email = Email::new().from(from)?.subject(rendered.subject);
        email.to = to;
        email.cc = options.cc;
        email.bcc = options.bcc;
        if options.txt {
            email = email.text(strip_tags(&processed.html));
        }
        email = email.html(processed.html);

        for attachment in processed.attachments {
            email = email.attach(attachment.into());
        }
        for attachment in options.attachments {
            email = email.attach(attachment);
        }

        self.send_with_retry(&email).await?;

        debug!(
            template_type = %template.template_type,
            recipients = email.recipients().count(),
            inline = email.inline_attachments().count(),
            "Template email sent"
        );
        Ok(1)
    }

    /// Send `template` to `recipient` rendered with example values.
    pub async fn send_preview(&self, template: &MailTemplate, recipient: impl IntoAddress) -> Result<usize> {
        let (subject_context, body_context) = self.example_contexts(template);
        self.send_email(
            template,
            vec![recipient.into_address()?],
            &body_context,
            Some(&subject_context),
            SendOptions::default(),
        )
        .await
    }
}

impl MailEditor {
    async fn send_with_retry(&self, email: &Email) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.transport.send(email).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && attempt < self.retry_count => {
                    attempt += 1;
                    warn!(attempt, error = %err, "Mail delivery failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for MailEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailEditor")
            .field("base_host", &self.settings.base_host)
            .field("validator", &self.validator)
            .field("retry_count", &self.retry_count)
            .finish_non_exhaustive()
    }
}
