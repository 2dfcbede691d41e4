//! Template persistence.

use std::sync::Arc;

use async_trait::async_trait;
use mail_editor_config::TemplateCatalogue;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{MailError, MailTemplate, Result};

/// Storage for [`MailTemplate`] records.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// The record for exactly `(template_type, language, domain)`, creating it
    /// from the type's defaults when absent. The flag is `true` if created.
    async fn find_or_create(
        &self,
        template_type: &str,
        language: Option<&str>,
        domain: Option<&str>,
    ) -> Result<(MailTemplate, bool)>;

    /// Best record for a language and domain.
    ///
    /// An exact language beats a language-less record, then an exact domain
    /// beats a domain-less record.
    async fn get_for_language(
        &self,
        template_type: &str,
        language: Option<&str>,
        domain: Option<&str>,
    ) -> Result<MailTemplate>;

    /// Insert or update `template`, returning it with its id set.
    ///
    /// Fails with [`MailError::Store`] when another record already holds the
    /// same `(template_type, language, domain)`.
    async fn save(&self, template: MailTemplate) -> Result<MailTemplate>;

    /// Every record, in insertion order.
    async fn list(&self) -> Result<Vec<MailTemplate>>;
}

#[derive(Debug, Default)]
struct Records {
    next_id: u64,
    templates: Vec<MailTemplate>,
}

impl Records {
    fn find(&self, template_type: &str, language: Option<&str>, domain: Option<&str>) -> Option<&MailTemplate> {
        self.templates.iter().find(|t| {
            t.template_type == template_type
                && blank(t.language.as_deref()) == blank(language)
                && blank(t.domain.as_deref()) == blank(domain)
        })
    }

    fn insert(&mut self, mut template: MailTemplate) -> MailTemplate {
        self.next_id += 1;
        template.id = Some(self.next_id);
        self.templates.push(template.clone());
        template
    }
}

/// In-process [`TemplateStore`].
///
/// ```
/// # tokio_test::block_on(async {
/// use std::sync::Arc;
/// use mail_editor_config::TemplateCatalogue;
/// use mail_editor_mail::{InMemoryTemplateStore, TemplateStore};
///
/// let store = InMemoryTemplateStore::new(Arc::new(TemplateCatalogue::new()));
/// let (template, created) = store.find_or_create("welcome", Some("en"), None).await.unwrap();
/// assert!(created);
/// assert_eq!(template.subject, "Please fix this template");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTemplateStore {
    catalogue: Arc<TemplateCatalogue>,
    records: Arc<RwLock<Records>>,
}

impl InMemoryTemplateStore {
    pub fn new(catalogue: Arc<TemplateCatalogue>) -> Self {
        Self {
            catalogue,
            records: Arc::new(RwLock::new(Records::default())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.templates.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Lower is better; `None` when the record does not serve the request.
fn rank(template: &MailTemplate, language: Option<&str>, domain: Option<&str>) -> Option<u8> {
    let language_rank = match (blank(template.language.as_deref()), blank(language)) {
        (None, _) => 1,
        (Some(have), Some(want)) if have == want => 0,
        _ => return None,
    };
    let domain_rank = match (blank(template.domain.as_deref()), blank(domain)) {
        (None, _) => 1,
        (Some(have), Some(want)) if have == want => 0,
        _ => return None,
    };
    Some(language_rank * 2 + domain_rank)
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn find_or_create(
        &self,
        template_type: &str,
        language: Option<&str>,
        domain: Option<&str>,
    ) -> Result<(MailTemplate, bool)> {
        let language = blank(language);
        let domain = blank(domain);

        let mut records = self.records.write().await;
        if let Some(existing) = records.find(template_type, language, domain) {
            return Ok((existing.clone(), false));
        }

        let mut template = MailTemplate::with_defaults(template_type, self.catalogue.get(template_type));
        template.language = language.map(str::to_string);
        template.domain = domain.map(str::to_string);

        debug!(
            template_type = %template_type,
            language = ?language,
            domain = ?domain,
            "Creating mail template"
        );

        Ok((records.insert(template), true))
    }

    async fn get_for_language(
        &self,
        template_type: &str,
        language: Option<&str>,
        domain: Option<&str>,
    ) -> Result<MailTemplate> {
        let records = self.records.read().await;
        records
            .templates
            .iter()
            .filter(|t| t.template_type == template_type)
            .filter_map(|t| rank(t, language, domain).map(|r| (r, t)))
            .min_by_key(|(r, _)| *r)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| MailError::TemplateNotFound(template_type.to_string()))
    }

    async fn save(&self, template: MailTemplate) -> Result<MailTemplate> {
        let mut records = self.records.write().await;

        let holder = records
            .find(&template.template_type, template.language.as_deref(), template.domain.as_deref())
            .and_then(|t| t.id);
        if let Some(holder) = holder.filter(|holder| template.id != Some(*holder)) {
            return Err(MailError::Store(format!(
                "template {} already exists for {} (language {:?}, domain {:?})",
                holder, template.template_type, template.language, template.domain
            )));
        }

        let Some(id) = template.id else {
            return Ok(records.insert(template));
        };

        let slot = records
            .templates
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| MailError::Store(format!("no template with id {}", id)))?;
        *slot = template.clone();
        Ok(template)
    }

    async fn list(&self) -> Result<Vec<MailTemplate>> {
        Ok(self.records.read().await.templates.clone())
    }
}
