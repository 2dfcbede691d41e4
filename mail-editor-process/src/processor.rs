//! The HTML mail processor.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use lol_html::html_content::Element;
use lol_html::{ElementContentHandlers, HandlerResult, RewriteStrSettings, Selector, rewrite_str};
use mail_editor_config::{AssetLocation, MailEditorSettings};
use tracing::{debug, warn};
use url::Url;

use crate::asset::{
    AssetResolver, ImageResolver, LocatedFile, Unresolved, locate, strip_location_prefix,
};
use crate::cid::{CidAttachment, cid_for_bytes};
use crate::inline::inline_css;
use crate::links::absolutize;
use crate::Result;

/// Which processing steps to run. Links are always made absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Replace embeddable `<img>` sources with `cid:` attachments.
    pub extract_attachments: bool,
    /// Inline stylesheets into `style` attributes.
    pub inline_css: bool,
    /// Return CSS inlining failures instead of logging them.
    pub debug: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            extract_attachments: true,
            inline_css: true,
            debug: false,
        }
    }
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract_attachments(mut self, extract: bool) -> Self {
        self.extract_attachments = extract;
        self
    }

    pub fn inline_css(mut self, inline: bool) -> Self {
        self.inline_css = inline;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Processed HTML plus the inline attachments it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub html: String,
    /// In order of first reference, one per distinct content.
    pub attachments: Vec<CidAttachment>,
}

/// Turns rendered HTML into self-contained mail HTML.
///
/// Holds no per-document state and can be shared between threads.
#[derive(Clone)]
pub struct HtmlProcessor {
    images: Arc<dyn ImageResolver>,
    static_files: AssetLocation,
}

impl HtmlProcessor {
    pub fn new(static_files: AssetLocation, media_files: AssetLocation) -> Self {
        Self {
            images: Arc::new(AssetResolver::new(static_files.clone(), media_files)),
            static_files,
        }
    }

    pub fn from_settings(settings: &MailEditorSettings) -> Self {
        Self::new(settings.static_files.clone(), settings.media_files.clone())
    }

    /// Replace the image resolver.
    pub fn with_image_resolver(mut self, resolver: impl ImageResolver + 'static) -> Self {
        self.images = Arc::new(resolver);
        self
    }

    /// Process `html`, making links absolute against `base_url`.
    ///
    /// Unresolvable images keep their absolute URL and stylesheets that do
    /// not map to a local static file are removed. Fails only when the
    /// document cannot be rewritten, or when inlining fails in debug mode.
    pub fn process(&self, html: &str, base_url: &str, options: &ProcessOptions) -> Result<ProcessedDocument> {
        let mut cids: HashMap<String, Option<String>> = HashMap::new();
        let mut attachments: Vec<CidAttachment> = Vec::new();

        let mut handlers = vec![
            (selector("a[href]")?, absolutize_attribute("href", base_url)),
            (selector("img[src]")?, absolutize_attribute("src", base_url)),
            (selector("link[href]")?, absolutize_attribute("href", base_url)),
        ];

        if options.extract_attachments {
            let images = self.images.as_ref();
            let attachments = &mut attachments;
            handlers.push((
                selector("img[src]")?,
                on_element(move |el| {
                    let Some(url) = el.get_attribute("src").filter(|url| !url.is_empty()) else {
                        return Ok(());
                    };
                    let cid = cids
                        .entry(url)
                        .or_insert_with_key(|url| embed(images, url, base_url, attachments))
                        .clone();
                    if let Some(cid) = cid {
                        el.set_attribute("src", &format!("cid:{}", cid))?;
                    }
                    Ok(())
                }),
            ));
        }

        if options.inline_css {
            let static_files = &self.static_files;
            handlers.push((
                selector("link[href]")?,
                on_element(move |el| {
                    if !is_stylesheet(el.get_attribute("rel").as_deref()) {
                        return Ok(());
                    }
                    let href = el.get_attribute("href").unwrap_or_default();
                    match local_stylesheet(static_files, &href, base_url) {
                        Ok(local) => el.set_attribute("href", &local)?,
                        Err(reason) => {
                            debug!(href = %href, %reason, "Removing stylesheet link");
                            el.remove();
                        }
                    }
                    Ok(())
                }),
            ));
        }

        let html = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: handlers,
                strict: false,
                ..RewriteStrSettings::new()
            },
        )?;

        let html = if options.inline_css {
            self.inline(html, options.debug)?
        } else {
            html
        };

        Ok(ProcessedDocument { html, attachments })
    }

    fn inline(&self, html: String, debug_mode: bool) -> Result<String> {
        match inline_css(&html, &self.static_files.root) {
            Ok(inlined) => Ok(inlined),
            Err(err) if debug_mode => Err(err),
            Err(err) => {
                warn!(error = %err, "CSS inlining failed, sending HTML as is");
                Ok(html)
            }
        }
    }
}

impl std::fmt::Debug for HtmlProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlProcessor")
            .field("static_files", &self.static_files)
            .finish_non_exhaustive()
    }
}

fn selector(selector: &str) -> Result<Cow<'static, Selector>> {
    Ok(Cow::Owned(Selector::from_str(selector)?))
}

#[inline]
fn on_element<'h, F>(handler: F) -> ElementContentHandlers<'h>
where
    F: FnMut(&mut Element<'_, '_>) -> HandlerResult + 'h,
{
    ElementContentHandlers::default().element(handler)
}

fn absolutize_attribute<'h>(attribute: &'static str, base_url: &'h str) -> ElementContentHandlers<'h> {
    on_element(move |el| {
        if let Some(value) = el.get_attribute(attribute).filter(|value| !value.is_empty()) {
            el.set_attribute(attribute, &absolutize(&value, base_url))?;
        }
        Ok(())
    })
}

/// Resolve and register an image, returning its cid.
fn embed(
    images: &dyn ImageResolver,
    url: &str,
    base_url: &str,
    attachments: &mut Vec<CidAttachment>,
) -> Option<String> {
    match images.resolve_image(url, base_url) {
        Ok(asset) => {
            let cid = cid_for_bytes(&asset.content);
            if !attachments.iter().any(|attachment| attachment.cid == cid) {
                attachments.push(CidAttachment::new(cid.clone(), asset.content, asset.content_type));
            }
            Some(cid)
        }
        Err(reason) => {
            debug!(url, %reason, "Image not embedded");
            None
        }
    }
}

fn is_stylesheet(rel: Option<&str>) -> bool {
    rel.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// New href for a stylesheet under the static URL: the root-relative path,
/// or a `file://` URL for files only present in a finder directory.
fn local_stylesheet(static_files: &AssetLocation, href: &str, base_url: &str) -> std::result::Result<String, Unresolved> {
    let relative = strip_location_prefix(href, static_files, base_url).ok_or(Unresolved::External)?;

    match locate(static_files, relative)? {
        LocatedFile::Root { relative, .. } => Ok(relative),
        LocatedFile::Finder(path) => file_url(&path),
    }
}

fn file_url(path: &Path) -> std::result::Result<String, Unresolved> {
    let path = std::path::absolute(path).map_err(|err| Unresolved::Read(err.to_string()))?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|_| Unresolved::UnsafePath)
}
