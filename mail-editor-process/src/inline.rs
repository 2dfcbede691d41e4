//! CSS inlining.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use css_inline::{CSSInliner, InlineError, StylesheetResolver};
use url::Url;

use crate::{ProcessError, Result};

/// Move `<style>` rules and local `<link>` stylesheets into `style`
/// attributes, dropping the tags.
///
/// Relative stylesheet hrefs resolve against `static_root`. Remote loading
/// is compiled out, so only `file://` and relative hrefs can be read.
pub(crate) fn inline_css(html: &str, static_root: &Path) -> Result<String> {
    let root = std::path::absolute(static_root).map_err(|err| ProcessError::Inline(err.to_string()))?;
    let base_url = Url::from_directory_path(&root).map_err(|_| {
        ProcessError::Inline(format!("{} is not a valid stylesheet base", root.display()))
    })?;

    let inliner = CSSInliner::options()
        .base_url(Some(base_url))
        .keep_style_tags(false)
        .keep_link_tags(false)
        // every link left in the document points at a local file
        .load_remote_stylesheets(true)
        .resolver(Arc::new(LocalStylesheets))
        .build();

    Ok(inliner.inline(html)?)
}

/// Reads `file:` stylesheet URLs from disk.
///
/// Every href reaches the inliner percent-encoded, so the path is decoded
/// through [`Url::to_file_path`] before reading. Other schemes are refused.
struct LocalStylesheets;

impl StylesheetResolver for LocalStylesheets {
    fn retrieve(&self, location: &str) -> std::result::Result<String, InlineError> {
        let path = Url::parse(location)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| self.unsupported(&format!("not a local stylesheet: {location}")))?;

        std::fs::read_to_string(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => InlineError::MissingStyleSheet {
                path: path.display().to_string(),
            },
            _ => InlineError::IO(error),
        })
    }
}
