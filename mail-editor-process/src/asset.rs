//! Mapping image and stylesheet URLs to local files.
//!
//! Only data URIs and files under the configured static and media prefixes
//! resolve. Nothing is ever fetched over the network.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mail_editor_config::{AssetLocation, MailEditorSettings};
use thiserror::Error;

use crate::links::{absolutize, strip_query};

/// Image types that may be embedded in a mail.
///
/// SVG is deliberately absent since it can carry script.
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Bytes and content type of a resolved asset.
#[derive(Clone, PartialEq, Eq)]
pub struct FileAsset {
    pub content: Vec<u8>,
    pub content_type: String,
}

impl FileAsset {
    pub fn new(content: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for FileAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAsset")
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Why an asset reference could not be resolved.
///
/// Never an error for the caller: the reference is left as it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolved {
    #[error("not under a static or media URL")]
    External,

    #[error("invalid data URI")]
    InvalidDataUri,

    #[error("unsafe path")]
    UnsafePath,

    #[error("file not found")]
    NotFound,

    #[error("read failed: {0}")]
    Read(String),

    #[error("empty content")]
    Empty,

    #[error("content type {0} not allowed")]
    DisallowedType(String),
}

/// Resolves `<img>` sources to embeddable bytes.
pub trait ImageResolver: Send + Sync {
    /// Resolve `url` (absolutized against `base_url` first).
    fn resolve_image(&self, url: &str, base_url: &str) -> Result<FileAsset, Unresolved>;
}

/// A file found for an asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatedFile {
    /// Under the location root; holds the root-relative URL path.
    Root { relative: String, path: PathBuf },
    /// In one of the finder directories.
    Finder(PathBuf),
}

impl LocatedFile {
    pub fn path(&self) -> &Path {
        match self {
            LocatedFile::Root { path, .. } => path,
            LocatedFile::Finder(path) => path,
        }
    }
}

/// Find the file for `relative` (a URL path below the location prefix),
/// trying the root first and then each finder directory.
pub fn locate(location: &AssetLocation, relative: &str) -> Result<LocatedFile, Unresolved> {
    let relative = strip_query(relative).trim_start_matches('/');
    let decoded = urlencoding::decode(relative).map_err(|_| Unresolved::UnsafePath)?;
    let sub_path = safe_relative_path(&decoded)?;

    let path = location.root.join(&sub_path);
    if path.is_file() {
        return Ok(LocatedFile::Root {
            relative: relative.to_string(),
            path,
        });
    }

    location
        .finders
        .iter()
        .map(|dir| dir.join(&sub_path))
        .find(|path| path.is_file())
        .map(LocatedFile::Finder)
        .ok_or(Unresolved::NotFound)
}

/// Reject empty, absolute and parent-relative paths.
fn safe_relative_path(relative: &str) -> Result<PathBuf, Unresolved> {
    let path = Path::new(relative);
    let mut clean = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(Unresolved::UnsafePath),
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(Unresolved::UnsafePath);
    }
    Ok(clean)
}

/// Path of `url` below the URL prefix of `location`, both absolutized
/// against `base_url`.
pub fn strip_location_prefix<'u>(url: &'u str, location: &AssetLocation, base_url: &str) -> Option<&'u str> {
    let prefix = absolutize(&location.url, base_url);
    let prefix = prefix.trim_end_matches('/');
    url.strip_prefix(prefix)
        .filter(|rest| rest.starts_with('/'))
}

/// Read a file and guess its content type from the extension.
pub fn read_image_file(path: &Path) -> Result<FileAsset, Unresolved> {
    let content = std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Unresolved::NotFound,
        _ => Unresolved::Read(err.to_string()),
    })?;

    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(FileAsset::new(content, content_type))
}

/// Decode a `data:` URI. Both content and a declared type are required.
pub fn read_data_uri(uri: &str) -> Result<FileAsset, Unresolved> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or(Unresolved::InvalidDataUri)?;
    let (meta, data) = rest.split_once(',').ok_or(Unresolved::InvalidDataUri)?;

    let mut params = meta.split(';');
    let content_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if content_type.is_empty() {
        return Err(Unresolved::InvalidDataUri);
    }

    let content = if params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let data = urlencoding::decode(&data).map_err(|_| Unresolved::InvalidDataUri)?;
        STANDARD
            .decode(data.as_bytes())
            .map_err(|_| Unresolved::InvalidDataUri)?
    } else {
        urlencoding::decode_binary(data.as_bytes()).into_owned()
    };

    if content.is_empty() {
        return Err(Unresolved::InvalidDataUri);
    }
    Ok(FileAsset::new(content, content_type))
}

/// Resolves images from data URIs and the static and media directories.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    static_files: AssetLocation,
    media_files: AssetLocation,
}

impl AssetResolver {
    pub fn new(static_files: AssetLocation, media_files: AssetLocation) -> Self {
        Self {
            static_files,
            media_files,
        }
    }

    pub fn from_settings(settings: &MailEditorSettings) -> Self {
        Self::new(settings.static_files.clone(), settings.media_files.clone())
    }

    pub fn static_files(&self) -> &AssetLocation {
        &self.static_files
    }

    pub fn media_files(&self) -> &AssetLocation {
        &self.media_files
    }

    fn load(&self, url: &str, base_url: &str) -> Result<FileAsset, Unresolved> {
        if url.starts_with("data:") {
            return read_data_uri(url);
        }

        for location in [&self.static_files, &self.media_files] {
            if let Some(relative) = strip_location_prefix(url, location, base_url) {
                let located = locate(location, relative)?;
                return read_image_file(located.path());
            }
        }

        Err(Unresolved::External)
    }
}

impl ImageResolver for AssetResolver {
    fn resolve_image(&self, url: &str, base_url: &str) -> Result<FileAsset, Unresolved> {
        let url = absolutize(url, base_url);
        let asset = self.load(&url, base_url)?;

        if asset.content.is_empty() {
            return Err(Unresolved::Empty);
        }
        if !ALLOWED_IMAGE_TYPES.contains(&asset.content_type.as_str()) {
            return Err(Unresolved::DisallowedType(asset.content_type));
        }
        Ok(asset)
    }
}
