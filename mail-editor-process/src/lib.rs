//! HTML post-processing for e-mail delivery.
//!
//! [`HtmlProcessor::process`] makes `a[href]`, `img[src]` and `link[href]`
//! absolute, replaces embeddable images with content-addressed `cid:`
//! attachments and inlines CSS. Broken images and stylesheets never stop a
//! mail from being sent; they only make it look worse.
//!
//! ```no_run
//! use mail_editor_config::AssetLocation;
//! use mail_editor_process::{HtmlProcessor, ProcessOptions};
//!
//! let processor = HtmlProcessor::new(
//!     AssetLocation::new("/static/", "static"),
//!     AssetLocation::new("/media/", "media"),
//! );
//! let doc = processor
//!     .process(r#"<img src="/static/logo.png">"#, "https://example.com", &ProcessOptions::default())
//!     .unwrap();
//! println!("{} attachments", doc.attachments.len());
//! ```

pub mod asset;
pub mod cid;
pub mod error;
mod inline;
pub mod links;
pub mod processor;

pub use asset::{
    ALLOWED_IMAGE_TYPES, AssetResolver, FileAsset, ImageResolver, LocatedFile, Unresolved, locate,
    read_data_uri, read_image_file,
};
pub use cid::{CidAttachment, cid_for_bytes};
pub use error::{ProcessError, Result};
pub use links::{absolutize, has_explicit_scheme};
pub use processor::{HtmlProcessor, ProcessOptions, ProcessedDocument};
