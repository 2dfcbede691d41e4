//! File and inline attachments.

use std::path::Path;

use mail_editor_process::CidAttachment;
use serde::{Deserialize, Serialize};

use crate::{MailError, Result};

const OCTET_STREAM: &str = "application/octet-stream";

/// Where a part is shown by the mail client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDisposition {
    /// Offered for download.
    #[default]
    Attachment,
    /// Referenced from the HTML body through `cid:`.
    Inline,
}

/// A MIME part carried next to the message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub disposition: ContentDisposition,
    /// `Content-ID` without angle brackets; set for inline parts.
    pub content_id: Option<String>,
}

impl Attachment {
    /// Downloadable attachment with an explicit content type.
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
            disposition: ContentDisposition::Attachment,
            content_id: None,
        }
    }

    /// Downloadable attachment typed from the file extension.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string();
        Self::new(filename, content_type, data)
    }

    /// Read a file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| MailError::Attachment(format!("{} has no usable file name", path.display())))?
            .to_string();

        Ok(Self::from_bytes(filename, std::fs::read(path)?))
    }

    /// Inline part referenced as `cid:<cid>`.
    pub fn inline(cid: impl Into<String>, content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let cid = cid.into();
        Self {
            disposition: ContentDisposition::Inline,
            content_id: Some(cid.clone()),
            ..Self::new(cid, content_type, data)
        }
    }

    pub fn is_inline(&self) -> bool {
        self.disposition == ContentDisposition::Inline && self.content_id.is_some()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl From<CidAttachment> for Attachment {
    fn from(attachment: CidAttachment) -> Self {
        Self::inline(attachment.cid, attachment.content_type, attachment.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        let pdf = Attachment::from_bytes("invoice.pdf", b"%PDF".to_vec());
        assert_eq!(pdf.content_type, "application/pdf");
        assert!(!pdf.is_inline());

        let unknown = Attachment::from_bytes("data.unknownext", b"x".to_vec());
        assert_eq!(unknown.content_type, OCTET_STREAM);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.filename, "notes.txt");
        assert_eq!(attachment.content_type, "text/plain");
        assert_eq!(attachment.size(), 5);

        assert!(matches!(
            Attachment::from_path(dir.path().join("missing.txt")),
            Err(MailError::Io(_))
        ));
    }

    #[test]
    fn test_from_cid_attachment() {
        let attachment: Attachment = CidAttachment::new("abc", b"img".to_vec(), "image/png").into();

        assert!(attachment.is_inline());
        assert_eq!(attachment.content_id.as_deref(), Some("abc"));
        assert_eq!(attachment.filename, "abc");
        assert_eq!(attachment.content_type, "image/png");
    }
}
