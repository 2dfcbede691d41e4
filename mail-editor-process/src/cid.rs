//! Content-addressed inline attachments.

use std::fmt;

use sha2::{Digest, Sha256};

/// Content-ID for `content`: lowercase hex SHA-256 of the bytes.
///
/// Identical bytes always map to the same id, so an image referenced many
/// times in one mail is attached once.
pub fn cid_for_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// An image attached inline and referenced as `cid:<cid>`.
#[derive(Clone, PartialEq, Eq)]
pub struct CidAttachment {
    pub cid: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl CidAttachment {
    pub fn new(cid: impl Into<String>, content: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// `cid:` URL referencing this attachment.
    pub fn url(&self) -> String {
        format!("cid:{}", self.cid)
    }
}

impl fmt::Debug for CidAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CidAttachment")
            .field("cid", &self.cid)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("content_type", &self.content_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_for_bytes() {
        assert_eq!(cid_for_bytes(b"abc"), cid_for_bytes(b"abc"));
        assert_ne!(cid_for_bytes(b"12356"), cid_for_bytes(b"abc"));
        assert_eq!(
            cid_for_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_url() {
        let attachment = CidAttachment::new("abc123", b"x".to_vec(), "image/png");
        assert_eq!(attachment.url(), "cid:abc123");
    }
}
