//! The outgoing message and its MIME layout.

use lettre::message::header::ContentType;
use lettre::message::{Attachment as LettreAttachment, MessageBuilder, MultiPart, SinglePart};
use serde::{Deserialize, Serialize};

use crate::{Address, Attachment, IntoAddress, MailError, Result};

/// A rendered message ready for a [`Transport`](crate::Transport).
///
/// Built by [`MailEditor`](crate::MailEditor) after processing, or by hand
/// through the chained setters. Address setters return `Result` because
/// they parse their input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Email {
    pub from: Option<Address>,
    pub reply_to: Option<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    /// Delivered to but never written into the headers.
    pub bcc: Vec<Address>,
    pub subject: Option<String>,
    /// Plain text alternative.
    pub text: Option<String>,
    pub html: Option<String>,
    /// Inline images and downloadable files, in the order they were added.
    pub attachments: Vec<Attachment>,
}

impl Email {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(self, from: impl IntoAddress) -> Result<Self> {
        let from = from.into_address()?;
        Ok(Self { from: Some(from), ..self })
    }

    pub fn reply_to(self, reply_to: impl IntoAddress) -> Result<Self> {
        let reply_to = reply_to.into_address()?;
        Ok(Self { reply_to: Some(reply_to), ..self })
    }

    pub fn to(mut self, recipient: impl IntoAddress) -> Result<Self> {
        self.to.push(recipient.into_address()?);
        Ok(self)
    }

    pub fn cc(mut self, recipient: impl IntoAddress) -> Result<Self> {
        self.cc.push(recipient.into_address()?);
        Ok(self)
    }

    pub fn bcc(mut self, recipient: impl IntoAddress) -> Result<Self> {
        self.bcc.push(recipient.into_address()?);
        Ok(self)
    }

    pub fn subject(self, subject: impl Into<String>) -> Self {
        Self { subject: Some(subject.into()), ..self }
    }

    pub fn text(self, body: impl Into<String>) -> Self {
        Self { text: Some(body.into()), ..self }
    }

    pub fn html(self, body: impl Into<String>) -> Self {
        Self { html: Some(body.into()), ..self }
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Parts referenced from the HTML through `cid:`.
    pub fn inline_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| a.is_inline())
    }

    pub fn file_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| !a.is_inline())
    }

    /// Every envelope recipient: to, then cc, then bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// Fails with [`MailError::MissingField`] naming the first absent part.
    pub fn validate(&self) -> Result<()> {
        match self.first_missing() {
            Some(field) => Err(MailError::MissingField(field)),
            None => Ok(()),
        }
    }

    fn first_missing(&self) -> Option<&'static str> {
        if self.from.is_none() {
            Some("from")
        } else if self.recipients().next().is_none() {
            Some("to/cc/bcc")
        } else if self.subject.is_none() {
            Some("subject")
        } else if self.text.is_none() && self.html.is_none() {
            Some("text/html body")
        } else {
            None
        }
    }

    /// Convert into a lettre message.
    ///
    /// Parts nest as `mixed[related[alternative[text, html], inline...], files...]`.
    /// The `related` level only appears with inline parts and `mixed` only
    /// with file attachments.
    pub fn to_lettre(&self) -> Result<lettre::Message> {
        self.validate()?;

        let headers = self.headers()?;
        let mut body = self.alternative()?;

        let inline: Vec<&Attachment> = self.inline_attachments().collect();
        if !inline.is_empty() {
            body = inline.into_iter().try_fold(MultiPart::related().multipart(body), |related, part| {
                let cid = part.content_id.clone().unwrap_or_default();
                Ok::<_, MailError>(related.singlepart(lettre_part(LettreAttachment::new_inline(cid), part)?))
            })?;
        }

        let files: Vec<&Attachment> = self.file_attachments().collect();
        if !files.is_empty() {
            body = files.into_iter().try_fold(MultiPart::mixed().multipart(body), |mixed, part| {
                let download = LettreAttachment::new(part.filename.clone());
                Ok::<_, MailError>(mixed.singlepart(lettre_part(download, part)?))
            })?;
        }

        Ok(headers.multipart(body)?)
    }

    /// Raw RFC 5322 bytes, as they would be handed to a relay.
    pub fn formatted(&self) -> Result<Vec<u8>> {
        Ok(self.to_lettre()?.formatted())
    }

    fn headers(&self) -> Result<MessageBuilder> {
        let sender = self.from.as_ref().ok_or(MailError::MissingField("from"))?;
        let mut builder = lettre::Message::builder()
            .from(sender.to_mailbox()?)
            .subject(self.subject.clone().unwrap_or_default());

        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.to_mailbox()?);
        }
        for recipient in &self.to {
            builder = builder.to(recipient.to_mailbox()?);
        }
        for recipient in &self.cc {
            builder = builder.cc(recipient.to_mailbox()?);
        }
        for recipient in &self.bcc {
            builder = builder.bcc(recipient.to_mailbox()?);
        }
        Ok(builder)
    }

    fn alternative(&self) -> Result<MultiPart> {
        let alternative = MultiPart::alternative();
        Ok(match (&self.text, &self.html) {
            (Some(text), Some(html)) => MultiPart::alternative_plain_html(text.clone(), html.clone()),
            (None, Some(html)) => alternative.singlepart(SinglePart::html(html.clone())),
            (Some(text), None) => alternative.singlepart(SinglePart::plain(text.clone())),
            (None, None) => return Err(MailError::MissingField("text/html body")),
        })
    }
}

fn lettre_part(part: LettreAttachment, attachment: &Attachment) -> Result<SinglePart> {
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        MailError::Attachment(format!(
            "{}: invalid content type {}: {}",
            attachment.filename, attachment.content_type, e
        ))
    })?;
    Ok(part.body(attachment.data.clone(), content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::new()
            .from("Shop <shop@example.com>")
            .unwrap()
            .to("jane@example.com")
            .unwrap()
            .subject("Your order")
    }

    #[test]
    fn test_validate_requires_a_body() {
        assert!(email().text("Thanks for your order").validate().is_ok());
        assert!(matches!(
            email().validate(),
            Err(MailError::MissingField("text/html body"))
        ));
    }

    #[test]
    fn test_validate_reports_first_missing_part() {
        let no_sender = Email::new().to("jane@example.com").unwrap().text("hi");
        assert!(matches!(no_sender.validate(), Err(MailError::MissingField("from"))));

        let bcc_only = Email::new()
            .from("shop@example.com")
            .unwrap()
            .bcc("audit@example.com")
            .unwrap()
            .html("<p>hi</p>");
        assert!(matches!(bcc_only.validate(), Err(MailError::MissingField("subject"))));
    }

    #[test]
    fn test_invalid_recipient() {
        assert!(Email::new().to("not-an-address").is_err());
    }

    #[test]
    fn test_inline_attachment_headers() {
        let message = email()
            .html(r#"<img src="cid:abc123">"#)
            .attach(Attachment::inline("abc123", "image/png", b"png".to_vec()))
            .attach(Attachment::new("report.txt", "text/plain", b"report".to_vec()))
            .formatted()
            .unwrap();
        let message = String::from_utf8_lossy(&message);

        assert!(message.contains("multipart/mixed"));
        assert!(message.contains("multipart/related"));
        assert!(message.contains("multipart/alternative"));
        assert!(message.contains("Content-ID: <abc123>"));
        assert!(message.contains("Content-Disposition: inline"));
        assert!(message.contains("filename=\"report.txt\""));
    }

    #[test]
    fn test_no_related_without_inline() {
        let message = email().html("<p>hi</p>").formatted().unwrap();
        let message = String::from_utf8_lossy(&message);

        assert!(message.contains("multipart/alternative"));
        assert!(!message.contains("multipart/related"));
        assert!(!message.contains("multipart/mixed"));
    }
}
