use mail_editor_config::ConfigError;
use mail_editor_process::ProcessError;
use mail_editor_template::{TemplateError, ValidationFailure};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailError>;

/// Everything that can go wrong between editing a template and handing the
/// message to a relay.
#[derive(Debug, Error)]
pub enum MailError {
    /// The relay refused the message or the connection dropped.
    #[error("delivery failed: {0}")]
    Smtp(String),

    #[error("invalid address {0}")]
    InvalidAddress(String),

    /// A header or body the message cannot go out without.
    #[error("message has no {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// No stored record for the type, language and domain.
    #[error("no template stored for {0}")]
    TemplateNotFound(String),

    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    #[error("could not prepare html: {0}")]
    Process(#[from] ProcessError),

    #[error("bad attachment: {0}")]
    Attachment(String),

    /// Headers or parts that lettre refused to assemble.
    #[error("could not build message: {0}")]
    Build(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("relay did not answer in time")]
    Timeout,

    #[error("template store: {0}")]
    Store(String),
}

impl MailError {
    /// Transient delivery failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Smtp(_) | Self::Timeout)
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Smtp(err.to_string())
        }
    }
}

impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Build(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(MailError::Smtp("connection reset".to_string()).is_retryable());
        assert!(MailError::Timeout.is_retryable());
        assert!(!MailError::MissingField("from").is_retryable());
        assert!(!MailError::Build("missing From".to_string()).is_retryable());
        assert!(!MailError::TemplateNotFound("welcome".to_string()).is_retryable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(MailError::MissingField("subject").to_string(), "message has no subject");
        assert_eq!(
            MailError::TemplateNotFound("welcome".to_string()).to_string(),
            "no template stored for welcome"
        );
    }
}
