//! Where finished messages go.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Email, Result};

/// Delivery backend used by [`MailEditor`](crate::MailEditor).
///
/// Errors for which [`MailError::is_retryable`](crate::MailError::is_retryable)
/// holds are retried by the editor.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;

    /// Cheap reachability probe.
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Collects messages instead of delivering them. Clones share one outbox,
/// so a test can keep a handle while the editor owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email sent so far.
    pub async fn outbox(&self) -> Vec<Email> {
        self.outbox.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.outbox.lock().await.len()
    }

    pub async fn last_sent(&self) -> Option<Email> {
        self.outbox.lock().await.last().cloned()
    }

    /// Whether any mail went to `address` (to, cc or bcc).
    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.outbox
            .lock()
            .await
            .iter()
            .any(|email| email.recipients().any(|a| a.email == address))
    }

    pub async fn clear(&self) {
        self.outbox.lock().await.clear();
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, email: &Email) -> Result<()> {
        email.validate()?;

        debug!(
            recipients = email.recipients().count(),
            subject = email.subject.as_deref().unwrap_or_default(),
            "captured outgoing mail"
        );

        self.outbox.lock().await.push(email.clone());
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpSecurity, SmtpTransport};

#[cfg(feature = "smtp")]
mod smtp {
    use async_trait::async_trait;
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
    use serde::Deserialize;
    use std::time::Duration;
    use tracing::{debug, info};

    use super::Transport;
    use crate::{Email, MailError, Result};

    /// How the connection to the relay is secured.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SmtpSecurity {
        /// Plain text, for local relays and test servers.
        None,
        #[default]
        StartTls,
        /// TLS from the first byte.
        Tls,
    }

    impl SmtpSecurity {
        pub fn default_port(&self) -> u16 {
            match self {
                SmtpSecurity::None => 25,
                SmtpSecurity::StartTls => 587,
                SmtpSecurity::Tls => 465,
            }
        }
    }

    fn default_timeout_secs() -> u64 {
        30
    }

    /// Relay settings, usually deserialized next to the editor settings.
    ///
    /// ```toml
    /// host = "smtp.example.com"
    /// security = "starttls"
    /// username = "mailer"
    /// password = "secret"
    /// ```
    #[derive(Debug, Clone, Deserialize)]
    pub struct SmtpConfig {
        pub host: String,
        /// Defaults to the port of `security`.
        #[serde(default)]
        pub port: Option<u16>,
        #[serde(default)]
        pub security: SmtpSecurity,
        #[serde(default)]
        pub username: Option<String>,
        #[serde(default)]
        pub password: Option<String>,
        #[serde(default = "default_timeout_secs")]
        pub timeout_secs: u64,
    }

    impl SmtpConfig {
        pub fn new(host: impl Into<String>) -> Self {
            Self {
                host: host.into(),
                port: None,
                security: SmtpSecurity::default(),
                username: None,
                password: None,
                timeout_secs: default_timeout_secs(),
            }
        }

        pub fn security(mut self, security: SmtpSecurity) -> Self {
            self.security = security;
            self
        }

        pub fn port(mut self, port: u16) -> Self {
            self.port = Some(port);
            self
        }

        pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
            self.username = Some(username.into());
            self.password = Some(password.into());
            self
        }

        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout_secs = timeout.as_secs();
            self
        }

        /// The configured port, or the default for the security mode.
        pub fn effective_port(&self) -> u16 {
            self.port.unwrap_or_else(|| self.security.default_port())
        }
    }

    /// Delivers through an SMTP relay.
    pub struct SmtpTransport {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        config: SmtpConfig,
    }

    impl SmtpTransport {
        pub fn new(config: SmtpConfig) -> Result<Self> {
            let host = config.host.as_str();
            let builder = match config.security {
                SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
                SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
                SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            }
            .port(config.effective_port())
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

            let builder = match (&config.username, &config.password) {
                (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
                _ => builder,
            };

            info!(
                host = %config.host,
                port = config.effective_port(),
                security = ?config.security,
                "relay configured"
            );

            Ok(Self {
                mailer: builder.build(),
                config,
            })
        }

        pub fn config(&self) -> &SmtpConfig {
            &self.config
        }

        /// Open a connection and issue `NOOP`.
        pub async fn test_connection(&self) -> Result<bool> {
            Ok(self.mailer.test_connection().await?)
        }
    }

    #[async_trait]
    impl Transport for SmtpTransport {
        async fn send(&self, email: &Email) -> Result<()> {
            let message = email.to_lettre()?;

            debug!(
                host = %self.config.host,
                recipients = email.recipients().count(),
                inline = email.inline_attachments().count(),
                "handing message to relay"
            );

            let response = self.mailer.send(message).await?;
            if !response.is_positive() {
                return Err(MailError::Smtp(format!("relay answered {}", response.code())));
            }
            Ok(())
        }

        async fn is_healthy(&self) -> bool {
            self.test_connection().await.unwrap_or(false)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_port_follows_security() {
            let config = SmtpConfig::new("smtp.example.com");
            assert_eq!(config.effective_port(), 587);

            let config = config.security(SmtpSecurity::Tls);
            assert_eq!(config.effective_port(), 465);

            let config = config.port(2525);
            assert_eq!(config.effective_port(), 2525);
        }

        #[test]
        fn test_deserialize_config() {
            let config: SmtpConfig = serde_json::from_value(serde_json::json!({
                "host": "localhost",
                "security": "none",
                "username": "mailer",
                "password": "secret"
            }))
            .unwrap();

            assert_eq!(config.security, SmtpSecurity::None);
            assert_eq!(config.effective_port(), 25);
            assert_eq!(config.timeout_secs, 30);
            assert_eq!(config.username.as_deref(), Some("mailer"));
        }

        #[tokio::test]
        async fn test_build_plain_transport() {
            let config = SmtpConfig::new("localhost").security(SmtpSecurity::None).port(1025);
            let transport = SmtpTransport::new(config).unwrap();
            assert_eq!(transport.config().effective_port(), 1025);
        }
    }
}
