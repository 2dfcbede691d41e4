// Checks run on merged settings before they are handed out

use crate::{ConfigError, Result};

/// Implemented by anything [`ConfigManager::load_validated`](crate::ConfigManager::load_validated) can produce.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field-level checks shared by the settings types.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// `http://` or `https://` followed by a host.
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        let host = value
            .strip_prefix("http://")
            .or_else(|| value.strip_prefix("https://"));
        match host {
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{} must be a valid http(s) URL",
                field
            ))),
        }
    }

    /// Asset prefixes may also be root-relative.
    pub fn is_url_prefix(value: &str, field: &str) -> Result<()> {
        if value.starts_with('/') {
            return Ok(());
        }
        Self::is_url(value, field).map_err(|_| {
            ConfigError::ValidationError(format!(
                "{} must start with '/' or be an absolute http(s) URL",
                field
            ))
        })
    }

    /// Loose shape check; `Name <addr>` is accepted.
    pub fn is_email(value: &str, field: &str) -> Result<()> {
        let address = match (value.find('<'), value.rfind('>')) {
            (Some(start), Some(end)) if start < end => &value[start + 1..end],
            _ => value,
        };
        match address.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{} must be a valid email",
                field
            ))),
        }
    }
}
