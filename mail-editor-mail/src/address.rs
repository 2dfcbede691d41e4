//! Sender and recipient mailboxes.

use std::fmt;

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::{MailError, Result};

/// An e-mail address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub email: String,
    pub name: Option<String>,
}

impl Address {
    /// Bare address, checked against RFC 5321 `local@domain` syntax.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let checked: lettre::Address = email
            .trim()
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{:?}: {}", email, e)))?;

        Ok(Self {
            email: checked.to_string(),
            name: None,
        })
    }

    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Some(name.into()),
            ..Self::new(email)?
        })
    }

    /// Parse `Jane Doe <jane@example.com>`, `"Doe, Jane" <jane@example.com>`
    /// or a bare address.
    pub fn parse(s: &str) -> Result<Self> {
        let mailbox: Mailbox = s
            .trim()
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{:?}: {}", s, e)))?;
        Ok(mailbox.into())
    }

    /// Parse a comma separated recipient field, ignoring empty entries.
    ///
    /// Display names containing commas must be quoted.
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        split_recipients(s).into_iter().map(Self::parse).collect()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn to_mailbox(&self) -> Result<Mailbox> {
        Ok(Mailbox::new(self.name.clone(), self.email.parse()?))
    }
}

fn split_recipients(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

impl From<Mailbox> for Address {
    fn from(mailbox: Mailbox) -> Self {
        Self {
            email: mailbox.email.to_string(),
            name: mailbox.name.filter(|n| !n.is_empty()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

impl TryFrom<&str> for Address {
    type Error = MailError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Anything usable where an [`Address`] is expected.
pub trait IntoAddress {
    fn into_address(self) -> Result<Address>;
}

impl IntoAddress for Address {
    fn into_address(self) -> Result<Address> {
        Ok(self)
    }
}

impl IntoAddress for &Address {
    fn into_address(self) -> Result<Address> {
        Ok(self.clone())
    }
}

impl IntoAddress for &str {
    fn into_address(self) -> Result<Address> {
        Address::parse(self)
    }
}

impl IntoAddress for String {
    fn into_address(self) -> Result<Address> {
        Address::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        let bare = Address::parse(" jane@example.com ").unwrap();
        assert_eq!(bare.email(), "jane@example.com");
        assert!(bare.name().is_none());

        let named = Address::parse("Jane Doe <jane@example.com>").unwrap();
        assert_eq!(named.name(), Some("Jane Doe"));

        let quoted = Address::parse("\"Doe, Jane\" <jane@example.com>").unwrap();
        assert_eq!(quoted.name(), Some("Doe, Jane"));
        assert_eq!(quoted.email(), "jane@example.com");
    }

    #[test]
    fn test_parse_list() {
        let list = Address::parse_list("a@example.com, \"Doe, B\" <b@example.com>,").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name(), Some("Doe, B"));

        assert!(Address::parse_list("  ").unwrap().is_empty());
        assert!(Address::parse_list("a@example.com, nope").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let addr = Address::with_name("jane@example.com", "Jane").unwrap();
        assert_eq!(addr.to_string(), "Jane <jane@example.com>");
        assert_eq!(Address::parse(&addr.to_string()).unwrap(), addr);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "invalid", "@example.com", "jane@", "a@b@example.com"] {
            assert!(Address::new(bad).is_err(), "{bad:?} accepted");
        }
    }
}
