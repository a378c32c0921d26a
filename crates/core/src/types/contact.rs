//! Customer contact fields: email, phone number, shipping address.
//!
//! Checkout accepts phone and address as free text; the only rule is that
//! they are not blank. Emails get a light structural check at registration.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors from parsing a non-empty contact field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactFieldError {
    /// The field was empty or whitespace only.
    #[error("{field} is required")]
    Missing {
        /// Human-readable field name.
        field: &'static str,
    },
}

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is not of the form `local@domain`.
    #[error("email must look like name@domain")]
    Malformed,
}

fn non_empty(field: &'static str, raw: &str) -> Result<String, ContactFieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContactFieldError::Missing { field });
    }
    Ok(trimmed.to_owned())
}

/// A phone number as typed by the customer (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns `ContactFieldError::Missing` if the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ContactFieldError> {
        non_empty("phone", raw).map(Self)
    }

    /// The phone number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A free-form shipping address (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingAddress(String);

impl ShippingAddress {
    /// Parse a shipping address.
    ///
    /// # Errors
    ///
    /// Returns `ContactFieldError::Missing` if the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ContactFieldError> {
        non_empty("address", raw).map(Self)
    }

    /// The address as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An email address.
///
/// ```
/// use souq_core::Email;
///
/// assert!(Email::parse("amira@example.com").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, normalising surrounding whitespace and case.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or lacks a
    /// non-empty local part and domain around a single `@`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
