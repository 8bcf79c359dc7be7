//! Customer phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::validate_phone;

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input does not match the phone grammar.
    #[error("invalid phone format: {0}")]
    InvalidFormat(String),
}

/// A phone number that matched the phone grammar.
///
/// Phones are optional on a customer, so parsing goes through
/// [`Phone::parse_optional`]: blank input means "no phone", anything else must
/// satisfy [`validate_phone`].
///
/// ```
/// use crm_core::Phone;
///
/// assert_eq!(Phone::parse_optional(Some("  ")).unwrap(), None);
/// assert!(Phone::parse_optional(Some("+1 (555) 123-4567")).unwrap().is_some());
/// assert!(Phone::parse_optional(Some("12345")).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse an optional phone, treating blank input as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::InvalidFormat`] if a non-blank input does not
    /// match the phone grammar.
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>, PhoneError> {
        let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        if !validate_phone(Some(raw)) {
            return Err(PhoneError::InvalidFormat(raw.to_owned()));
        }

        Ok(Some(Self(raw.to_owned())))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
