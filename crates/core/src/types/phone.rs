//! Ten-digit phone number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// After removing separators the number is not ten digits.
    #[error("phone must have exactly 10 digits")]
    InvalidDigits,
}

/// A ten-digit phone number.
///
/// Spaces, dashes and parentheses are accepted as separators and stripped,
/// so `(555) 234-5678` and `5552345678` are the same number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in a valid phone number.
    pub const DIGITS: usize = 10;

    /// Parse a phone number, keeping only its digits.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::InvalidDigits`] if anything other than separators
    /// and exactly ten digits remains.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();

        if cleaned.len() == Self::DIGITS && cleaned.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(cleaned))
        } else {
            Err(PhoneError::InvalidDigits)
        }
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
