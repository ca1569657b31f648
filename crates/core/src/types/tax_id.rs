//! Mexican taxpayer id (RFC).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// The input length is outside the 12-13 character range.
    #[error("RFC must be 12 or 13 characters (got {0})")]
    Length(usize),
    /// The input does not follow the letters/date/check-digits layout.
    #[error("RFC has an invalid format")]
    Format,
}

/// A taxpayer id in RFC layout.
///
/// - Individuals (`persona física`): 4 letters, 6 digits, 3 alphanumerics.
/// - Companies (`persona moral`): 3 letters, 6 digits, 3 alphanumerics.
///
/// Letters include `&` and `Ñ`. Input is trimmed and upper-cased. Only the
/// layout is checked; the embedded date and check digits are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Parse and normalize an RFC.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::Length`] or [`TaxIdError::Format`].
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let normalized = s.trim().to_uppercase();
        let chars: Vec<char> = normalized.chars().collect();

        let prefix_len = match chars.len() {
            13 => 4,
            12 => 3,
            other => return Err(TaxIdError::Length(other)),
        };

        let (prefix, rest) = chars.split_at(prefix_len);
        let (date, check) = rest.split_at(6);

        let letters_ok = prefix
            .iter()
            .all(|c| c.is_ascii_uppercase() || *c == '&' || *c == 'Ñ');
        let date_ok = date.iter().all(char::is_ascii_digit);
        let check_ok = check
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if letters_ok && date_ok && check_ok {
            Ok(Self(normalized))
        } else {
            Err(TaxIdError::Format)
        }
    }

    /// Whether this RFC belongs to an individual (13 characters).
    #[must_use]
    pub fn is_individual(&self) -> bool {
        self.0.chars().count() == 13
    }

    /// Returns the RFC as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_individual() {
        let rfc = TaxId::parse("pegj850415hdf").unwrap();
        assert_eq!(rfc.as_str(), "PEGJ850415HDF");
        assert!(rfc.is_individual());
    }

    #[test]
    fn test_company() {
        let rfc = TaxId::parse(" CAB070815ABC ").unwrap();
        assert!(!rfc.is_individual());
        assert!(TaxId::parse("FER123456789").is_ok());
    }

    #[test]
    fn test_enye_and_ampersand() {
        assert!(TaxId::parse("ÑA&B850415HD1").is_ok());
    }

    #[test]
    fn test_bad_length() {
        assert_eq!(TaxId::parse("ABC"), Err(TaxIdError::Length(3)));
        assert_eq!(TaxId::parse(""), Err(TaxIdError::Length(0)));
    }

    #[test]
    fn test_bad_format() {
        assert_eq!(TaxId::parse("PEGJ85X415HDF"), Err(TaxIdError::Format));
        assert_eq!(TaxId::parse("1EGJ850415HDF"), Err(TaxIdError::Format));
        assert_eq!(TaxId::parse("PEGJ850415HD-"), Err(TaxIdError::Format));
    }
}
