//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `FERRETERIA_DATA_DIR` - Directory of the file-backed store (default: `.ferreteria`)
//! - `FERRETERIA_DISCOUNT_THRESHOLD` - Subtotal at which the volume discount starts (default: 500)
//! - `FERRETERIA_DISCOUNT_RATE` - Volume discount as a fraction in `[0, 1]` (default: 0.10)
//! - `FERRETERIA_ADMIN_EMAIL` - The only account allowed to toggle roles (default: admin@ferreteria.com)

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use ferreteria_core::{Email, Price};

use crate::services::checkout::DiscountPolicy;

/// Default admin account email.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@ferreteria.com";

/// Default store directory.
pub const DEFAULT_DATA_DIR: &str = ".ferreteria";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding one JSON document per key
    pub data_dir: PathBuf,
    /// Volume discount applied at checkout
    pub discount: DiscountPolicy,
    /// Account allowed to toggle its own role
    pub admin_email: Email,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is present but
    /// cannot be parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(get_env_or_default(&lookup, "FERRETERIA_DATA_DIR", DEFAULT_DATA_DIR));

        let threshold: Decimal = parse_env(&lookup, "FERRETERIA_DISCOUNT_THRESHOLD", "500")?;
        if threshold.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "FERRETERIA_DISCOUNT_THRESHOLD".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let rate = parse_rate(&lookup, "FERRETERIA_DISCOUNT_RATE", "0.10")?;

        let admin_email = get_env_or_default(&lookup, "FERRETERIA_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL);
        let admin_email = Email::parse(&admin_email).map_err(|e| {
            ConfigError::InvalidEnvVar("FERRETERIA_ADMIN_EMAIL".to_string(), e.to_string())
        })?;

        Ok(Self {
            data_dir,
            discount: DiscountPolicy::new(Price::new(threshold), rate),
            admin_email,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is unset.
pub fn get_required_env<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional variable, treating blank values as unset.
pub fn get_optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
pub fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
pub fn parse_env<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    get_env_or_default(lookup, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a fraction in `[0, 1]`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value does not parse or is
/// out of range.
pub fn parse_rate<F>(lookup: &F, key: &str, default: &str) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rate: Decimal = parse_env(lookup, key, default)?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".ferreteria"));
        assert_eq!(config.discount.threshold(), Price::from_units(500));
        assert_eq!(config.discount.rate(), Decimal::new(10, 2));
        assert_eq!(config.admin_email.as_str(), "admin@ferreteria.com");
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("FERRETERIA_DATA_DIR", "/tmp/store"),
            ("FERRETERIA_DISCOUNT_THRESHOLD", "1000"),
            ("FERRETERIA_DISCOUNT_RATE", "0.15"),
            ("FERRETERIA_ADMIN_EMAIL", "jefe@ferreteria.com"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.discount.threshold(), Price::from_units(1000));
        assert_eq!(config.discount.rate(), Decimal::new(15, 2));
        assert_eq!(config.admin_email.as_str(), "jefe@ferreteria.com");
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("FERRETERIA_DATA_DIR", "  ")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".ferreteria"));
    }

    #[test]
    fn test_rate_out_of_range() {
        let err = StorefrontConfig::from_lookup(lookup(&[("FERRETERIA_DISCOUNT_RATE", "1.5")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "FERRETERIA_DISCOUNT_RATE"));
    }

    #[test]
    fn test_invalid_threshold() {
        let err = StorefrontConfig::from_lookup(lookup(&[(
            "FERRETERIA_DISCOUNT_THRESHOLD",
            "quinientos",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = StorefrontConfig::from_lookup(lookup(&[("FERRETERIA_DISCOUNT_THRESHOLD", "-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_invalid_admin_email() {
        let err = StorefrontConfig::from_lookup(lookup(&[("FERRETERIA_ADMIN_EMAIL", "admin")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_required_env() {
        let vars = lookup(&[("PRESENT", "yes")]);
        assert_eq!(get_required_env(&vars, "PRESENT").unwrap(), "yes");
        assert!(matches!(
            get_required_env(&vars, "ABSENT"),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
