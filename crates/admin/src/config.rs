//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Everything read by [`StorefrontConfig`], plus:
//!
//! - `FERRETERIA_ISSUER_RFC` - RFC printed on invoices as the issuer (default: FER123456789)
//! - `FERRETERIA_ISSUER_NAME` - Issuer legal name (default: Ferretería Rodriguez y Asociados S.A. de C.V.)
//! - `FERRETERIA_COMMISSION_RATE` - Seller commission as a fraction in `[0, 1]` (default: 0.03)

use rust_decimal::Decimal;

use ferreteria_core::TaxId;
use ferreteria_storefront::config::{get_env_or_default, parse_rate};
use ferreteria_storefront::StorefrontConfig;

pub use ferreteria_storefront::config::ConfigError;

/// Default issuer RFC.
pub const DEFAULT_ISSUER_RFC: &str = "FER123456789";

/// Default issuer legal name.
pub const DEFAULT_ISSUER_NAME: &str = "Ferretería Rodriguez y Asociados S.A. de C.V.";

/// Back-office configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Shared store and storefront settings
    pub storefront: StorefrontConfig,
    /// Invoice issuer
    pub issuer: IssuerConfig,
    /// Seller commission on completed sales
    pub commission_rate: Decimal,
}

/// The business that issues invoices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    pub rfc: TaxId,
    pub name: String,
}

impl AdminConfig {
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
    /// Same as [`AdminConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storefront = StorefrontConfig::from_lookup(&lookup)?;

        let rfc = get_env_or_default(&lookup, "FERRETERIA_ISSUER_RFC", DEFAULT_ISSUER_RFC);
        let rfc = TaxId::parse(&rfc).map_err(|e| {
            ConfigError::InvalidEnvVar("FERRETERIA_ISSUER_RFC".to_string(), e.to_string())
        })?;
        let name = get_env_or_default(&lookup, "FERRETERIA_ISSUER_NAME", DEFAULT_ISSUER_NAME);

        let commission_rate = parse_rate(&lookup, "FERRETERIA_COMMISSION_RATE", "0.03")?;

        Ok(Self {
            storefront,
            issuer: IssuerConfig { rfc, name },
            commission_rate,
        })
    }
}
