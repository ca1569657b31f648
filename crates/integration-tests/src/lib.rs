//! Shared fixtures for the cross-crate scenario tests.
//!
//! Every test builds its own [`TestContext`] over a fresh store, so tests
//! never share state.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to order, stock and discounts
//! - `session_roles` - Accounts, sign-in and role resolution
//! - `crm_invoices` - Clients, invoices, reports and backups
//! - `cart_properties` - Property tests over cart totals
//! - `file_store` - Persistence across reopening a data directory

use std::collections::HashMap;
use std::path::Path;

use secrecy::SecretString;

use ferreteria_admin::{AdminConfig, AdminState};
use ferreteria_storefront::Store;
use ferreteria_storefront::models::SessionRecord;
use ferreteria_storefront::services::session::AuthError;

/// Demo administrator credentials written by the seed.
pub const ADMIN_EMAIL: &str = "admin@ferreteria.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Demo shopper credentials written by the seed.
pub const USER_EMAIL: &str = "usuario@test.com";
pub const USER_PASSWORD: &str = "user123";

/// Back-office state over an isolated store.
pub struct TestContext {
    pub state: AdminState,
}

impl TestContext {
    /// Empty in-memory store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Store::in_memory(), &[])
    }

    /// In-memory store with the default data seeded.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn seeded() -> Self {
        let ctx = Self::new();
        ctx.state.seed().expect("seed defaults");
        ctx
    }

    /// A store under `dir`, as the CLI would open it.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be opened.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_store(Store::open(dir).expect("open data dir"), &[])
    }

    /// Use `store`, overriding configuration variables with `vars`.
    ///
    /// # Panics
    ///
    /// Panics if `vars` hold an invalid value.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_store(store: Store, vars: &[(&str, &str)]) -> Self {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        let config = AdminConfig::from_lookup(|key| vars.get(key).map(ToString::to_string))
            .expect("valid test configuration");
        Self {
            state: AdminState::with_store(config, store),
        }
    }

    /// Sign in with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if sign-in fails.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
        self.state
            .app()
            .session()
            .login(email, &SecretString::from(password))
    }

    /// Sign in as the demo administrator.
    ///
    /// # Panics
    ///
    /// Panics if the demo accounts were not seeded.
    #[allow(clippy::expect_used)]
    pub fn login_admin(&self) -> SessionRecord {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).expect("admin login")
    }

    /// Sign in as the demo shopper.
    ///
    /// # Panics
    ///
    /// Panics if the demo accounts were not seeded.
    #[allow(clippy::expect_used)]
    pub fn login_user(&self) -> SessionRecord {
        self.login(USER_EMAIL, USER_PASSWORD).expect("user login")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
