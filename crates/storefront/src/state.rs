//! Application state shared by every front end.

use std::sync::Arc;

use tracing::info;

use crate::config::StorefrontConfig;
use crate::db::{RepositoryError, Store};
use crate::error::Result;
use crate::services::cart::{CartLedger, CartNamespace};
use crate::services::catalog::CatalogService;
use crate::services::orders::OrderService;
use crate::services::session::SessionService;

/// Application state: configuration plus the open store.
///
/// Cheaply cloneable via `Arc`. Services borrow from it and are created per
/// operation.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: StorefrontConfig,
    store: Store,
}

impl AppState {
    /// Open the file-backed store in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the data directory cannot be created.
    pub fn open(config: StorefrontConfig) -> std::result::Result<Self, RepositoryError> {
        let store = Store::open(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), "Opened store");
        Ok(Self::with_store(config, store))
    }

    /// Use an existing store.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: Store) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store())
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store(), self.config().discount)
    }

    #[must_use]
    pub fn session(&self) -> SessionService<'_> {
        SessionService::new(self.store(), &self.inner.config.admin_email)
    }

    /// The cart for whoever is signed in, or the shared guest cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` or `AppError::Auth` if the store fails.
    pub fn cart(&self) -> Result<CartLedger<'_>> {
        let namespace = self
            .session()
            .current_session()?
            .and_then(|s| s.id)
            .map_or(CartNamespace::Global, CartNamespace::User);
        Ok(CartLedger::open(self.store(), namespace)?)
    }

    /// Write the starter catalog and demo accounts where missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` or `AppError::Auth` if the store fails.
    pub fn seed(&self) -> Result<()> {
        let catalog = self.catalog().seed_defaults()?;
        let accounts = self.session().seed_default_accounts()?;
        info!(catalog, accounts, "Seeded defaults");
        Ok(())
    }
}
