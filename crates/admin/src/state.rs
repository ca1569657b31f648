//! Back-office state: the storefront state plus admin configuration.

use std::sync::Arc;

use tracing::info;

use ferreteria_storefront::db::{RepositoryError, Store};
use ferreteria_storefront::AppState;

use crate::config::AdminConfig;
use crate::error::Result;
use crate::services::{BackupService, ClientService, InvoiceService, ReportService, SupplierService};

/// Back-office state shared by every command.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone, Debug)]
pub struct AdminState {
    inner: Arc<AdminStateInner>,
}

#[derive(Debug)]
struct AdminStateInner {
    app: AppState,
    config: AdminConfig,
}

impl AdminState {
    /// Open the file-backed store named by the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the data directory cannot be created.
    pub fn open(config: AdminConfig) -> std::result::Result<Self, RepositoryError> {
        let app = AppState::open(config.storefront.clone())?;
        Ok(Self::from_parts(app, config))
    }

    /// Use an existing store.
    #[must_use]
    pub fn with_store(config: AdminConfig, store: Store) -> Self {
        let app = AppState::with_store(config.storefront.clone(), store);
        Self::from_parts(app, config)
    }

    fn from_parts(app: AppState, config: AdminConfig) -> Self {
        Self {
            inner: Arc::new(AdminStateInner { app, config }),
        }
    }

    /// The storefront state sharing this store.
    #[must_use]
    pub fn app(&self) -> &AppState {
        &self.inner.app
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        self.inner.app.store()
    }

    #[must_use]
    pub fn clients(&self) -> ClientService<'_> {
        ClientService::new(self.store())
    }

    #[must_use]
    pub fn invoices(&self) -> InvoiceService<'_> {
        InvoiceService::new(self.store(), &self.inner.config.issuer)
    }

    #[must_use]
    pub fn suppliers(&self) -> SupplierService<'_> {
        SupplierService::new(self.store())
    }

    #[must_use]
    pub fn reports(&self) -> ReportService<'_> {
        ReportService::new(self.store(), self.inner.config.commission_rate)
    }

    #[must_use]
    pub fn backup(&self) -> BackupService<'_> {
        BackupService::new(self.store())
    }

    /// Seed the storefront defaults, then clients, sample orders and
    /// suppliers where missing.
    ///
    /// # Errors
    ///
    /// Returns `AdminError` if the store fails.
    pub fn seed(&self) -> Result<()> {
        self.app().seed()?;
        let clients = self.clients().seed_defaults()?;
        let suppliers = self.suppliers().seed_defaults()?;
        info!(clients, suppliers, "Seeded back office");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn state() -> AdminState {
        let vars: HashMap<&str, &str> = HashMap::new();
        let config = AdminConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        AdminState::with_store(config, Store::in_memory())
    }

    #[test]
    fn test_seed_everything() {
        let state = state();
        state.seed().unwrap();
        state.seed().unwrap();

        assert_eq!(state.clients().list().unwrap().len(), 3);
        assert_eq!(state.suppliers().list().unwrap().len(), 5);
        assert_eq!(state.app().orders().list().unwrap().len(), 2);
        assert!(!state.app().catalog().list().unwrap().is_empty());
    }

    #[test]
    fn test_services_share_the_store() {
        let state = state();
        state.seed().unwrap();
        let bundle = state.backup().export().unwrap();
        assert_eq!(bundle.orders.unwrap().len(), state.app().orders().list().unwrap().len());
    }
}
