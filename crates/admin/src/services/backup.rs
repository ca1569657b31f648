//! Export, import and backup of the back-office collections.
//!
//! A backup is a pretty-printed JSON document:
//!
//! ```json
//! { "timestamp": "...", "version": "1.0", "data": { "clientes": [], "pedidos": [], "facturas": [] } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use ferreteria_core::Role;
use ferreteria_storefront::AppError;
use ferreteria_storefront::db::{OrderRepository, Store, keys};
use ferreteria_storefront::models::Order;
use ferreteria_storefront::services::session::require_admin;

use crate::db::{ClientRepository, InvoiceRepository};
use crate::error::{AdminError, Result};
use crate::models::{Client, Invoice};

/// Format version written into exports and backups.
pub const BACKUP_VERSION: &str = "1.0";

/// Keys removed by [`BackupService::clear`].
const CLEARED_KEYS: [&str; 5] = [
    keys::CLIENTS,
    keys::ORDERS,
    keys::INVOICES,
    keys::ORDER_COUNTER,
    keys::INVOICE_COUNTER,
];

/// The exported collections. Absent collections are left alone on import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBundle {
    #[serde(rename = "clientes", default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<Client>>,
    #[serde(rename = "pedidos", default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
    #[serde(rename = "facturas", default, skip_serializing_if = "Option::is_none")]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(
        rename = "exportedAt",
        alias = "fechaExportacion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A backup document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: DataBundle,
}

/// How many records each imported collection received. `None` means the
/// collection was not in the bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub clients: Option<usize>,
    pub orders: Option<usize>,
    pub invoices: Option<usize>,
}

/// Backup service.
pub struct BackupService<'a> {
    store: &'a Store,
}

impl<'a> BackupService<'a> {
    /// Create a new backup service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Snapshot clients, orders and invoices.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn export(&self) -> Result<DataBundle> {
        Ok(DataBundle {
            clients: Some(ClientRepository::new(self.store).list()?),
            orders: Some(OrderRepository::new(self.store).list()?),
            invoices: Some(InvoiceRepository::new(self.store).list()?),
            exported_at: Some(Utc::now()),
            version: Some(BACKUP_VERSION.to_string()),
        })
    }

    /// Replace the collections present in `bundle`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::Database` if the store fails.
    #[instrument(skip(self, bundle))]
    pub fn import(&self, role: Role, bundle: &DataBundle) -> Result<ImportSummary> {
        require_admin(role).map_err(AppError::from)?;
        let summary = self.store.transaction(|tx| {
            let mut summary = ImportSummary::default();
            if let Some(clients) = &bundle.clients {
                tx.save(keys::CLIENTS, clients)?;
                summary.clients = Some(clients.len());
            }
            if let Some(orders) = &bundle.orders {
                tx.save(keys::ORDERS, orders)?;
                summary.orders = Some(orders.len());
            }
            if let Some(invoices) = &bundle.invoices {
                tx.save(keys::INVOICES, invoices)?;
                summary.invoices = Some(invoices.len());
            }
            Ok::<_, AdminError>(summary)
        })?;
        info!(?summary, "Imported data");
        Ok(summary)
    }

    /// Export wrapped with a timestamp and version, as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails and
    /// `AdminError::Serialization` if encoding fails.
    pub fn create_backup(&self) -> Result<String> {
        let backup = Backup {
            timestamp: Utc::now(),
            version: BACKUP_VERSION.to_string(),
            data: self.export()?,
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Import the data of a backup document.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidBackup` if `text` is not JSON, lacks
    /// `data` or `timestamp`, or holds records that do not parse.
    #[instrument(skip(self, text))]
    pub fn restore_backup(&self, role: Role, text: &str) -> Result<ImportSummary> {
        let document: Value = serde_json::from_str(text).map_err(|e| invalid(&e.to_string()))?;
        let present = |field: &str| document.get(field).is_some_and(|v| !v.is_null());
        if !present("data") || !present("timestamp") {
            return Err(invalid("missing data or timestamp"));
        }
        let backup: Backup =
            serde_json::from_value(document).map_err(|e| invalid(&e.to_string()))?;
        info!(timestamp = %backup.timestamp, version = %backup.version, "Restoring backup");
        self.import(role, &backup.data)
    }

    /// Remove clients, orders, invoices and both folio counters.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::Database` if the store fails.
    #[instrument(skip(self))]
    pub fn clear(&self, role: Role) -> Result<()> {
        require_admin(role).map_err(AppError::from)?;
        self.store.transaction(|tx| {
            for key in CLEARED_KEYS {
                tx.remove(key);
            }
            Ok::<_, AdminError>(())
        })?;
        warn!("Cleared back-office data");
        Ok(())
    }
}

fn invalid(reason: &str) -> AdminError {
    warn!(reason, "Rejected backup");
    AdminError::InvalidBackup(reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::services::clients::ClientService;

    use super::*;

    fn seeded() -> Store {
        let store = Store::in_memory();
        ClientService::new(&store).seed_defaults().unwrap();
        store
    }

    #[test]
    fn test_export_counts() {
        let store = seeded();
        let bundle = BackupService::new(&store).export().unwrap();
        assert_eq!(bundle.clients.as_ref().unwrap().len(), 3);
        assert_eq!(bundle.orders.as_ref().unwrap().len(), 2);
        assert!(bundle.invoices.as_ref().unwrap().is_empty());
        assert_eq!(bundle.version.as_deref(), Some(BACKUP_VERSION));

        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json.get("clientes").is_some());
        assert!(json.get("exportedAt").is_some());
    }

    #[test]
    fn test_import_replaces_only_present_collections() {
        let store = seeded();
        let service = BackupService::new(&store);
        let bundle = DataBundle {
            clients: Some(Vec::new()),
            ..DataBundle::default()
        };

        let summary = service.import(Role::Admin, &bundle).unwrap();
        assert_eq!(summary.clients, Some(0));
        assert_eq!(summary.orders, None);

        let after = service.export().unwrap();
        assert!(after.clients.unwrap().is_empty());
        assert_eq!(after.orders.unwrap().len(), 2);
    }

    #[test]
    fn test_backup_restore() {
        let source = seeded();
        let text = BackupService::new(&source).create_backup().unwrap();
        assert!(text.contains("\n  \"timestamp\""));

        let target = Store::in_memory();
        let summary = BackupService::new(&target)
            .restore_backup(Role::Admin, &text)
            .unwrap();
        assert_eq!(summary.clients, Some(3));
        assert_eq!(summary.orders, Some(2));
        assert_eq!(summary.invoices, Some(0));
        assert_eq!(ClientRepository::new(&target).list().unwrap().len(), 3);
    }

    #[test]
    fn test_restore_rejects_incomplete_documents() {
        let store = Store::in_memory();
        let service = BackupService::new(&store);
        for text in [
            "not json",
            r#"{"version": "1.0", "data": {}}"#,
            r#"{"timestamp": "2026-01-01T00:00:00Z", "version": "1.0"}"#,
            r#"{"timestamp": "2026-01-01T00:00:00Z", "version": "1.0", "data": null}"#,
        ] {
            assert!(
                matches!(
                    service.restore_backup(Role::Admin, text),
                    Err(AdminError::InvalidBackup(_))
                ),
                "{text}"
            );
        }
        assert!(!store.contains(keys::CLIENTS).unwrap());
    }

    #[test]
    fn test_clear() {
        let store = seeded();
        let service = BackupService::new(&store);
        assert!(matches!(
            service.clear(Role::User),
            Err(AdminError::Storefront(_))
        ));
        service.clear(Role::Admin).unwrap();
        for key in CLEARED_KEYS {
            assert!(!store.contains(key).unwrap(), "{key}");
        }
    }
}
