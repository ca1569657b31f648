//! Invoice repository.
//!
//! Invoices are only appended by `InvoiceService`, inside the transaction
//! that also takes the folio and marks the order invoiced.

use uuid::Uuid;

use ferreteria_core::InvoiceId;
use ferreteria_storefront::db::{RepositoryError, Store, keys};

use crate::models::Invoice;

/// Repository for the `facturas` document.
pub struct InvoiceRepository<'a> {
    store: &'a Store,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All invoices in issue order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Invoice>, RepositoryError> {
        self.store.load(keys::INVOICES)
    }

    /// Get an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|i| i.id == id))
    }

    /// Get an invoice by fiscal UUID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn by_uuid(&self, uuid: Uuid) -> Result<Option<Invoice>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|i| i.uuid == uuid))
    }

    /// Modify an invoice found by UUID and return the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no invoice has the UUID.
    pub fn modify_by_uuid<F>(&self, uuid: Uuid, f: F) -> Result<Invoice, RepositoryError>
    where
        F: FnOnce(&mut Invoice),
    {
        self.store.update(keys::INVOICES, |invoices: &mut Vec<Invoice>| {
            let invoice = invoices
                .iter_mut()
                .find(|i| i.uuid == uuid)
                .ok_or(RepositoryError::NotFound)?;
            f(invoice);
            Ok(invoice.clone())
        })
    }

    /// Replace every invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn replace_all(&self, invoices: &[Invoice]) -> Result<(), RepositoryError> {
        self.store.save(keys::INVOICES, invoices)
    }
}
