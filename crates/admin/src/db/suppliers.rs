//! Supplier repository.

use ferreteria_core::SupplierId;
use ferreteria_storefront::db::{RepositoryError, Store, keys};

use crate::models::Supplier;

/// Repository for the `proveedores` document.
pub struct SupplierRepository<'a> {
    store: &'a Store,
}

impl<'a> SupplierRepository<'a> {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All suppliers in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        self.store.load(keys::SUPPLIERS)
    }

    /// Whether the supplier document has ever been written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn exists(&self) -> Result<bool, RepositoryError> {
        self.store.contains(keys::SUPPLIERS)
    }

    /// Replace every supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn replace_all(&self, suppliers: &[Supplier]) -> Result<(), RepositoryError> {
        self.store.save(keys::SUPPLIERS, suppliers)
    }

    /// Append a supplier with the next id (`max + 1`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn insert_with<F>(&self, build: F) -> Result<Supplier, RepositoryError>
    where
        F: FnOnce(SupplierId) -> Supplier,
    {
        self.store.update(keys::SUPPLIERS, |suppliers: &mut Vec<Supplier>| {
            let next = suppliers.iter().filter_map(|s| s.id.as_i64()).max().unwrap_or(0) + 1;
            let supplier = build(SupplierId::new(next));
            suppliers.push(supplier.clone());
            Ok(supplier)
        })
    }

    /// Replace a supplier in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no supplier has the id.
    pub fn replace(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        self.store.update(keys::SUPPLIERS, |suppliers: &mut Vec<Supplier>| {
            let slot = suppliers
                .iter_mut()
                .find(|s| s.id == supplier.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = supplier.clone();
            Ok(())
        })
    }

    /// Remove a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no supplier has the id.
    pub fn delete(&self, id: SupplierId) -> Result<Supplier, RepositoryError> {
        self.store.update(keys::SUPPLIERS, |suppliers: &mut Vec<Supplier>| {
            let index = suppliers
                .iter()
                .position(|s| s.id == id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(suppliers.remove(index))
        })
    }
}
