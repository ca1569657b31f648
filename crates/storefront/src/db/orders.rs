//! Order ledger repository.

use ferreteria_core::OrderId;
use serde_json::Value;
use tracing::warn;

use super::{RepositoryError, Store, keys};
use crate::models::{Order, Purchase};

/// Repository for the order ledger document.
pub struct OrderRepository<'a> {
    store: &'a Store,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All orders in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        self.store.load(keys::ORDERS)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|o| o.id == id))
    }

    /// Apply `f` to one order and persist the ledger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has the id.
    pub fn modify<F>(&self, id: OrderId, f: F) -> Result<Order, RepositoryError>
    where
        F: FnOnce(&mut Order),
    {
        self.store.update(keys::ORDERS, |orders: &mut Vec<Order>| {
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(RepositoryError::NotFound)?;
            f(order);
            Ok(order.clone())
        })
    }

    /// Remove an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has the id.
    pub fn delete(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.store.update(keys::ORDERS, |orders: &mut Vec<Order>| {
            let index = orders
                .iter()
                .position(|o| o.id == id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(orders.remove(index))
        })
    }

    /// Records of the read-only purchase history.
    ///
    /// Records are decoded one at a time; one that does not decode is
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn purchases(&self) -> Result<Vec<Purchase>, RepositoryError> {
        let raw: Vec<Value> = self.store.load(keys::PURCHASES)?;
        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                serde_json::from_value(value)
                    .inspect_err(|e| warn!(index, error = %e, "Skipping unreadable purchase record"))
                    .ok()
            })
            .collect())
    }

    /// Replace the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn replace_all(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        self.store.save(keys::ORDERS, orders)
    }
}
