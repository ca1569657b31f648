//! Product repository.

use ferreteria_core::ProductId;

use super::{RepositoryError, Store, keys};
use crate::models::Product;

/// Repository for the product catalog document.
pub struct ProductRepository<'a> {
    store: &'a Store,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All products in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.store.load(keys::PRODUCTS)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    /// Whether the catalog document has ever been written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn exists(&self) -> Result<bool, RepositoryError> {
        self.store.contains(keys::PRODUCTS)
    }

    /// Replace the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn replace_all(&self, products: &[Product]) -> Result<(), RepositoryError> {
        self.store.save(keys::PRODUCTS, products)
    }

    /// Append a product with the next id (`max + 1`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn insert_with<F>(&self, build: F) -> Result<Product, RepositoryError>
    where
        F: FnOnce(ProductId) -> Product,
    {
        self.store.update(keys::PRODUCTS, |products: &mut Vec<Product>| {
            let next = products.iter().filter_map(|p| p.id.as_i64()).max().unwrap_or(0) + 1;
            let product = build(ProductId::new(next));
            products.push(product.clone());
            Ok(product)
        })
    }

    /// Replace a product in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the id.
    pub fn replace(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store.update(keys::PRODUCTS, |products: &mut Vec<Product>| {
            let slot = products
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = product.clone();
            Ok(())
        })
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the id.
    pub fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.store.update(keys::PRODUCTS, |products: &mut Vec<Product>| {
            let index = products
                .iter()
                .position(|p| p.id == id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(products.remove(index))
        })
    }
}
