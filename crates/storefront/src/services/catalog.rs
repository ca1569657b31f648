//! Product catalog.

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument};

use ferreteria_core::{Price, ProductId, Role};

use super::session::require_admin;
use crate::db::{ProductRepository, RepositoryError, Store};
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product};

/// Catalog service: browsing for everyone, edits for admins.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            products: ProductRepository::new(store),
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn list(&self) -> Result<Vec<Product>> {
        Ok(self.products.list()?)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no product has the id.
    pub fn get(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("Product {id}")))
    }

    /// Products whose name, description, category or supplier contains
    /// `query` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn search(&self, query: &str) -> Result<Vec<Product>> {
        Ok(self
            .products
            .list()?
            .into_iter()
            .filter(|p| p.matches(query))
            .collect())
    }

    /// Add a product with id `max + 1`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for non-admins and `AppError::Validation`
    /// for missing fields or a non-positive price.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub fn create(&self, role: Role, input: NewProduct) -> Result<Product> {
        require_admin(role)?;
        input.validate().map_err(AppError::Validation)?;

        let today = Utc::now().date_naive();
        let product = self
            .products
            .insert_with(|id| input.into_product(id, today))?;

        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for non-admins, `AppError::Validation` for
    /// invalid input and `AppError::NotFound` for an unknown id.
    #[instrument(skip(self, input))]
    pub fn update(&self, role: Role, id: ProductId, input: NewProduct) -> Result<Product> {
        require_admin(role)?;
        input.validate().map_err(AppError::Validation)?;

        let existing = self.get(id)?;
        let added_on = existing.added_on.unwrap_or_else(|| Utc::now().date_naive());
        let mut product = input.into_product(id, added_on);
        if product.image.is_none() {
            product.image = existing.image;
        }

        self.products.replace(&product).map_err(|e| not_found(e, id))?;
        info!(product_id = %id, "Updated product");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for non-admins and `AppError::NotFound` for
    /// an unknown id.
    #[instrument(skip(self))]
    pub fn delete(&self, role: Role, id: ProductId) -> Result<Product> {
        require_admin(role)?;
        let product = self.products.delete(id).map_err(|e| not_found(e, id))?;
        info!(product_id = %id, "Deleted product");
        Ok(product)
    }

    /// Write the starter catalog if the catalog has never been stored.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn seed_defaults(&self) -> Result<bool> {
        if self.products.exists()? {
            return Ok(false);
        }
        let products = default_products();
        self.products.replace_all(&products)?;
        info!(count = products.len(), "Seeded catalog");
        Ok(true)
    }
}

fn not_found(err: RepositoryError, id: ProductId) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("Product {id}")),
        other => other.into(),
    }
}

/// The starter catalog.
#[must_use]
pub fn default_products() -> Vec<Product> {
    let added_on = NaiveDate::from_ymd_opt(2025, 7, 1);
    let rows: [(&str, &str, i64, u32, &str, &str); 5] = [
        (
            "Red Bull Energy Drink 250ml",
            "Bebida energética con taurina y cafeína",
            45,
            50,
            "Red Bull Company",
            "assets/images/redbull.jpg",
        ),
        (
            "Monster Energy Original 473ml",
            "Bebida energética con sabor original",
            35,
            30,
            "Monster Beverage",
            "assets/images/Monster Energy.jpg",
        ),
        (
            "Rockstar Energy Drink 500ml",
            "Bebida energética con vitaminas",
            45,
            25,
            "Rockstar Inc",
            "assets/images/Rockstar Energy.jpg",
        ),
        (
            "Monster Ultra Zero 355ml",
            "Bebida energética sin azúcar",
            35,
            40,
            "Monster Beverage",
            "assets/images/Monster Ultra Zero.jpg",
        ),
        (
            "Prime Energy Drink 355ml",
            "Bebida energética de nueva generación",
            20,
            60,
            "Prime Hydration",
            "assets/images/Prime Energy Drink.jpg",
        ),
    ];

    rows.into_iter()
        .zip(1..)
        .map(|((name, description, price, stock, supplier, image), id)| Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::from_units(price),
            stock,
            category: "Bebidas Energéticas".to_owned(),
            supplier: supplier.to_owned(),
            image: Some(image.to_owned()),
            added_on,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::session::AuthError;

    fn input(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "Taladro de 650W con percusión".to_string(),
            price: Price::from_units(1250),
            stock: 10,
            category: "Herramientas".to_string(),
            supplier: "Herramientas del Norte S.A.".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_seed_once() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        assert!(catalog.seed_defaults().unwrap());
        assert_eq!(catalog.list().unwrap().len(), 5);

        catalog.delete(Role::Admin, ProductId::new(1)).unwrap();
        assert!(!catalog.seed_defaults().unwrap());
        assert_eq!(catalog.list().unwrap().len(), 4);
    }

    #[test]
    fn test_create_assigns_next_id() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        catalog.seed_defaults().unwrap();

        let product = catalog.create(Role::Admin, input("Taladro Percutor 13mm")).unwrap();
        assert_eq!(product.id, ProductId::new(6));
        assert!(product.added_on.is_some());
        assert_eq!(catalog.get(ProductId::new(6)).unwrap(), product);
    }

    #[test]
    fn test_create_requires_admin() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        let err = catalog.create(Role::User, input("Taladro")).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::AdminRequired)));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_validates() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        let err = catalog.create(Role::Admin, input("")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_keeps_image_and_date() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        catalog.seed_defaults().unwrap();

        let mut edit = input("Red Bull 355ml");
        edit.price = Price::from_units(55);
        let updated = catalog.update(Role::Admin, ProductId::new(1), edit).unwrap();
        assert_eq!(updated.price, Price::from_units(55));
        assert_eq!(updated.image.as_deref(), Some("assets/images/redbull.jpg"));
        assert_eq!(updated.added_on, NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    #[test]
    fn test_update_and_delete_unknown() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        assert!(matches!(
            catalog.update(Role::Admin, ProductId::new(9), input("x")),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            catalog.delete(Role::Admin, ProductId::new(9)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_search() {
        let store = Store::in_memory();
        let catalog = CatalogService::new(&store);
        catalog.seed_defaults().unwrap();
        assert_eq!(catalog.search("monster").unwrap().len(), 2);
        assert_eq!(catalog.search("PRIME HYDRATION").unwrap().len(), 1);
        assert_eq!(catalog.search("").unwrap().len(), 5);
        assert!(catalog.search("martillo").unwrap().is_empty());
    }
}
