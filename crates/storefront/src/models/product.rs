//! Catalog product.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ferreteria_core::{Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion", default)]
    pub description: String,
    /// Unit price.
    #[serde(alias = "precio")]
    pub price: Price,
    /// Units on hand.
    #[serde(default)]
    pub stock: u32,
    #[serde(alias = "categoria", default)]
    pub category: String,
    /// Supplier name as shown in the catalog.
    #[serde(alias = "proveedor", default)]
    pub supplier: String,
    /// Relative image path.
    #[serde(alias = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Date the product was added.
    #[serde(alias = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<NaiveDate>,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match over name, description, category
    /// and supplier. An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.name, &self.description, &self.category, &self.supplier]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Fields supplied when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub category: String,
    pub supplier: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProduct {
    /// Check required fields, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the invalid field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("supplier", &self.supplier),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        if !self.price.is_positive() {
            return Err("price must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Build a product with the given id.
    #[must_use]
    pub fn into_product(self, id: ProductId, added_on: NaiveDate) -> Product {
        Product {
            id,
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price: self.price,
            stock: self.stock,
            category: self.category.trim().to_owned(),
            supplier: self.supplier.trim().to_owned(),
            image: self.image.filter(|i| !i.trim().is_empty()),
            added_on: Some(added_on),
        }
    }
}
