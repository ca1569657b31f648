//! Cart line items.

use serde::{Deserialize, Serialize};

use ferreteria_core::{Price, ProductId, Quantity};

use super::Product;

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    #[serde(alias = "nombre")]
    pub name: String,
    /// Unit price.
    #[serde(alias = "precio")]
    pub price: Price,
    #[serde(alias = "cantidad")]
    pub quantity: Quantity,
    /// `price * quantity`, kept in the document for older readers.
    #[serde(default)]
    pub total: Price,
}

impl CartLine {
    /// Create a line and compute its total.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
            total: price.times(quantity),
        }
    }

    /// Line total computed from price and quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Change the quantity and recompute the stored total.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.total = self.line_total();
    }

    /// Whether this line refers to the given item, by id or by name.
    #[must_use]
    pub fn refers_to(&self, id: Option<ProductId>, name: &str) -> bool {
        id.is_some_and(|id| id == self.id) || self.name == name
    }
}

/// An item being added to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Product id. Items without one get a generated id.
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Price,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.clone(),
            price: product.price,
        }
    }
}
