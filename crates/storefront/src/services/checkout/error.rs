//! Checkout error types.

use thiserror::Error;

use ferreteria_core::Quantity;

use crate::db::RepositoryError;

/// Errors that can occur while validating or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// No payment method was chosen.
    #[error("payment method is required")]
    MissingPaymentMethod,

    /// The payment method is not accepted at checkout.
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    /// A product is out of stock.
    #[error("{product} is out of stock")]
    OutOfStock {
        /// Product name.
        product: String,
    },

    /// More units requested than are available.
    #[error("insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product name.
        product: String,
        /// Units requested (including any already in the cart).
        requested: u64,
        /// Units on hand.
        available: Quantity,
    },

    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
