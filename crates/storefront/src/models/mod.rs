//! Domain models for the storefront.
//!
//! Field names serialize in camelCase. The Spanish names written by older
//! builds of the app (`nombre`, `precio`, `cantidad`, ...) are accepted as
//! aliases when reading.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartLine};
pub use order::{CustomerRef, Order, OrderDraft, OrderLine, Purchase};
pub use product::{NewProduct, Product};
pub use user::{Account, SessionRecord};
