//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `session` - Account registration, login and role resolution
//! - `catalog` - Product browsing and admin edits
//! - `cart` - Per-namespace cart ledger with change notifications
//! - `checkout` - Discount policy, totals and checkout validation
//! - `orders` - Order ledger with stock reservation

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod session;
