//! Core types for Ferretería.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;
pub mod tax_id;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price, Quantity};
pub use status::*;
pub use tax_id::{TaxId, TaxIdError};
