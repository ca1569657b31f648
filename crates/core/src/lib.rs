//! Ferretería Core - Shared domain types.
//!
//! This crate provides the types used by every Ferretería component:
//! - `storefront` - Session, catalog, cart, checkout and order ledger
//! - `admin` - Client registry, invoices, suppliers and reports
//! - `cli` - Command-line front end over the persisted store
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! access. Everything here is safe to serialize straight into the key-value
//! store and back.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, tax ids, phones
//!   and the status/role/payment enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
