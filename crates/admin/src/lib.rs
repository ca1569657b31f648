//! Ferretería back office library.
//!
//! Client registry, invoices, suppliers, reports and backups on top of the
//! storefront store and order ledger. Every mutation takes the caller's
//! [`Role`](ferreteria_core::Role) and requires an admin.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use config::AdminConfig;
pub use error::{AdminError, Result};
pub use state::AdminState;
