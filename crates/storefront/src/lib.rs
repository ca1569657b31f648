//! Ferretería storefront library.
//!
//! The key-value store, the domain models and the storefront services
//! (session, catalog, cart, checkout, orders). The back office and the CLI
//! build on top of it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use config::StorefrontConfig;
pub use db::{KeyValueStore, RepositoryError, Store};
pub use error::{AppError, Result};
pub use state::AppState;
