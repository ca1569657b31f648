//! Domain models for the back office.
//!
//! Serialized in camelCase; the Spanish field names of older data are
//! accepted as aliases.

pub mod client;
pub mod invoice;
pub mod supplier;

pub use client::{Client, ClientPatch, ClientStats, CommercialTerms, FiscalData, NewClient, RegistrySummary};
pub use invoice::Invoice;
pub use supplier::{NewSupplier, Supplier};
