//! Repositories for the back-office collections.
//!
//! The back office shares the storefront [`Store`](ferreteria_storefront::Store)
//! and its keys:
//!
//! - `clientes` - CRM clients
//! - `facturas` - Mock invoices
//! - `proveedores` - Suppliers
//! - `contador_facturas` - Invoice folio counter
//!
//! Orders live in the storefront `pedidos` ledger.

pub mod clients;
pub mod invoices;
pub mod suppliers;

pub use clients::ClientRepository;
pub use invoices::InvoiceRepository;
pub use suppliers::SupplierRepository;
