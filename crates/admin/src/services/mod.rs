//! Business logic services for the back office.
//!
//! # Services
//!
//! - `clients` - Client registry, purchase stats and dashboard summary
//! - `invoices` - Mock CFDI invoices issued from orders
//! - `suppliers` - Supplier directory
//! - `reports` - Sales reports, commissions and loyalty tiers
//! - `backup` - Export, import and JSON backups

pub mod backup;
pub mod clients;
pub mod invoices;
pub mod reports;
pub mod suppliers;

pub use backup::{Backup, BackupService, DataBundle, ImportSummary};
pub use clients::ClientService;
pub use invoices::InvoiceService;
pub use reports::{LoyaltyTier, Period, ReportService, SalesReport, loyalty_tier};
pub use suppliers::SupplierService;
