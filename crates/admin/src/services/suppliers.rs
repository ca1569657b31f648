//! Supplier directory.

use chrono::NaiveDate;
use tracing::{info, instrument};

use ferreteria_core::{Role, SupplierId};
use ferreteria_storefront::db::{RepositoryError, Store};
use ferreteria_storefront::services::session::require_admin;
use ferreteria_storefront::AppError;

use crate::db::SupplierRepository;
use crate::error::{AdminError, Result};
use crate::models::{NewSupplier, Supplier};

/// Supplier service.
pub struct SupplierService<'a> {
    suppliers: SupplierRepository<'a>,
}

impl<'a> SupplierService<'a> {
    /// Create a new supplier service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            suppliers: SupplierRepository::new(store),
        }
    }

    /// All suppliers.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn list(&self) -> Result<Vec<Supplier>> {
        Ok(self.suppliers.list()?)
    }

    /// Add a supplier with id `max + 1`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::Validation` if a field is missing.
    #[instrument(skip(self, input), fields(company = %input.company))]
    pub fn create(&self, role: Role, input: NewSupplier) -> Result<Supplier> {
        require_admin(role).map_err(AppError::from)?;
        input.validate().map_err(AdminError::Validation)?;
        let supplier = self.suppliers.insert_with(|id| input.into_supplier(id))?;
        info!(supplier_id = %supplier.id, "Created supplier");
        Ok(supplier)
    }

    /// Replace a supplier's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins,
    /// `AdminError::Validation` if a field is missing and
    /// `AdminError::NotFound` for an unknown id.
    #[instrument(skip(self, input))]
    pub fn update(&self, role: Role, id: SupplierId, input: NewSupplier) -> Result<Supplier> {
        require_admin(role).map_err(AppError::from)?;
        input.validate().map_err(AdminError::Validation)?;
        let supplier = input.into_supplier(id);
        self.suppliers
            .replace(&supplier)
            .map_err(|e| not_found(e, id))?;
        info!(supplier_id = %id, "Updated supplier");
        Ok(supplier)
    }

    /// Remove a supplier.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn delete(&self, role: Role, id: SupplierId) -> Result<Supplier> {
        require_admin(role).map_err(AppError::from)?;
        let supplier = self.suppliers.delete(id).map_err(|e| not_found(e, id))?;
        info!(supplier_id = %id, "Deleted supplier");
        Ok(supplier)
    }

    /// Suppliers with at least a year of history as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn premium(&self, today: NaiveDate) -> Result<Vec<Supplier>> {
        Ok(self
            .suppliers
            .list()?
            .into_iter()
            .filter(|s| s.is_premium(today))
            .collect())
    }

    /// Write the sample suppliers if the document has never been stored.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn seed_defaults(&self) -> Result<bool> {
        if self.suppliers.exists()? {
            return Ok(false);
        }
        let suppliers = default_suppliers();
        self.suppliers.replace_all(&suppliers)?;
        info!(count = suppliers.len(), "Seeded suppliers");
        Ok(true)
    }
}

fn not_found(err: RepositoryError, id: SupplierId) -> AdminError {
    match err {
        RepositoryError::NotFound => AdminError::NotFound(format!("Supplier {id}")),
        other => other.into(),
    }
}

/// The sample suppliers.
#[must_use]
pub fn default_suppliers() -> Vec<Supplier> {
    let rows: [(&str, &str, &str, &str, (i32, u32, u32)); 5] = [
        (
            "Carlos Mendoza",
            "Herramientas del Norte S.A.",
            "(555) 234-5678",
            "ventas@herramientasnorte.com",
            (2023, 1, 15),
        ),
        (
            "Ana Patricia López",
            "Materiales de Construcción López",
            "(555) 345-6789",
            "contacto@materialeslopez.mx",
            (2022, 8, 22),
        ),
        (
            "Roberto Silva",
            "Tornillería Especializada RSP",
            "(555) 456-7890",
            "pedidos@tornilleriarp.com",
            (2023, 3, 10),
        ),
        (
            "María Elena Ruiz",
            "Pinturas y Acabados Profesionales",
            "(555) 567-8901",
            "info@pinturaspro.mx",
            (2022, 11, 5),
        ),
        (
            "José Luis García",
            "Electricidad Industrial GJL",
            "(555) 678-9012",
            "contacto@electricidadgjl.com",
            (2023, 5, 18),
        ),
    ];

    rows.into_iter()
        .zip(1..)
        .filter_map(|((name, company, phone, email, (y, m, d)), id)| {
            Some(Supplier {
                id: SupplierId::new(id),
                name: name.to_owned(),
                phone: phone.to_owned(),
                company: company.to_owned(),
                email: email.to_owned(),
                since: NaiveDate::from_ymd_opt(y, m, d)?,
            })
        })
        .collect()
}
