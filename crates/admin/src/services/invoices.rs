//! Mock invoice generation.

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ferreteria_core::{ClientId, CurrencyCode, InvoiceId, InvoiceStatus, OrderId, OrderStatus, Role};
use ferreteria_storefront::db::{RepositoryError, Store, counters, keys};
use ferreteria_storefront::models::Order;
use ferreteria_storefront::services::session::require_admin;
use ferreteria_storefront::AppError;

use crate::config::IssuerConfig;
use crate::db::{ClientRepository, InvoiceRepository};
use crate::error::{AdminError, Result};
use crate::models::invoice::{self, Invoice};
use crate::models::Client;

/// Invoice service.
pub struct InvoiceService<'a> {
    store: &'a Store,
    issuer: &'a IssuerConfig,
    invoices: InvoiceRepository<'a>,
    clients: ClientRepository<'a>,
}

impl<'a> InvoiceService<'a> {
    /// Create a new invoice service.
    #[must_use]
    pub const fn new(store: &'a Store, issuer: &'a IssuerConfig) -> Self {
        Self {
            store,
            issuer,
            invoices: InvoiceRepository::new(store),
            clients: ClientRepository::new(store),
        }
    }

    /// Invoice an order.
    ///
    /// The order's lines become the concepts. The folio counter, the new
    /// invoice and the order's `invoiced` status are written together.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins,
    /// `AdminError::NotFound` if the order or its client does not exist and
    /// `AdminError::Validation` if the order is cancelled or already
    /// invoiced.
    #[instrument(skip(self))]
    pub fn create_from_order(&self, role: Role, order_id: OrderId) -> Result<Invoice> {
        require_admin(role).map_err(AppError::from)?;

        let invoice = self.store.transaction(|tx| {
            let mut orders: Vec<Order> = tx.load(keys::ORDERS)?;
            let order = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| AdminError::NotFound(format!("Order {order_id}")))?;

            match order.status {
                OrderStatus::Cancelled => {
                    return Err(AdminError::Validation(format!(
                        "order {} is cancelled",
                        order.folio
                    )));
                }
                OrderStatus::Invoiced => {
                    return Err(AdminError::Validation(format!(
                        "order {} is already invoiced",
                        order.folio
                    )));
                }
                _ => {}
            }

            let clients: Vec<Client> = tx.load(keys::CLIENTS)?;
            let client = order
                .client_id
                .and_then(|id| clients.iter().find(|c| c.id == id))
                .ok_or_else(|| {
                    AdminError::NotFound(format!("Client for order {}", order.folio))
                })?;

            let folio = counters::next_in(tx, keys::INVOICE_COUNTER)?;
            let id = counters::next_timestamp_id_in(tx)?;
            let invoice = self.stamp(InvoiceId::new(id), Invoice::folio_for(folio), order, client);

            let now = invoice.issued_at;
            order.status = OrderStatus::Invoiced;
            order.updated_at = Some(now);

            let mut invoices: Vec<Invoice> = tx.load(keys::INVOICES)?;
            invoices.push(invoice.clone());

            tx.save(keys::INVOICES, &invoices)?;
            tx.save(keys::ORDERS, &orders)?;
            Ok(invoice)
        })?;

        info!(
            invoice_id = %invoice.id,
            uuid = %invoice.uuid,
            folio = %invoice.full_folio(),
            order_id = %order_id,
            total = %invoice.total,
            "Created invoice"
        );
        Ok(invoice)
    }

    /// Cancel an invoice.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins,
    /// `AdminError::Validation` for a blank reason and
    /// `AdminError::NotFound` for an unknown UUID.
    #[instrument(skip(self))]
    pub fn cancel(&self, role: Role, uuid: Uuid, reason: &str) -> Result<Invoice> {
        require_admin(role).map_err(AppError::from)?;
        if reason.trim().is_empty() {
            return Err(AdminError::Validation("a cancellation reason is required".to_string()));
        }

        let invoice = self
            .invoices
            .modify_by_uuid(uuid, |invoice| {
                invoice.status = InvoiceStatus::Cancelled;
                invoice.cancelled_at = Some(Utc::now());
                invoice.cancellation_reason = Some(reason.trim().to_string());
            })
            .map_err(|e| match e {
                RepositoryError::NotFound => AdminError::NotFound(format!("Invoice {uuid}")),
                other => other.into(),
            })?;

        warn!(uuid = %uuid, reason, "Cancelled invoice");
        Ok(invoice)
    }

    /// All invoices.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn list(&self) -> Result<Vec<Invoice>> {
        Ok(self.invoices.list()?)
    }

    /// Get an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no invoice has the id.
    pub fn get(&self, id: InvoiceId) -> Result<Invoice> {
        self.invoices
            .get(id)?
            .ok_or_else(|| AdminError::NotFound(format!("Invoice {id}")))
    }

    /// Get an invoice by fiscal UUID.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no invoice has the UUID.
    pub fn by_uuid(&self, uuid: Uuid) -> Result<Invoice> {
        self.invoices
            .by_uuid(uuid)?
            .ok_or_else(|| AdminError::NotFound(format!("Invoice {uuid}")))
    }

    /// Invoices issued for a client's orders.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>> {
        let orders: Vec<Order> = self.store.load(keys::ORDERS)?;
        let email = self
            .clients
            .get(client_id)?
            .map(|c| c.email)
            .filter(|e| !e.is_empty());
        let order_ids: Vec<OrderId> = orders
            .iter()
            .filter(|o| o.belongs_to(Some(client_id), email.as_deref()))
            .map(|o| o.id)
            .collect();
        Ok(self
            .invoices
            .list()?
            .into_iter()
            .filter(|i| order_ids.contains(&i.order_id))
            .collect())
    }

    fn stamp(&self, id: InvoiceId, folio: String, order: &Order, client: &Client) -> Invoice {
        let mut rng = rand::rng();
        let now = Utc::now();

        Invoice {
            id,
            uuid: Uuid::new_v4(),
            series: invoice::SERIES.to_string(),
            folio,
            issued_at: now,
            order_id: order.id,
            issuer_rfc: self.issuer.rfc.as_str().to_string(),
            issuer_name: self.issuer.name.clone(),
            receiver_rfc: client.fiscal.rfc.clone(),
            receiver_name: client.invoice_name().to_string(),
            receiver_cfdi_use: client.fiscal.cfdi_use.clone(),
            payment_terms: order.payment_terms,
            payment_method: order.payment_method,
            currency: CurrencyCode::MXN,
            exchange_rate: None,
            subtotal: order.subtotal,
            discount: order.discount,
            tax: order.tax,
            total: order.total,
            status: InvoiceStatus::Valid,
            cancelled_at: None,
            cancellation_reason: None,
            concepts: order.lines.clone(),
            stamped_at: now,
            cfd_seal: invoice::mock_seal(&mut rng),
            sat_seal: invoice::mock_seal(&mut rng),
            sat_certificate: invoice::SAT_CERTIFICATE.to_string(),
        }
    }
}
