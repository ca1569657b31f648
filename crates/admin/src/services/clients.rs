//! Client registry.
//!
//! Purchase history is not stored on the client. It is derived from the
//! order ledger by client id or customer email.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use ferreteria_core::{
    ClientId, ClientKind, ClientStatus, InvoiceStatus, OrderStatus, PaymentMethod, PaymentTerms,
    Price, Role,
};
use ferreteria_storefront::db::{OrderRepository, RepositoryError, Store};
use ferreteria_storefront::models::{CustomerRef, Order, OrderDraft, OrderLine};
use ferreteria_storefront::services::checkout::DiscountPolicy;
use ferreteria_storefront::services::orders::OrderService;
use ferreteria_storefront::services::session::require_admin;
use ferreteria_storefront::AppError;

use crate::db::{ClientRepository, InvoiceRepository};
use crate::error::{AdminError, Result};
use crate::models::{
    Client, ClientPatch, ClientStats, CommercialTerms, FiscalData, NewClient, RegistrySummary,
};

/// Nominal days to payment reported in client statistics.
const AVERAGE_PAYMENT_DAYS: u32 = 30;

/// Client registry service.
pub struct ClientService<'a> {
    store: &'a Store,
    clients: ClientRepository<'a>,
    orders: OrderRepository<'a>,
    invoices: InvoiceRepository<'a>,
}

impl<'a> ClientService<'a> {
    /// Create a new client service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            store,
            clients: ClientRepository::new(store),
            orders: OrderRepository::new(store),
            invoices: InvoiceRepository::new(store),
        }
    }

    /// All clients.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn list(&self) -> Result<Vec<Client>> {
        Ok(self.clients.list()?)
    }

    /// Get a client by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no client has the id.
    pub fn get(&self, id: ClientId) -> Result<Client> {
        self.clients
            .get(id)?
            .ok_or_else(|| AdminError::NotFound(format!("Client {id}")))
    }

    /// Clients matching `query` over name, contact, email, RFC and phone.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn search(&self, query: &str) -> Result<Vec<Client>> {
        Ok(self
            .clients
            .list()?
            .into_iter()
            .filter(|c| c.matches(query))
            .collect())
    }

    /// Register a client with id `max + 1`.
    ///
    /// Missing fiscal data defaults to regime `605` and CFDI use `G03`;
    /// missing terms to a 5 % discount cap and 5000 credit over 30 days.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::Validation` for a missing name or a malformed email,
    /// phone or RFC.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub fn create(&self, role: Role, input: NewClient) -> Result<Client> {
        require_admin(role).map_err(AppError::from)?;
        let input = input.normalized().map_err(AdminError::Validation)?;

        let now = Utc::now();
        let client = self.clients.insert_with(|id| input.into_client(id, now))?;

        info!(client_id = %client.id, "Created client");
        Ok(client)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins,
    /// `AdminError::Validation` for invalid fields and `AdminError::NotFound`
    /// for an unknown id.
    #[instrument(skip(self, patch))]
    pub fn update(&self, role: Role, id: ClientId, patch: ClientPatch) -> Result<Client> {
        require_admin(role).map_err(AppError::from)?;
        let client = self
            .clients
            .modify(id, |client| patch.apply(client).map_err(AdminError::Validation))
            .map_err(|e| not_found(e, id))?;
        info!(client_id = %id, "Updated client");
        Ok(client)
    }

    /// Soft delete: mark the client inactive.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn deactivate(&self, role: Role, id: ClientId) -> Result<Client> {
        require_admin(role).map_err(AppError::from)?;
        let client = self
            .clients
            .modify(id, |client| {
                client.status = ClientStatus::Inactive;
                Ok::<_, AdminError>(())
            })
            .map_err(|e| not_found(e, id))?;
        info!(client_id = %id, "Deactivated client");
        Ok(client)
    }

    /// Remove a client record entirely. Its orders are kept.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storefront` for non-admins and
    /// `AdminError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn delete(&self, role: Role, id: ClientId) -> Result<Client> {
        require_admin(role).map_err(AppError::from)?;
        let client = self
            .clients
            .delete(id)
            .map_err(|e| not_found(AdminError::from(e), id))?;
        info!(client_id = %id, "Deleted client");
        Ok(client)
    }

    /// Orders placed for a client.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id.
    pub fn orders_for(&self, id: ClientId) -> Result<Vec<Order>> {
        let client = self.get(id)?;
        Ok(orders_of(&client, self.orders.list()?))
    }

    /// Purchase statistics for a client.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id.
    pub fn stats(&self, id: ClientId) -> Result<ClientStats> {
        let client = self.get(id)?;
        let orders = orders_of(&client, self.orders.list()?);
        Ok(stats_for(&client, &orders))
    }

    /// Registry-wide totals as of now.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn summary(&self) -> Result<RegistrySummary> {
        self.summary_at(Utc::now())
    }

    /// Registry-wide totals as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn summary_at(&self, now: DateTime<Utc>) -> Result<RegistrySummary> {
        let clients = self.clients.list()?;
        let orders = self.orders.list()?;
        let invoices = self.invoices.list()?;

        let today = now.date_naive();
        let start_of_day = today.and_time(NaiveTime::MIN).and_utc();
        let start_of_month = today
            .with_day(1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let completed_since = |since: DateTime<Utc>| -> Price {
            orders
                .iter()
                .filter(|o| o.status.is_completed() && o.created_at >= since)
                .map(|o| o.total)
                .sum()
        };

        Ok(RegistrySummary {
            total_clients: clients.len(),
            active_clients: clients.iter().filter(|c| c.status == ClientStatus::Active).count(),
            inactive_clients: clients
                .iter()
                .filter(|c| c.status == ClientStatus::Inactive)
                .count(),
            total_orders: orders.len(),
            pending_orders: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
            sales_today: completed_since(start_of_day),
            sales_this_month: completed_since(start_of_month),
            pending_invoices: invoices
                .iter()
                .filter(|i| i.status == InvoiceStatus::Pending)
                .count(),
            receivable_credit: orders
                .iter()
                .filter(|o| {
                    o.status == OrderStatus::Confirmed && o.payment_terms == PaymentTerms::Deferred
                })
                .map(|o| o.total)
                .sum(),
        })
    }

    /// Clients with at least one pending order.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn with_pending_orders(&self) -> Result<Vec<Client>> {
        let pending: Vec<Order> = self
            .orders
            .list()?
            .into_iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .collect();
        Ok(self
            .clients
            .list()?
            .into_iter()
            .filter(|c| pending.iter().any(|o| belongs_to(o, c)))
            .collect())
    }

    /// The `limit` clients with the highest completed purchase amount.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn top(&self, limit: usize) -> Result<Vec<(Client, ClientStats)>> {
        let orders = self.orders.list()?;
        let mut ranked: Vec<(Client, ClientStats)> = self
            .clients
            .list()?
            .into_iter()
            .map(|client| {
                let own = orders_of(&client, orders.clone());
                let stats = stats_for(&client, &own);
                (client, stats)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_amount.cmp(&a.1.total_amount));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Write the sample clients and their sample orders if the client
    /// document has never been stored.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    #[instrument(skip(self))]
    pub fn seed_defaults(&self) -> Result<bool> {
        if self.clients.exists()? {
            debug!("Clients already present, skipping seed");
            return Ok(false);
        }

        let clients = default_clients(Utc::now());
        self.clients.replace_all(&clients)?;

        let orders = OrderService::new(self.store, DiscountPolicy::default());
        for (draft, status) in default_orders(&clients) {
            let order = orders.create_order(draft)?;
            orders.set_status(Role::Admin, order.id, status)?;
        }

        info!(count = clients.len(), "Seeded clients");
        Ok(true)
    }
}

fn orders_of(client: &Client, orders: Vec<Order>) -> Vec<Order> {
    orders.into_iter().filter(|o| belongs_to(o, client)).collect()
}

fn belongs_to(order: &Order, client: &Client) -> bool {
    let email = Some(client.email.as_str()).filter(|e| !e.is_empty());
    order.belongs_to(Some(client.id), email)
}

fn stats_for(client: &Client, orders: &[Order]) -> ClientStats {
    let completed: Vec<&Order> = orders.iter().filter(|o| o.status.is_completed()).collect();
    let total_amount: Price = completed.iter().map(|o| o.total).sum();

    ClientStats {
        completed_purchases: completed.len(),
        total_amount,
        average_purchase: total_amount.average_over(completed.len()),
        last_purchase: completed.iter().map(|o| o.created_at).max(),
        open_orders: orders.iter().filter(|o| o.status.is_open()).count(),
        credit_used: client.terms.credit_used(),
        average_payment_days: AVERAGE_PAYMENT_DAYS,
    }
}

fn not_found(err: AdminError, id: ClientId) -> AdminError {
    match err {
        AdminError::Database(RepositoryError::NotFound) => AdminError::NotFound(format!("Client {id}")),
        other => other,
    }
}

/// The sample clients, registered relative to `now`.
#[must_use]
pub fn default_clients(now: DateTime<Utc>) -> Vec<Client> {
    vec![
        Client {
            id: ClientId::new(1),
            name: "Juan Pérez García".to_string(),
            legal_name: None,
            contact: "Juan Pérez".to_string(),
            phone: "6561234567".to_string(),
            email: "juan.perez@email.com".to_string(),
            kind: ClientKind::Individual,
            status: ClientStatus::Active,
            registered_at: now,
            last_purchase_at: None,
            seller: Some("Eduardo Martínez".to_string()),
            fiscal: FiscalData {
                rfc: "PEGJ850415HDF".to_string(),
                regime: "605".to_string(),
                postal_code: "32000".to_string(),
                cfdi_use: "G03".to_string(),
            },
            terms: CommercialTerms {
                max_discount: Decimal::from(5),
                credit_available: Price::from_units(15_000),
                credit_limit: Price::from_units(15_000),
                credit_days: 30,
                blocked: false,
            },
            notes: Some("Cliente frecuente de herramientas eléctricas".to_string()),
        },
        Client {
            id: ClientId::new(2),
            name: "Constructora ABC S.A. de C.V.".to_string(),
            legal_name: Some("Constructora ABC S.A. de C.V.".to_string()),
            contact: "María González".to_string(),
            phone: "6567891234".to_string(),
            email: "compras@constructoraabc.com".to_string(),
            kind: ClientKind::Company,
            status: ClientStatus::Active,
            registered_at: now - Duration::days(30),
            last_purchase_at: None,
            seller: Some("Carlos Rodríguez".to_string()),
            fiscal: FiscalData {
                rfc: "CAB070815ABC".to_string(),
                regime: "601".to_string(),
                postal_code: "32100".to_string(),
                cfdi_use: "G03".to_string(),
            },
            terms: CommercialTerms {
                max_discount: Decimal::from(15),
                credit_available: Price::from_units(45_000),
                credit_limit: Price::from_units(50_000),
                credit_days: 60,
                blocked: false,
            },
            notes: Some("Cliente corporativo - solicitar OC para compras mayores a $10,000".to_string()),
        },
        Client {
            id: ClientId::new(3),
            name: "Ana Sofía Martínez".to_string(),
            legal_name: None,
            contact: "Ana Martínez".to_string(),
            phone: "6565555678".to_string(),
            email: "ana.martinez@email.com".to_string(),
            kind: ClientKind::Individual,
            status: ClientStatus::Active,
            registered_at: now - Duration::days(15),
            last_purchase_at: None,
            seller: None,
            fiscal: FiscalData {
                rfc: "MASA900320MDF".to_string(),
                regime: "605".to_string(),
                postal_code: "32200".to_string(),
                cfdi_use: "G01".to_string(),
            },
            terms: CommercialTerms {
                max_discount: Decimal::from(3),
                credit_available: Price::from_units(8000),
                credit_limit: Price::from_units(8000),
                credit_days: 15,
                blocked: false,
            },
            notes: Some("Cliente nuevo - verificar referencias crediticias".to_string()),
        },
    ]
}

fn default_orders(clients: &[Client]) -> Vec<(OrderDraft, OrderStatus)> {
    let customer = |id: i64| {
        clients
            .iter()
            .find(|c| c.id == ClientId::new(id))
            .map(|c| CustomerRef {
                client_id: Some(c.id),
                email: Some(c.email.clone()),
                ..CustomerRef::named(c.name.clone())
            })
            .unwrap_or_default()
    };

    let mut drill = OrderLine::new(None, "Taladro Percutor 13mm", Price::from_units(1250), 1)
        .with_adjustments(Price::ZERO, Price::from_units(200));
    drill.code = Some("TALADRO-001".to_string());
    drill.description = Some("Taladro percutor profesional 13mm 800W".to_string());

    let mut cement = OrderLine::new(None, "Cemento Portland Tipo I", Price::from_units(180), 50)
        .with_adjustments(Price::from_units(1350), Price::from_units(1224));
    cement.code = Some("CEMENTO-001".to_string());
    cement.description = Some("Saco de cemento 50kg".to_string());

    vec![
        (
            OrderDraft {
                customer: customer(1),
                lines: vec![drill],
                payment_method: PaymentMethod::Cash,
                payment_terms: PaymentTerms::SinglePayment,
                seller: Some("Eduardo Martínez".to_string()),
                notes: Some("Entrega en sucursal".to_string()),
                apply_volume_discount: false,
            },
            OrderStatus::Confirmed,
        ),
        (
            OrderDraft {
                customer: customer(2),
                lines: vec![cement],
                payment_method: PaymentMethod::Transfer,
                payment_terms: PaymentTerms::Deferred,
                seller: Some("Carlos Rodríguez".to_string()),
                notes: Some("Aplicar descuento corporativo 15%".to_string()),
                apply_volume_discount: false,
            },
            OrderStatus::Paid,
        ),
    ]
}
