//! Order ledger.
//!
//! Orders are appended to the `pedidos` document. Creating an order
//! reserves stock and appends the record in one store transaction:
//!
//! 1. Each line is matched to a product by id, else by name. Unmatched
//!    lines (free-text items) do not touch stock.
//! 2. Demand per product is summed and checked against stock. Any shortage
//!    aborts the order and nothing is written.
//! 3. Stock is decremented and the order appended. If writing the order
//!    fails, the previous product document is restored.
//!
//! Listings also show the read-only `compras_realizadas` purchase history
//! that older builds kept next to the ledger.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use ferreteria_core::{ClientId, OrderId, OrderStatus, Price, Role, UserId};

use super::cart::CartLedger;
use super::checkout::{self, CheckoutError, DiscountPolicy, Totals};
use super::session::require_admin;
use crate::db::{OrderRepository, RepositoryError, Store, counters, keys};
use crate::error::{AppError, Result};
use crate::models::{CustomerRef, Order, OrderDraft, OrderLine, Product, Purchase, SessionRecord};

/// Criteria for [`OrderService::list_filtered`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the customer name.
    pub customer: Option<String>,
}

impl OrderFilter {
    /// Whether an order meets every set criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        let status_ok = self.status.is_none_or(|s| s == order.status);
        let customer_ok = self.customer.as_deref().is_none_or(|needle| {
            order
                .customer
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        status_ok && customer_ok
    }
}

/// Order ledger service.
pub struct OrderService<'a> {
    store: &'a Store,
    orders: OrderRepository<'a>,
    policy: DiscountPolicy,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a Store, policy: DiscountPolicy) -> Self {
        Self {
            store,
            orders: OrderRepository::new(store),
            policy,
        }
    }

    /// The discount policy applied to new orders.
    #[must_use]
    pub const fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    /// Create an order, reserving stock for matched products.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for a draft with no lines,
    /// `CheckoutError::InvalidQuantity` for a zero-quantity line and
    /// `CheckoutError::InsufficientStock` if any product is short. In each
    /// case nothing is written.
    #[instrument(skip(self, draft), fields(customer = %draft.customer.name, lines = draft.lines.len()))]
    pub fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        if draft.lines.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }
        if draft.lines.iter().any(|l| l.quantity == 0) {
            return Err(CheckoutError::InvalidQuantity.into());
        }

        let totals = draft_totals(&draft, &self.policy);

        let order = self.store.transaction(|tx| {
            let mut products: Vec<Product> = tx.load(keys::PRODUCTS)?;
            let reserved = reserve_stock(&mut products, &draft.lines)?;

            let folio = counters::next_in(tx, keys::ORDER_COUNTER)?;
            let id = counters::next_timestamp_id_in(tx)?;
            let order = build_order(OrderId::new(id), Order::folio_for(folio), draft, totals);

            let mut orders: Vec<Order> = tx.load(keys::ORDERS)?;
            orders.push(order.clone());

            if reserved > 0 {
                tx.save(keys::PRODUCTS, &products)?;
            }
            tx.save(keys::ORDERS, &orders)?;
            Ok::<_, AppError>(order)
        })?;

        info!(
            order_id = %order.id,
            folio = %order.folio,
            total = %order.total,
            discount_applied = order.discount_applied,
            "Created order"
        );
        Ok(order)
    }

    /// Check out a cart: validate, create the order, then empty the cart.
    ///
    /// The stored lines are re-read first, so a ledger opened before other
    /// writers touched the cart checks out what is actually stored.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`checkout::validate`] and
    /// [`OrderService::create_order`]. The cart is only cleared after the
    /// order is stored.
    #[instrument(skip(self, cart, customer), fields(cart = %cart.namespace()))]
    pub fn checkout(
        &self,
        cart: &CartLedger<'_>,
        payment: Option<&str>,
        customer: CustomerRef,
    ) -> Result<Order> {
        cart.reload()?;
        let lines = cart.lines();
        let method = checkout::validate(&lines, payment).inspect_err(|e| {
            warn!(error = %e, "Checkout rejected");
        })?;

        let order = self.create_order(OrderDraft::from_cart(&lines, method, customer))?;
        cart.clear()?;
        Ok(order)
    }

    /// Change an order's status.
    ///
    /// Setting the status it already has changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for non-admins and `AppError::NotFound` for
    /// an unknown id.
    #[instrument(skip(self))]
    pub fn set_status(&self, role: Role, id: OrderId, status: OrderStatus) -> Result<Order> {
        require_admin(role)?;

        let current = self.get(id)?;
        if current.status == status {
            debug!(order_id = %id, status = %status, "Status unchanged");
            return Ok(current);
        }

        let order = self
            .orders
            .modify(id, |order| {
                order.status = status;
                order.updated_at = Some(Utc::now());
            })
            .map_err(|e| not_found(e, id))?;

        info!(order_id = %id, from = %current.status, to = %status, "Order status changed");
        Ok(order)
    }

    /// Delete an order. Stock is not restored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for non-admins and `AppError::NotFound` for
    /// an unknown id.
    #[instrument(skip(self))]
    pub fn delete(&self, role: Role, id: OrderId) -> Result<Order> {
        require_admin(role)?;
        let order = self.orders.delete(id).map_err(|e| not_found(e, id))?;
        info!(order_id = %id, "Deleted order");
        Ok(order)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no order has the id.
    pub fn get(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)?
            .ok_or_else(|| AppError::NotFound(format!("Order {id}")))
    }

    /// All orders in creation order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn list(&self) -> Result<Vec<Order>> {
        Ok(self.orders.list()?)
    }

    /// Orders matching a filter, followed by matching records of the
    /// purchase history.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn list_filtered(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.list()?;
        let purchases = self.orders.purchases()?;
        Ok(with_history(orders, &purchases)
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect())
    }

    /// Orders placed by a signed-in shopper, including purchase history
    /// records that carry the account id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn for_user(&self, user: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.list()?;
        let purchases = self.orders.purchases()?;
        Ok(with_history(orders, &purchases)
            .into_iter()
            .filter(|o| o.user_id == Some(user))
            .collect())
    }

    /// Everything the signed-in shopper bought, newest first.
    ///
    /// Ledger orders match on the account id. Purchase history records
    /// also match on the shopper's email, name or username (see
    /// [`Purchase::made_by`]).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn for_shopper(&self, session: &SessionRecord) -> Result<Vec<Order>> {
        let mine: Vec<Order> = self
            .orders
            .list()?
            .into_iter()
            .filter(|o| session.id.is_some() && o.user_id == session.id)
            .collect();
        let history: Vec<Purchase> = self
            .orders
            .purchases()?
            .into_iter()
            .filter(|p| p.made_by(session))
            .collect();
        let mut mine = with_history(mine, &history);
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    /// Orders for a CRM client, matched by client id or customer email.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn for_customer(&self, client: Option<ClientId>, email: Option<&str>) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .list()?
            .into_iter()
            .filter(|o| o.belongs_to(client, email))
            .collect())
    }

    /// Distinct customer names, sorted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub fn distinct_customers(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self
            .orders
            .list()?
            .into_iter()
            .map(|o| o.customer)
            .filter(|name| !name.trim().is_empty())
            .collect();
        Ok(names.into_iter().collect())
    }
}

/// Append purchase history records whose id is not already in `orders`.
///
/// Records with an unreadable date are logged and left out.
fn with_history(mut orders: Vec<Order>, purchases: &[Purchase]) -> Vec<Order> {
    for purchase in purchases {
        if orders.iter().any(|o| o.id == purchase.id) {
            continue;
        }
        match purchase.to_order() {
            Some(order) => orders.push(order),
            None => warn!(order_id = %purchase.id, date = %purchase.date, "Purchase record has no readable date"),
        }
    }
    orders
}

/// Amounts for a draft.
///
/// `subtotal` is the gross of all lines; `discount` adds per-line discounts
/// and, when requested, the volume discount on the subtotal; `tax` is the
/// sum of per-line tax.
#[must_use]
pub fn draft_totals(draft: &OrderDraft, policy: &DiscountPolicy) -> Totals {
    let subtotal: Price = draft.lines.iter().map(OrderLine::gross).sum();
    let line_discounts: Price = draft.lines.iter().map(|l| l.discount).sum();
    let tax: Price = draft.lines.iter().map(|l| l.tax).sum();

    let discount_applied = draft.apply_volume_discount && policy.applies_to(subtotal);
    let volume = if draft.apply_volume_discount {
        policy.discount_for(subtotal)
    } else {
        Price::ZERO
    };
    let discount = line_discounts + volume;

    Totals {
        subtotal,
        discount,
        tax,
        total: subtotal - discount + tax,
        discount_applied,
    }
}

/// Check and decrement stock for every matched line.
///
/// Returns how many products were touched. Leaves `products` unchanged on
/// error.
fn reserve_stock(products: &mut [Product], lines: &[OrderLine]) -> std::result::Result<usize, CheckoutError> {
    let mut demand: Vec<(usize, u64)> = Vec::new();

    for line in lines {
        let index = line
            .product_id
            .and_then(|id| products.iter().position(|p| p.id == id))
            .or_else(|| products.iter().position(|p| p.name == line.name));

        let Some(index) = index else {
            debug!(line = %line.name, "Line not in catalog, stock untouched");
            continue;
        };

        match demand.iter_mut().find(|(i, _)| *i == index) {
            Some((_, requested)) => *requested += u64::from(line.quantity),
            None => demand.push((index, u64::from(line.quantity))),
        }
    }

    for (index, requested) in &demand {
        let Some(product) = products.get(*index) else {
            continue;
        };
        if *requested > u64::from(product.stock) {
            warn!(product_id = %product.id, requested, stock = product.stock, "Insufficient stock");
            return Err(CheckoutError::InsufficientStock {
                product: product.name.clone(),
                requested: *requested,
                available: product.stock,
            });
        }
    }

    for (index, requested) in &demand {
        if let Some(product) = products.get_mut(*index) {
            let units = u32::try_from(*requested).unwrap_or(u32::MAX);
            product.stock = product.stock.saturating_sub(units);
        }
    }

    Ok(demand.len())
}

fn build_order(id: OrderId, folio: String, draft: OrderDraft, totals: Totals) -> Order {
    let OrderDraft {
        customer,
        lines,
        payment_method,
        payment_terms,
        seller,
        notes,
        ..
    } = draft;

    Order {
        id,
        folio,
        customer: customer.name,
        client_id: customer.client_id,
        user_id: customer.user_id,
        customer_email: customer.email,
        seller,
        lines,
        subtotal: totals.subtotal,
        discount: totals.discount,
        tax: totals.tax,
        total: totals.total,
        discount_applied: totals.discount_applied,
        payment_method,
        payment_terms,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
        notes,
    }
}

fn not_found(err: RepositoryError, id: OrderId) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("Order {id}")),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ferreteria_core::{PaymentMethod, PaymentTerms, ProductId};

    use super::*;
    use crate::db::MemoryStore;
    use crate::db::tests::FailingStore;
    use crate::models::CartItem;
    use crate::services::cart::CartNamespace;
    use crate::services::catalog::CatalogService;
    use crate::services::session::AuthError;

    fn seeded() -> Store {
        let store = Store::in_memory();
        CatalogService::new(&store).seed_defaults().unwrap();
        store
    }

    fn draft(lines: Vec<OrderLine>) -> OrderDraft {
        OrderDraft {
            customer: CustomerRef::named("Juan Pérez García"),
            lines,
            payment_method: PaymentMethod::Cash,
            payment_terms: PaymentTerms::SinglePayment,
            seller: None,
            notes: None,
            apply_volume_discount: true,
        }
    }

    fn stock_of(store: &Store, id: i64) -> u32 {
        CatalogService::new(store).get(ProductId::new(id)).unwrap().stock
    }

    #[test]
    fn test_create_order_decrements_stock() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());

        let order = service
            .create_order(draft(vec![
                OrderLine::new(Some(ProductId::new(1)), "Red Bull Energy Drink 250ml", Price::from_units(45), 2),
                OrderLine::new(None, "Monster Energy Original 473ml", Price::from_units(35), 1),
            ]))
            .unwrap();

        assert_eq!(order.folio, "PV-000001");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, Price::from_units(125));
        assert_eq!(order.total, Price::from_units(125));
        assert!(!order.discount_applied);
        assert_eq!(stock_of(&store, 1), 48);
        assert_eq!(stock_of(&store, 2), 29);
    }

    #[test]
    fn test_shortage_writes_nothing() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let products_before = store.get_raw(keys::PRODUCTS).unwrap();

        let err = service
            .create_order(draft(vec![
                OrderLine::new(Some(ProductId::new(1)), "Red Bull", Price::from_units(45), 2),
                OrderLine::new(Some(ProductId::new(3)), "Rockstar", Price::from_units(45), 20),
                OrderLine::new(Some(ProductId::new(3)), "Rockstar", Price::from_units(45), 6),
            ]))
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Checkout(CheckoutError::InsufficientStock {
                requested: 26,
                available: 25,
                ..
            })
        ));
        assert_eq!(store.get_raw(keys::PRODUCTS).unwrap(), products_before);
        assert!(service.list().unwrap().is_empty());
        assert_eq!(store.get_raw(keys::ORDER_COUNTER).unwrap(), None);
    }

    #[test]
    fn test_unmatched_lines_skip_stock() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let products_before = store.get_raw(keys::PRODUCTS).unwrap();

        let order = service
            .create_order(draft(vec![OrderLine::new(
                None,
                "Cemento Portland Tipo I",
                Price::from_units(180),
                5,
            )]))
            .unwrap();

        assert_eq!(order.total, Price::from_units(810));
        assert!(order.discount_applied);
        assert_eq!(store.get_raw(keys::PRODUCTS).unwrap(), products_before);
    }

    #[test]
    fn test_failed_order_write_restores_products() {
        let memory = MemoryStore::new();
        let store = Store::new(FailingStore::new(memory, keys::ORDERS));
        CatalogService::new(&store).seed_defaults().unwrap();
        let service = OrderService::new(&store, DiscountPolicy::default());

        let err = service
            .create_order(draft(vec![OrderLine::new(
                Some(ProductId::new(1)),
                "Red Bull",
                Price::from_units(45),
                3,
            )]))
            .unwrap_err();

        assert!(err.is_server_error());
        assert_eq!(stock_of(&store, 1), 50);
    }

    #[test]
    fn test_draft_totals_with_line_adjustments() {
        let mut d = draft(vec![
            OrderLine::new(None, "Taladro", Price::from_units(1250), 1)
                .with_adjustments(Price::from_units(50), Price::from_units(192)),
        ]);
        d.apply_volume_discount = false;
        let totals = draft_totals(&d, &DiscountPolicy::default());
        assert_eq!(totals.subtotal, Price::from_units(1250));
        assert_eq!(totals.discount, Price::from_units(50));
        assert_eq!(totals.tax, Price::from_units(192));
        assert_eq!(totals.total, Price::from_units(1392));
        assert!(!totals.discount_applied);
    }

    #[test]
    fn test_empty_and_zero_quantity_rejected() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        assert!(matches!(
            service.create_order(draft(vec![])),
            Err(AppError::Checkout(CheckoutError::EmptyCart))
        ));
        assert!(matches!(
            service.create_order(draft(vec![OrderLine::new(None, "x", Price::from_units(1), 0)])),
            Err(AppError::Checkout(CheckoutError::InvalidQuantity))
        ));
    }

    #[test]
    fn test_checkout_clears_cart() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let cart = CartLedger::open(&store, CartNamespace::User(UserId::new(2))).unwrap();
        let product = CatalogService::new(&store).get(ProductId::new(1)).unwrap();
        cart.add(CartItem::from(&product), 12).unwrap();

        let customer = CustomerRef {
            user_id: Some(UserId::new(2)),
            ..CustomerRef::named("usuario")
        };
        let order = service.checkout(&cart, Some("tarjeta"), customer).unwrap();

        assert_eq!(order.payment_method, PaymentMethod::Card);
        assert_eq!(order.subtotal, Price::from_units(540));
        assert_eq!(order.discount, Price::from_units(54));
        assert_eq!(order.total, Price::from_units(486));
        assert!(cart.lines().is_empty());
        assert_eq!(service.for_user(UserId::new(2)).unwrap().len(), 1);
        assert_eq!(stock_of(&store, 1), 38);
    }

    #[test]
    fn test_checkout_validation_keeps_cart() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();

        assert!(matches!(
            service.checkout(&cart, Some("efectivo"), CustomerRef::named("x")),
            Err(AppError::Checkout(CheckoutError::EmptyCart))
        ));

        let product = CatalogService::new(&store).get(ProductId::new(2)).unwrap();
        cart.add(CartItem::from(&product), 1).unwrap();
        assert!(matches!(
            service.checkout(&cart, None, CustomerRef::named("x")),
            Err(AppError::Checkout(CheckoutError::MissingPaymentMethod))
        ));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_status_idempotent() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let order = service
            .create_order(draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]))
            .unwrap();

        let shipped = service.set_status(Role::Admin, order.id, OrderStatus::Shipped).unwrap();
        let snapshot = store.get_raw(keys::ORDERS).unwrap();
        let again = service.set_status(Role::Admin, order.id, OrderStatus::Shipped).unwrap();

        assert_eq!(shipped, again);
        assert_eq!(store.get_raw(keys::ORDERS).unwrap(), snapshot);
    }

    #[test]
    fn test_admin_only_mutations() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let order = service
            .create_order(draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]))
            .unwrap();

        assert!(matches!(
            service.set_status(Role::User, order.id, OrderStatus::Cancelled),
            Err(AppError::Auth(AuthError::AdminRequired))
        ));
        assert!(matches!(
            service.delete(Role::User, order.id),
            Err(AppError::Auth(AuthError::AdminRequired))
        ));

        service.delete(Role::Admin, order.id).unwrap();
        assert!(matches!(service.get(order.id), Err(AppError::NotFound(_))));
        assert!(matches!(
            service.delete(Role::Admin, order.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_ids_and_folios_unique() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let a = service
            .create_order(draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]))
            .unwrap();
        let b = service
            .create_order(draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]))
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.folio, "PV-000002");
    }

    #[test]
    fn test_queries() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());

        let mut for_client = draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]);
        for_client.customer = CustomerRef {
            client_id: Some(ClientId::new(2)),
            email: Some("compras@constructoraabc.com".to_string()),
            ..CustomerRef::named("Constructora ABC S.A. de C.V.")
        };
        let first = service.create_order(for_client).unwrap();
        service
            .create_order(draft(vec![OrderLine::new(None, "y", Price::from_units(10), 1)]))
            .unwrap();
        service.set_status(Role::Admin, first.id, OrderStatus::Paid).unwrap();

        let paid = service
            .list_filtered(&OrderFilter {
                status: Some(OrderStatus::Paid),
                customer: None,
            })
            .unwrap();
        assert_eq!(paid.len(), 1);

        let by_name = service
            .list_filtered(&OrderFilter {
                status: None,
                customer: Some("constructora".to_string()),
            })
            .unwrap();
        assert_eq!(by_name.len(), 1);

        assert_eq!(service.for_customer(Some(ClientId::new(2)), None).unwrap().len(), 1);
        assert_eq!(
            service
                .for_customer(None, Some("COMPRAS@constructoraabc.com"))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            service.distinct_customers().unwrap(),
            vec!["Constructora ABC S.A. de C.V.", "Juan Pérez García"]
        );
    }

    #[test]
    fn test_purchase_history_in_listings() {
        let store = seeded();
        let service = OrderService::new(&store, DiscountPolicy::default());
        let mut mine = draft(vec![OrderLine::new(None, "x", Price::from_units(10), 1)]);
        mine.customer.user_id = Some(UserId::new(2));
        let placed = service.create_order(mine).unwrap();

        store
            .set_raw(
                keys::PURCHASES,
                r#"[
                    {"id": 11, "cliente": "usuario", "usuarioId": "usuario@test.com",
                     "total": 486, "fecha": "2024-03-01T10:00:00Z", "estado": "Entregado"},
                    {"id": 12, "cliente": "Otro", "usuarioId": "otro@test.com",
                     "total": 90, "fecha": "2024-03-02", "estado": "Pendiente"},
                    {"id": 13, "total": "mucho", "fecha": "2024-03-03"},
                    {"id": 14, "cliente": "usuario", "fecha": "pronto"}
                ]"#,
            )
            .unwrap();

        assert_eq!(service.list().unwrap().len(), 1);
        let all = service.list_filtered(&OrderFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        let delivered = service
            .list_filtered(&OrderFilter {
                status: Some(OrderStatus::Delivered),
                customer: None,
            })
            .unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id, OrderId::new(11));

        let session = SessionRecord {
            id: Some(UserId::new(2)),
            username: "usuario".to_string(),
            email: Some("usuario@test.com".to_string()),
            ..SessionRecord::default()
        };
        let shopper = service.for_shopper(&session).unwrap();
        assert_eq!(shopper.len(), 2);
        assert_eq!(shopper[0].id, placed.id);
        assert_eq!(shopper[1].id, OrderId::new(11));
        assert_eq!(service.for_user(UserId::new(2)).unwrap().len(), 1);
    }
}
