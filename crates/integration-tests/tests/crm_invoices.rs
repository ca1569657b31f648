//! Back office end to end: clients, invoices, reports and backups.

use chrono::{Duration, Utc};

use ferreteria_admin::AdminError;
use ferreteria_admin::models::NewClient;
use ferreteria_admin::services::Period;
use ferreteria_core::{ClientId, InvoiceStatus, OrderStatus, Price, Role};
use ferreteria_integration_tests::TestContext;
use ferreteria_storefront::models::Order;

fn paid_sample_order(ctx: &TestContext) -> Order {
    ctx.state
        .app()
        .orders()
        .list()
        .expect("orders")
        .into_iter()
        .find(|o| o.status == OrderStatus::Paid)
        .expect("seeded paid order")
}

fn today() -> Period {
    let now = Utc::now();
    Period::new(now - Duration::hours(1), now + Duration::hours(1))
}

// ============================================================================
// Invoices
// ============================================================================

#[test]
fn test_invoice_from_order() {
    let ctx = TestContext::seeded();
    let order = paid_sample_order(&ctx);

    let invoice = ctx
        .state
        .invoices()
        .create_from_order(Role::Admin, order.id)
        .expect("invoice");

    assert_eq!(invoice.full_folio(), "A-00000001");
    assert_eq!(invoice.order_id, order.id);
    assert_eq!(invoice.receiver_rfc, "CAB070815ABC");
    assert_eq!(invoice.issuer_rfc.as_str(), "FER123456789");
    assert_eq!(invoice.subtotal, Price::from_units(9000));
    assert_eq!(invoice.discount, Price::from_units(1350));
    assert_eq!(invoice.total, Price::from_units(8874));
    assert_eq!(invoice.status, InvoiceStatus::Valid);
    assert_eq!(invoice.cfd_seal.len(), 64);
    assert!(invoice.cfd_seal.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    let invoiced = ctx.state.app().orders().get(order.id).expect("order");
    assert_eq!(invoiced.status, OrderStatus::Invoiced);
    assert!(matches!(
        ctx.state.invoices().create_from_order(Role::Admin, order.id),
        Err(AdminError::Validation(_))
    ));

    let next = ctx
        .state
        .app()
        .orders()
        .list()
        .expect("orders")
        .into_iter()
        .find(|o| o.status == OrderStatus::Confirmed)
        .expect("confirmed order");
    let second = ctx
        .state
        .invoices()
        .create_from_order(Role::Admin, next.id)
        .expect("second invoice");
    assert_eq!(second.full_folio(), "A-00000002");
    assert_ne!(second.uuid, invoice.uuid);
}

#[test]
fn test_invoice_needs_admin_and_a_client() {
    let ctx = TestContext::seeded();
    let order = paid_sample_order(&ctx);
    assert!(matches!(
        ctx.state.invoices().create_from_order(Role::User, order.id),
        Err(AdminError::Storefront(_))
    ));

    let walk_in = ctx
        .state
        .app()
        .orders()
        .create_order(ferreteria_storefront::models::OrderDraft {
            customer: ferreteria_storefront::models::CustomerRef::named("Mostrador"),
            lines: vec![ferreteria_storefront::models::OrderLine::new(
                None,
                "Martillo",
                Price::from_units(150),
                1,
            )],
            payment_method: ferreteria_core::PaymentMethod::Cash,
            payment_terms: ferreteria_core::PaymentTerms::SinglePayment,
            seller: None,
            notes: None,
            apply_volume_discount: true,
        })
        .expect("order");
    assert!(matches!(
        ctx.state.invoices().create_from_order(Role::Admin, walk_in.id),
        Err(AdminError::NotFound(_))
    ));
    assert!(ctx.state.invoices().list().expect("invoices").is_empty());
}

#[test]
fn test_cancel_invoice() {
    let ctx = TestContext::seeded();
    let order = paid_sample_order(&ctx);
    let invoices = ctx.state.invoices();
    let invoice = invoices.create_from_order(Role::Admin, order.id).expect("invoice");

    assert!(matches!(
        invoices.cancel(Role::Admin, invoice.uuid, "  "),
        Err(AdminError::Validation(_))
    ));
    let cancelled = invoices
        .cancel(Role::Admin, invoice.uuid, "Error en datos fiscales")
        .expect("cancel");
    assert!(cancelled.is_cancelled());
    assert_eq!(
        cancelled.cancellation_reason.as_deref(),
        Some("Error en datos fiscales")
    );
    assert!(cancelled.cancelled_at.is_some());
    assert!(
        invoices
            .for_client(ClientId::new(2))
            .expect("client invoices")
            .iter()
            .all(ferreteria_admin::models::Invoice::is_cancelled)
    );
}

// ============================================================================
// Clients
// ============================================================================

#[test]
fn test_client_registry_and_stats() {
    let ctx = TestContext::seeded();
    let clients = ctx.state.clients();

    let created = clients
        .create(
            Role::Admin,
            NewClient {
                name: "Herrería El Yunque".to_string(),
                email: "yunque@correo.mx".to_string(),
                phone: "656-222-3344".to_string(),
                ..NewClient::default()
            },
        )
        .expect("create");
    assert_eq!(created.id, ClientId::new(4));
    assert_eq!(created.phone, "6562223344");
    assert_eq!(clients.search("yunque").expect("search").len(), 1);

    let stats = clients.stats(ClientId::new(2)).expect("stats");
    assert_eq!(stats.completed_purchases, 1);
    assert_eq!(stats.total_amount, Price::from_units(8874));

    let summary = clients.summary().expect("summary");
    assert_eq!(summary.total_clients, 4);
    assert_eq!(summary.total_orders, 2);
    assert_eq!(summary.pending_orders, 1);

    clients.deactivate(Role::Admin, created.id).expect("deactivate");
    assert_eq!(clients.summary().expect("summary").inactive_clients, 1);
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_reports_count_completed_sales() {
    let ctx = TestContext::seeded();
    let order = paid_sample_order(&ctx);
    ctx.state
        .invoices()
        .create_from_order(Role::Admin, order.id)
        .expect("invoice");

    let report = ctx.state.reports().sales_report(today()).expect("report");
    assert_eq!(report.total_sales, 1);
    assert_eq!(report.total_amount, Price::from_units(8874));
    assert_eq!(report.top_products.len(), 1);
    assert_eq!(report.top_products.first().map(|p| p.quantity), Some(50));

    let seller = order.seller.expect("seller");
    let commissions = ctx.state.reports().commissions(None).expect("commissions");
    assert_eq!(commissions[&seller], Price::new(rust_decimal::Decimal::new(26622, 2)));
}

#[test]
fn test_commission_rate_comes_from_configuration() {
    let ctx = TestContext::with_store(
        ferreteria_storefront::Store::in_memory(),
        &[("FERRETERIA_COMMISSION_RATE", "0.05")],
    );
    ctx.state.seed().expect("seed");
    let commissions = ctx.state.reports().commissions(Some(today())).expect("commissions");
    let total: Price = commissions.values().copied().sum();
    assert_eq!(total, Price::new(rust_decimal::Decimal::new(44370, 2)));
}

// ============================================================================
// Backups
// ============================================================================

#[test]
fn test_backup_moves_data_between_stores() {
    let source = TestContext::seeded();
    let order = paid_sample_order(&source);
    source
        .state
        .invoices()
        .create_from_order(Role::Admin, order.id)
        .expect("invoice");
    let text = source.state.backup().create_backup().expect("backup");

    let target = TestContext::new();
    let summary = target
        .state
        .backup()
        .restore_backup(Role::Admin, &text)
        .expect("restore");
    assert_eq!(summary.clients, Some(3));
    assert_eq!(summary.orders, Some(2));
    assert_eq!(summary.invoices, Some(1));
    assert_eq!(target.state.invoices().list().expect("invoices").len(), 1);

    target.state.backup().clear(Role::Admin).expect("clear");
    assert!(target.state.clients().list().expect("clients").is_empty());
    assert!(target.state.invoices().list().expect("invoices").is_empty());
}

#[test]
fn test_restore_rejects_garbage() {
    let ctx = TestContext::seeded();
    assert!(matches!(
        ctx.state.backup().restore_backup(Role::Admin, r#"{"version": "1.0"}"#),
        Err(AdminError::InvalidBackup(_))
    ));
    assert_eq!(ctx.state.clients().list().expect("clients").len(), 3);
}
