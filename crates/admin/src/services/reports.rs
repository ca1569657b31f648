//! Sales reports, commissions and loyalty tiers.
//!
//! Only completed orders (paid, delivered or invoiced) count as sales.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use ferreteria_core::{Price, UserId};
use ferreteria_storefront::db::{OrderRepository, Store};
use ferreteria_storefront::models::Order;

use crate::error::Result;

/// Seller name used for orders without one.
pub const UNASSIGNED_SELLER: &str = "Sin asignar";

/// How many products a sales report ranks.
pub const TOP_PRODUCTS: usize = 10;

/// Order counts at which the loyalty discount steps up, with the discount
/// in percent.
pub const LOYALTY_TIERS: [(usize, u32); 4] = [(3, 5), (5, 10), (7, 15), (10, 20)];

/// An inclusive time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Sales by one seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SellerSales {
    pub orders: usize,
    pub amount: Price,
}

/// Units and revenue for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub quantity: u64,
    pub amount: Price,
}

/// Sales over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: Period,
    pub total_sales: usize,
    pub total_amount: Price,
    pub average_sale: Price,
    pub by_seller: BTreeMap<String, SellerSales>,
    /// Best sellers by units, at most [`TOP_PRODUCTS`].
    pub top_products: Vec<ProductSales>,
    pub generated_at: DateTime<Utc>,
}

/// Loyalty discount earned by a number of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTier {
    /// Discount on the next order, in percent.
    pub discount_percent: u32,
    /// Order count that unlocks the next tier, if any.
    pub next_tier_at: Option<usize>,
}

/// A shopper's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperSummary {
    pub orders: usize,
    pub total_spent: Price,
    /// Volume discounts received.
    pub discounts: Price,
    pub loyalty: LoyaltyTier,
}

/// Loyalty tier for a number of orders placed.
#[must_use]
pub fn loyalty_tier(order_count: usize) -> LoyaltyTier {
    let discount_percent = LOYALTY_TIERS
        .iter()
        .rev()
        .find(|(at, _)| order_count >= *at)
        .map_or(0, |(_, percent)| *percent);
    let next_tier_at = LOYALTY_TIERS
        .iter()
        .map(|(at, _)| *at)
        .find(|at| order_count < *at);
    LoyaltyTier {
        discount_percent,
        next_tier_at,
    }
}

/// Sum of discounts on orders that had the volume discount applied.
#[must_use]
pub fn discount_total(orders: &[Order]) -> Price {
    orders
        .iter()
        .filter(|o| o.discount_applied)
        .map(|o| o.discount)
        .sum()
}

/// Report service.
pub struct ReportService<'a> {
    orders: OrderRepository<'a>,
    commission_rate: Decimal,
}

impl<'a> ReportService<'a> {
    /// Create a new report service.
    #[must_use]
    pub const fn new(store: &'a Store, commission_rate: Decimal) -> Self {
        Self {
            orders: OrderRepository::new(store),
            commission_rate,
        }
    }

    /// Completed orders created within `period`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn sales_between(&self, period: Period) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .list()?
            .into_iter()
            .filter(|o| o.status.is_completed() && period.contains(o.created_at))
            .collect())
    }

    /// Sales totals, per-seller totals and best sellers for `period`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn sales_report(&self, period: Period) -> Result<SalesReport> {
        let sales = self.sales_between(period)?;
        let total_amount: Price = sales.iter().map(|o| o.total).sum();

        let mut by_seller: BTreeMap<String, SellerSales> = BTreeMap::new();
        for order in &sales {
            let entry = by_seller.entry(seller_of(order)).or_default();
            entry.orders += 1;
            entry.amount += order.total;
        }

        let mut products: BTreeMap<String, ProductSales> = BTreeMap::new();
        for line in sales.iter().flat_map(|o| &o.lines) {
            let key = line
                .product_id
                .map_or_else(|| line.name.clone(), |id| id.to_string());
            let entry = products.entry(key).or_insert_with(|| ProductSales {
                name: line.name.clone(),
                quantity: 0,
                amount: Price::ZERO,
            });
            entry.quantity += u64::from(line.quantity);
            entry.amount += line.total;
        }
        let mut top_products: Vec<ProductSales> = products.into_values().collect();
        top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_products.truncate(TOP_PRODUCTS);

        debug!(sales = sales.len(), total = %total_amount, "Built sales report");

        Ok(SalesReport {
            period,
            total_sales: sales.len(),
            total_amount,
            average_sale: total_amount.average_over(sales.len()),
            by_seller,
            top_products,
            generated_at: Utc::now(),
        })
    }

    /// Commission per seller on completed orders, optionally limited to a
    /// period.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn commissions(&self, period: Option<Period>) -> Result<BTreeMap<String, Price>> {
        let mut totals: BTreeMap<String, Price> = BTreeMap::new();
        for order in self.orders.list()? {
            let in_period = period.is_none_or(|p| p.contains(order.created_at));
            if order.status.is_completed() && in_period {
                *totals.entry(seller_of(&order)).or_default() += order.total;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(seller, amount)| (seller, amount.portion(self.commission_rate)))
            .collect())
    }

    /// Order count, spend, discounts and loyalty tier of a shopper.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Database` if the store fails.
    pub fn shopper_summary(&self, user: UserId) -> Result<ShopperSummary> {
        let orders: Vec<Order> = self
            .orders
            .list()?
            .into_iter()
            .filter(|o| o.user_id == Some(user))
            .collect();
        Ok(ShopperSummary {
            orders: orders.len(),
            total_spent: orders.iter().map(|o| o.total).sum(),
            discounts: discount_total(&orders),
            loyalty: loyalty_tier(orders.len()),
        })
    }
}

fn seller_of(order: &Order) -> String {
    order
        .seller
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNASSIGNED_SELLER.to_string())
}

/// Units across a set of orders.
#[must_use]
pub fn units_sold(orders: &[Order]) -> u64 {
    orders.iter().map(Order::unit_count).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use ferreteria_core::{OrderStatus, PaymentMethod, PaymentTerms, Role};
    use ferreteria_storefront::models::{CustomerRef, OrderDraft, OrderLine};
    use ferreteria_storefront::services::checkout::DiscountPolicy;
    use ferreteria_storefront::services::orders::OrderService;

    use super::*;

    fn sale(
        service: &OrderService<'_>,
        seller: Option<&str>,
        lines: Vec<OrderLine>,
        status: OrderStatus,
        user: Option<UserId>,
    ) -> Order {
        let order = service
            .create_order(OrderDraft {
                customer: CustomerRef {
                    user_id: user,
                    ..CustomerRef::named("Cliente")
                },
                lines,
                payment_method: PaymentMethod::Cash,
                payment_terms: PaymentTerms::SinglePayment,
                seller: seller.map(ToString::to_string),
                notes: None,
                apply_volume_discount: true,
            })
            .unwrap();
        service.set_status(Role::Admin, order.id, status).unwrap()
    }

    fn line(name: &str, price: i64, qty: u32) -> OrderLine {
        OrderLine::new(None, name, Price::from_units(price), qty)
    }

    fn today() -> Period {
        let now = Utc::now();
        Period::new(now - Duration::hours(1), now + Duration::hours(1))
    }

    #[test]
    fn test_loyalty_tiers() {
        let cases = [
            (0, 0, Some(3)),
            (2, 0, Some(3)),
            (3, 5, Some(5)),
            (5, 10, Some(7)),
            (7, 15, Some(10)),
            (9, 15, Some(10)),
            (10, 20, None),
            (25, 20, None),
        ];
        for (count, percent, next) in cases {
            let tier = loyalty_tier(count);
            assert_eq!(tier.discount_percent, percent, "count {count}");
            assert_eq!(tier.next_tier_at, next, "count {count}");
        }
    }

    #[test]
    fn test_sales_report() {
        let store = Store::in_memory();
        let orders = OrderService::new(&store, DiscountPolicy::default());
        sale(&orders, Some("Eduardo"), vec![line("Martillo", 150, 2), line("Clavos", 1, 100)], OrderStatus::Paid, None);
        sale(&orders, Some("Carlos"), vec![line("Martillo", 150, 1)], OrderStatus::Delivered, None);
        sale(&orders, None, vec![line("Pala", 300, 1)], OrderStatus::Invoiced, None);
        sale(&orders, Some("Carlos"), vec![line("Pala", 300, 5)], OrderStatus::Pending, None);

        let reports = ReportService::new(&store, Decimal::new(3, 2));
        let report = reports.sales_report(today()).unwrap();

        assert_eq!(report.total_sales, 3);
        assert_eq!(report.total_amount, Price::from_units(850));
        assert_eq!(report.by_seller.len(), 3);
        assert_eq!(report.by_seller[UNASSIGNED_SELLER].amount, Price::from_units(300));
        assert_eq!(report.by_seller["Carlos"].orders, 1);
        assert_eq!(report.top_products[0].name, "Clavos");
        assert_eq!(report.top_products[1].name, "Martillo");
        assert_eq!(report.top_products[1].quantity, 3);

        let past = Period::new(Utc::now() - Duration::days(10), Utc::now() - Duration::days(9));
        assert_eq!(reports.sales_report(past).unwrap().total_sales, 0);
    }

    #[test]
    fn test_commissions() {
        let store = Store::in_memory();
        let orders = OrderService::new(&store, DiscountPolicy::default());
        sale(&orders, Some("Eduardo"), vec![line("Taladro", 1000, 1)], OrderStatus::Paid, None);
        sale(&orders, Some("Eduardo"), vec![line("Martillo", 150, 2)], OrderStatus::Delivered, None);
        sale(&orders, Some("Eduardo"), vec![line("Pala", 300, 1)], OrderStatus::Cancelled, None);

        let reports = ReportService::new(&store, Decimal::new(3, 2));
        let all = reports.commissions(None).unwrap();
        // 1000 less the 10 % volume discount, plus 300
        assert_eq!(all["Eduardo"], Price::from_units(36));

        let past = Period::new(Utc::now() - Duration::days(10), Utc::now() - Duration::days(9));
        assert!(reports.commissions(Some(past)).unwrap().is_empty());
    }

    #[test]
    fn test_shopper_summary() {
        let store = Store::in_memory();
        let orders = OrderService::new(&store, DiscountPolicy::default());
        let shopper = UserId::new(2);
        for _ in 0..3 {
            sale(&orders, None, vec![line("Red Bull", 45, 12)], OrderStatus::Delivered, Some(shopper));
        }
        sale(&orders, None, vec![line("Red Bull", 45, 1)], OrderStatus::Delivered, Some(UserId::new(9)));

        let summary = ReportService::new(&store, Decimal::ZERO)
            .shopper_summary(shopper)
            .unwrap();
        assert_eq!(summary.orders, 3);
        assert_eq!(summary.total_spent, Price::from_units(1458));
        assert_eq!(summary.discounts, Price::from_units(162));
        assert_eq!(summary.loyalty.discount_percent, 5);
        assert_eq!(units_sold(&orders.for_user(shopper).unwrap()), 36);
    }
}
