//! Discount and checkout calculator.
//!
//! Pure functions of the cart lines:
//!
//! - `subtotal = Σ(quantity × price)`
//! - `discount = subtotal × rate` when `subtotal >= threshold`, else zero,
//!   rounded to cents
//! - `total = subtotal − discount`
//!
//! Checkout validation rejects an empty cart before looking at the payment
//! method, so an empty cart fails the same way whatever was chosen.

mod error;

pub use error::CheckoutError;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ferreteria_core::{PaymentMethod, Price};

use crate::models::CartLine;

/// Volume discount: a flat rate once the subtotal reaches a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    threshold: Price,
    rate: Decimal,
}

impl Default for DiscountPolicy {
    /// $500 threshold, 10 % rate.
    fn default() -> Self {
        Self::new(Price::from_units(500), Decimal::new(10, 2))
    }
}

impl DiscountPolicy {
    /// Create a policy. `rate` is a fraction (`0.10` for ten percent).
    #[must_use]
    pub const fn new(threshold: Price, rate: Decimal) -> Self {
        Self { threshold, rate }
    }

    /// Minimum subtotal for the discount.
    #[must_use]
    pub const fn threshold(&self) -> Price {
        self.threshold
    }

    /// Discount rate as a fraction.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }

    /// Discount rate as a percentage (`10` for `0.10`).
    #[must_use]
    pub fn rate_percent(&self) -> Decimal {
        (self.rate * Decimal::ONE_HUNDRED).normalize()
    }

    /// Whether a subtotal qualifies for the discount.
    #[must_use]
    pub fn applies_to(&self, subtotal: Price) -> bool {
        subtotal >= self.threshold
    }

    /// How much more must be spent to reach the threshold.
    #[must_use]
    pub fn remaining_for_discount(&self, subtotal: Price) -> Price {
        if self.applies_to(subtotal) {
            Price::ZERO
        } else {
            self.threshold - subtotal
        }
    }

    /// Discount for a subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Price) -> Price {
        if self.applies_to(subtotal) {
            subtotal.portion(self.rate)
        } else {
            Price::ZERO
        }
    }

    /// Totals for a subtotal with no tax.
    #[must_use]
    pub fn totals_for(&self, subtotal: Price) -> Totals {
        let discount_applied = self.applies_to(subtotal);
        let discount = self.discount_for(subtotal);
        Totals {
            subtotal,
            discount,
            tax: Price::ZERO,
            total: subtotal - discount,
            discount_applied,
        }
    }

    /// Totals for a set of cart lines.
    #[must_use]
    pub fn totals(&self, lines: &[CartLine]) -> Totals {
        let totals = self.totals_for(subtotal(lines));
        debug!(
            lines = lines.len(),
            subtotal = %totals.subtotal,
            discount = %totals.discount,
            total = %totals.total,
            "Computed cart totals"
        );
        totals
    }
}

/// Computed order amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Price,
    pub discount: Price,
    pub tax: Price,
    pub total: Price,
    /// Whether the volume discount applied.
    pub discount_applied: bool,
}

/// `Σ(quantity × price)` over the lines.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Total units across the lines.
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u64 {
    lines.iter().map(|l| u64::from(l.quantity)).sum()
}

/// Parse a payment method name and check the checkout accepts it.
///
/// Accepts `efectivo`/`cash` and `tarjeta`/`card`, case-insensitive.
///
/// # Errors
///
/// Returns `CheckoutError::MissingPaymentMethod` for a blank name and
/// `CheckoutError::UnsupportedPaymentMethod` otherwise.
pub fn parse_payment_method(raw: Option<&str>) -> Result<PaymentMethod, CheckoutError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(CheckoutError::MissingPaymentMethod);
    };
    raw.parse::<PaymentMethod>()
        .ok()
        .filter(|method| method.accepted_at_checkout())
        .ok_or_else(|| CheckoutError::UnsupportedPaymentMethod(raw.to_owned()))
}

/// Validate a checkout attempt.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there are no lines, regardless of
/// the payment method; otherwise the errors of [`parse_payment_method`].
pub fn validate(lines: &[CartLine], payment: Option<&str>) -> Result<PaymentMethod, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    parse_payment_method(payment)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ferreteria_core::ProductId;

    use super::*;

    fn line(id: i64, price: i64, quantity: u32) -> CartLine {
        CartLine::new(ProductId::new(id), format!("producto {id}"), Price::from_units(price), quantity)
    }

    #[test]
    fn test_below_threshold_no_discount() {
        let lines = vec![line(1, 45, 2), line(2, 35, 1)];
        let totals = DiscountPolicy::default().totals(&lines);
        assert_eq!(totals.subtotal, Price::from_units(125));
        assert_eq!(totals.discount, Price::ZERO);
        assert_eq!(totals.total, Price::from_units(125));
        assert!(!totals.discount_applied);
    }

    #[test]
    fn test_above_threshold_discount() {
        let totals = DiscountPolicy::default().totals(&[line(1, 300, 2)]);
        assert_eq!(totals.subtotal, Price::from_units(600));
        assert_eq!(totals.discount, Price::from_units(60));
        assert_eq!(totals.total, Price::from_units(540));
        assert!(totals.discount_applied);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = DiscountPolicy::default();
        assert_eq!(policy.discount_for(Price::from_units(500)), Price::from_units(50));
        assert_eq!(policy.discount_for(Price::from_cents(49_999)), Price::ZERO);
    }

    #[test]
    fn test_discount_rounds_to_cents() {
        let policy = DiscountPolicy::default();
        assert_eq!(policy.discount_for(Price::from_cents(50_005)), Price::from_cents(5_001));
    }

    #[test]
    fn test_remaining_for_discount() {
        let policy = DiscountPolicy::default();
        assert_eq!(policy.remaining_for_discount(Price::from_units(125)), Price::from_units(375));
        assert_eq!(policy.remaining_for_discount(Price::from_units(900)), Price::ZERO);
    }

    #[test]
    fn test_rate_percent() {
        assert_eq!(DiscountPolicy::default().rate_percent(), Decimal::from(10));
    }

    #[test]
    fn test_empty_cart_fails_for_any_payment() {
        for payment in [None, Some(""), Some("efectivo"), Some("tarjeta"), Some("bitcoin")] {
            assert!(matches!(validate(&[], payment), Err(CheckoutError::EmptyCart)));
        }
    }

    #[test]
    fn test_payment_validation() {
        let lines = vec![line(1, 45, 1)];
        assert_eq!(validate(&lines, Some("Efectivo")).unwrap(), PaymentMethod::Cash);
        assert_eq!(validate(&lines, Some(" TARJETA ")).unwrap(), PaymentMethod::Card);
        assert!(matches!(validate(&lines, None), Err(CheckoutError::MissingPaymentMethod)));
        assert!(matches!(validate(&lines, Some("  ")), Err(CheckoutError::MissingPaymentMethod)));
        assert!(matches!(
            validate(&lines, Some("transferencia")),
            Err(CheckoutError::UnsupportedPaymentMethod(_))
        ));
    }

    #[test]
    fn test_item_count() {
        assert_eq!(item_count(&[line(1, 45, 2), line(2, 35, 3)]), 5);
    }
}
