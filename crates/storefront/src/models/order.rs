//! Orders and the drafts they are created from.
//!
//! Storefront checkouts and back-office sales orders share one record
//! shape. Lines carry an optional per-line discount and tax; cart checkouts
//! leave both at zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ferreteria_core::{
    ClientId, OrderId, OrderStatus, PaymentMethod, PaymentTerms, Price, ProductId, Quantity,
    UserId,
};

use super::{CartLine, SessionRecord};

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Catalog code (SKU).
    #[serde(alias = "codigo", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(alias = "nombre", alias = "producto")]
    pub name: String,
    #[serde(alias = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "cantidad")]
    pub quantity: Quantity,
    #[serde(alias = "precio")]
    pub unit_price: Price,
    #[serde(alias = "descuento", default)]
    pub discount: Price,
    #[serde(alias = "impuestos", default)]
    pub tax: Price,
    /// `unit_price * quantity - discount + tax`.
    #[serde(alias = "subtotalProducto", default)]
    pub total: Price,
}

impl OrderLine {
    /// A plain line with no discount or tax.
    #[must_use]
    pub fn new(
        product_id: Option<ProductId>,
        name: impl Into<String>,
        unit_price: Price,
        quantity: Quantity,
    ) -> Self {
        let mut line = Self {
            product_id,
            code: None,
            name: name.into(),
            description: None,
            quantity,
            unit_price,
            discount: Price::ZERO,
            tax: Price::ZERO,
            total: Price::ZERO,
        };
        line.total = line.net();
        line
    }

    /// Set the per-line discount and tax, recomputing the total.
    #[must_use]
    pub fn with_adjustments(mut self, discount: Price, tax: Price) -> Self {
        self.discount = discount;
        self.tax = tax;
        self.total = self.net();
        self
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn gross(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Gross less discount plus tax.
    #[must_use]
    pub fn net(&self) -> Price {
        self.gross() - self.discount + self.tax
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self::new(Some(line.id), line.name.clone(), line.price, line.quantity)
    }
}

/// Who an order is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    /// Display name.
    pub name: String,
    /// CRM client, for back-office sales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    /// Signed-in shopper, for storefront checkouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerRef {
    /// A customer known only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Everything needed to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer: CustomerRef,
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub payment_terms: PaymentTerms,
    /// Salesperson, for back-office orders.
    pub seller: Option<String>,
    pub notes: Option<String>,
    /// Apply the volume discount on the subtotal.
    pub apply_volume_discount: bool,
}

impl OrderDraft {
    /// A storefront checkout draft: cart lines, volume discount applied,
    /// paid in one installment.
    #[must_use]
    pub fn from_cart(lines: &[CartLine], payment_method: PaymentMethod, customer: CustomerRef) -> Self {
        Self {
            customer,
            lines: lines.iter().map(OrderLine::from).collect(),
            payment_method,
            payment_terms: PaymentTerms::SinglePayment,
            seller: None,
            notes: None,
            apply_volume_discount: true,
        }
    }
}

/// A finalized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Internal folio, `PV-000001`.
    #[serde(alias = "folioInterno", default)]
    pub folio: String,
    /// Customer display name.
    #[serde(alias = "cliente")]
    pub customer: String,
    #[serde(alias = "clienteId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(alias = "usuarioId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(alias = "vendedor", default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(alias = "productos", default)]
    pub lines: Vec<OrderLine>,
    pub subtotal: Price,
    /// Line discounts plus the volume discount.
    #[serde(alias = "descuento", default)]
    pub discount: Price,
    #[serde(alias = "impuestos", default)]
    pub tax: Price,
    pub total: Price,
    /// Whether the volume discount was applied.
    #[serde(alias = "aplicaDescuento", default)]
    pub discount_applied: bool,
    #[serde(alias = "formaPago", default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(alias = "estatus", alias = "estado", default)]
    pub status: OrderStatus,
    #[serde(alias = "fechaVenta")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(alias = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Format the internal folio for a counter value.
    #[must_use]
    pub fn folio_for(counter: u64) -> String {
        format!("PV-{counter:06}")
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Whether the order belongs to the given client id or email.
    #[must_use]
    pub fn belongs_to(&self, client: Option<ClientId>, email: Option<&str>) -> bool {
        let by_id = client.is_some_and(|id| self.client_id == Some(id));
        let by_email = email.is_some_and(|email| {
            self.customer_email
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(email.trim()))
        });
        by_id || by_email
    }
}

/// A record of the `compras_realizadas` purchase history written by older
/// builds. Read only: new purchases go to the order ledger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Purchase {
    pub id: OrderId,
    #[serde(rename = "cliente", default)]
    pub customer: String,
    /// Shopper reference: an email, a username or a numeric account id.
    #[serde(rename = "usuarioId", default)]
    pub user_ref: Option<Value>,
    #[serde(rename = "productos", default)]
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub subtotal: Price,
    #[serde(rename = "descuento", default)]
    pub discount: Price,
    #[serde(default)]
    pub total: Price,
    #[serde(rename = "metodoPago", default)]
    pub payment_method: String,
    /// RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "estado", default)]
    pub status: String,
    #[serde(rename = "aplicaDescuento", default)]
    pub discount_applied: bool,
}

impl Purchase {
    /// The shopper reference as text.
    #[must_use]
    pub fn user_ref(&self) -> Option<String> {
        match self.user_ref.as_ref()? {
            Value::String(text) => Some(text.trim().to_owned()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Whether the purchase was made by the signed-in shopper.
    ///
    /// Matches the reference against the account id and email, and the
    /// customer name against the email, display name and username. All
    /// comparisons are exact.
    #[must_use]
    pub fn made_by(&self, session: &SessionRecord) -> bool {
        let id = session.id.map(|id| id.to_string());
        let reference = self.user_ref();
        let by_reference = reference.as_deref().is_some_and(|r| {
            !r.is_empty() && (Some(r) == session.email.as_deref() || Some(r) == id.as_deref())
        });
        let customer = self.customer.trim();
        let by_customer = !customer.is_empty()
            && [
                session.email.as_deref(),
                session.name.as_deref(),
                Some(session.username.as_str()),
            ]
            .into_iter()
            .flatten()
            .any(|name| name == customer);
        by_reference || by_customer
    }

    /// When the purchase was made. `None` if the date is unreadable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let date = self.date.trim();
        DateTime::parse_from_rfc3339(date)
            .map(|at| at.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .ok()
                    .and_then(|day| day.and_hms_opt(0, 0, 0))
                    .map(|at| at.and_utc())
            })
    }

    /// The purchase in order form, or `None` if its date is unreadable.
    ///
    /// Unknown status and payment names fall back to pending and cash.
    #[must_use]
    pub fn to_order(&self) -> Option<Order> {
        let created_at = self.created_at()?;
        let user_id = self
            .user_ref()
            .and_then(|r| r.parse::<i64>().ok())
            .map(UserId::new);
        Some(Order {
            id: self.id,
            folio: String::new(),
            customer: self.customer.clone(),
            client_id: None,
            user_id,
            customer_email: None,
            seller: None,
            lines: self.lines.clone(),
            subtotal: self.subtotal,
            discount: self.discount,
            tax: Price::ZERO,
            total: self.total,
            discount_applied: self.discount_applied,
            payment_method: self.payment_method.parse().unwrap_or_default(),
            payment_terms: PaymentTerms::SinglePayment,
            status: self.status.parse().unwrap_or_default(),
            created_at,
            updated_at: None,
            notes: None,
        })
    }
}
