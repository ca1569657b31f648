//! Mock tax invoices (CFDI).
//!
//! The seals and the certificate number only mimic the shape of real SAT
//! stamps. They carry no cryptographic or legal meaning.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ferreteria_core::{CurrencyCode, InvoiceId, InvoiceStatus, OrderId, PaymentMethod, PaymentTerms, Price};
use ferreteria_storefront::models::OrderLine;

/// Invoice series.
pub const SERIES: &str = "A";

/// Certificate number stamped on every invoice.
pub const SAT_CERTIFICATE: &str = "30001000000400002495";

/// Length of a mock seal.
pub const SEAL_LEN: usize = 64;

/// Digits in an invoice folio.
pub const FOLIO_DIGITS: usize = 8;

/// A mock CFDI invoice generated from an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub uuid: Uuid,
    #[serde(alias = "serie")]
    pub series: String,
    /// Zero-padded counter, `00000001`.
    pub folio: String,
    #[serde(alias = "fecha")]
    pub issued_at: DateTime<Utc>,
    #[serde(alias = "pedidoId")]
    pub order_id: OrderId,

    #[serde(alias = "emisorRFC")]
    pub issuer_rfc: String,
    #[serde(alias = "emisorNombre")]
    pub issuer_name: String,

    #[serde(alias = "receptorRFC")]
    pub receiver_rfc: String,
    #[serde(alias = "receptorNombre")]
    pub receiver_name: String,
    #[serde(alias = "receptorUsoCFDI")]
    pub receiver_cfdi_use: String,

    #[serde(alias = "metodoPago", default)]
    pub payment_terms: PaymentTerms,
    #[serde(alias = "formaPago", default)]
    pub payment_method: PaymentMethod,
    #[serde(alias = "moneda", default)]
    pub currency: CurrencyCode,
    #[serde(alias = "tipoCambio", default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,

    pub subtotal: Price,
    #[serde(alias = "descuento", default)]
    pub discount: Price,
    #[serde(alias = "impuestos", default)]
    pub tax: Price,
    pub total: Price,

    #[serde(alias = "estatus", default)]
    pub status: InvoiceStatus,
    #[serde(alias = "fechaCancelacion", default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(alias = "motivoCancelacion", default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,

    /// Order lines copied at invoicing time.
    #[serde(alias = "conceptos", default)]
    pub concepts: Vec<OrderLine>,

    #[serde(alias = "fechaTimbrado")]
    pub stamped_at: DateTime<Utc>,
    #[serde(alias = "selloCFD")]
    pub cfd_seal: String,
    #[serde(alias = "selloSAT")]
    pub sat_seal: String,
    #[serde(alias = "certificadoSAT")]
    pub sat_certificate: String,
}

impl Invoice {
    /// Format the folio for a counter value.
    #[must_use]
    pub fn folio_for(counter: u64) -> String {
        format!("{counter:0width$}", width = FOLIO_DIGITS)
    }

    /// `A-00000001`.
    #[must_use]
    pub fn full_folio(&self) -> String {
        format!("{}-{}", self.series, self.folio)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == InvoiceStatus::Cancelled
    }
}

/// A random string of upper-case hex digits, shaped like a seal.
pub fn mock_seal<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEAL_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..16), 16))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
