//! Status, role and payment enums.
//!
//! Persisted documents were written by several generations of the app, so
//! the same value shows up as `"Pendiente"`, `"pendiente"` or `"pending"`.
//! Each enum serializes one canonical snake_case spelling and accepts the
//! older ones through `serde(alias)` and a case-insensitive `FromStr`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known enum value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office access: catalog, orders, clients, invoices.
    #[serde(alias = "Admin", alias = "ADMIN", alias = "administrador")]
    Admin,
    /// Shopper.
    #[default]
    #[serde(alias = "usuario", alias = "User", alias = "Usuario")]
    User,
}

impl Role {
    /// Sentinel stored in the session fields for administrators.
    pub const ADMIN_SENTINEL: &'static str = "admin";

    /// Whether a raw stored role string denotes an administrator.
    #[must_use]
    pub fn is_admin_value(raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(Self::ADMIN_SENTINEL)
    }

    /// Spelling used by the older `rol` session field.
    #[must_use]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "usuario",
        }
    }

    /// The other role.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Admin => Self::User,
            Self::User => Self::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrador" => Ok(Self::Admin),
            "user" | "usuario" => Ok(Self::User),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

// =============================================================================
// Order status
// =============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "Pendiente", alias = "pendiente")]
    Pending,
    #[serde(alias = "Confirmado", alias = "confirmado")]
    Confirmed,
    #[serde(alias = "Procesando", alias = "procesando")]
    Processing,
    #[serde(alias = "Pagado", alias = "pagado")]
    Paid,
    #[serde(alias = "Enviado", alias = "enviado")]
    Shipped,
    #[serde(alias = "Entregado", alias = "entregado")]
    Delivered,
    #[serde(alias = "Facturado", alias = "facturado")]
    Invoiced,
    #[serde(alias = "Cancelado", alias = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Paid,
        Self::Shipped,
        Self::Delivered,
        Self::Invoiced,
        Self::Cancelled,
    ];

    /// Counts as a completed sale (paid, delivered or invoiced).
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Paid | Self::Delivered | Self::Invoiced)
    }

    /// Still awaiting action from the store (pending or confirmed).
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Invoiced => "invoiced",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Ok(Self::Pending),
            "confirmed" | "confirmado" => Ok(Self::Confirmed),
            "processing" | "procesando" => Ok(Self::Processing),
            "paid" | "pagado" => Ok(Self::Paid),
            "shipped" | "enviado" => Ok(Self::Shipped),
            "delivered" | "entregado" => Ok(Self::Delivered),
            "invoiced" | "facturado" => Ok(Self::Invoiced),
            "cancelled" | "canceled" | "cancelado" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError::new("order status", s)),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    #[serde(alias = "efectivo")]
    Cash,
    #[serde(alias = "tarjeta")]
    Card,
    #[serde(alias = "transferencia")]
    Transfer,
    Cheque,
    #[serde(alias = "tarjeta_credito")]
    CreditCard,
    #[serde(alias = "tarjeta_debito")]
    DebitCard,
}

impl PaymentMethod {
    /// Methods accepted at the storefront checkout.
    pub const CHECKOUT: [Self; 2] = [Self::Cash, Self::Card];

    /// Whether the storefront checkout accepts this method.
    #[must_use]
    pub const fn accepted_at_checkout(self) -> bool {
        matches!(self, Self::Cash | Self::Card)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Cheque => "cheque",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(Self::Cash),
            "card" | "tarjeta" => Ok(Self::Card),
            "transfer" | "transferencia" => Ok(Self::Transfer),
            "cheque" => Ok(Self::Cheque),
            "credit_card" | "tarjeta_credito" => Ok(Self::CreditCard),
            "debit_card" | "tarjeta_debito" => Ok(Self::DebitCard),
            _ => Err(ParseEnumError::new("payment method", s)),
        }
    }
}

/// Payment terms printed on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentTerms {
    /// Paid in a single installment (`PUE`).
    #[default]
    #[serde(rename = "PUE")]
    SinglePayment,
    /// Paid in installments or deferred (`PPD`).
    #[serde(rename = "PPD")]
    Deferred,
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePayment => write!(f, "PUE"),
            Self::Deferred => write!(f, "PPD"),
        }
    }
}

impl FromStr for PaymentTerms {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PUE" => Ok(Self::SinglePayment),
            "PPD" => Ok(Self::Deferred),
            _ => Err(ParseEnumError::new("payment terms", s)),
        }
    }
}

// =============================================================================
// Clients and invoices
// =============================================================================

/// Whether a client record is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "inactivo")]
    Inactive,
    #[serde(alias = "suspendido")]
    Suspended,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

/// Legal form of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Individual (`persona física`).
    #[default]
    #[serde(alias = "persona_fisica")]
    Individual,
    /// Company (`persona moral`).
    #[serde(alias = "persona_moral")]
    Company,
}

impl FromStr for ClientKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" | "persona_fisica" => Ok(Self::Individual),
            "company" | "persona_moral" => Ok(Self::Company),
            _ => Err(ParseEnumError::new("client kind", s)),
        }
    }
}

/// Status of a mock tax invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Stamped and in force (`vigente`).
    #[default]
    #[serde(alias = "vigente")]
    Valid,
    #[serde(alias = "cancelada")]
    Cancelled,
    #[serde(alias = "pendiente")]
    Pending,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_admin_value() {
        assert!(Role::is_admin_value("admin"));
        assert!(Role::is_admin_value(" ADMIN "));
        assert!(!Role::is_admin_value("usuario"));
        assert!(!Role::is_admin_value("administrador"));
    }

    #[test]
    fn test_role_legacy_spellings() {
        let role: Role = serde_json::from_str("\"usuario\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(Role::Admin.legacy_name(), "admin");
        assert_eq!(Role::User.legacy_name(), "usuario");
        assert_eq!("Usuario".parse::<Role>().unwrap(), Role::User);
        assert!("guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_toggle() {
        assert_eq!(Role::Admin.toggled(), Role::User);
        assert_eq!(Role::User.toggled(), Role::Admin);
    }

    #[test]
    fn test_order_status_legacy_spellings() {
        for (raw, expected) in [
            ("\"Pendiente\"", OrderStatus::Pending),
            ("\"enviado\"", OrderStatus::Shipped),
            ("\"facturado\"", OrderStatus::Invoiced),
            ("\"cancelled\"", OrderStatus::Cancelled),
        ] {
            let status: OrderStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, expected, "{raw}");
        }
        assert_eq!(serde_json::to_string(&OrderStatus::Delivered).unwrap(), "\"delivered\"");
    }

    #[test]
    fn test_order_status_groups() {
        assert!(OrderStatus::Paid.is_completed());
        assert!(OrderStatus::Invoiced.is_completed());
        assert!(!OrderStatus::Shipped.is_completed());
        assert!(OrderStatus::Confirmed.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("TARJETA".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::Card.accepted_at_checkout());
        assert!(!PaymentMethod::Transfer.accepted_at_checkout());
    }

    #[test]
    fn test_payment_terms_serde() {
        assert_eq!(serde_json::to_string(&PaymentTerms::Deferred).unwrap(), "\"PPD\"");
        assert_eq!("pue".parse::<PaymentTerms>().unwrap(), PaymentTerms::SinglePayment);
    }

    #[test]
    fn test_client_enums_legacy() {
        let kind: ClientKind = serde_json::from_str("\"persona_moral\"").unwrap();
        assert_eq!(kind, ClientKind::Company);
        let status: ClientStatus = serde_json::from_str("\"activo\"").unwrap();
        assert_eq!(status, ClientStatus::Active);
        let status: InvoiceStatus = serde_json::from_str("\"vigente\"").unwrap();
        assert_eq!(status, InvoiceStatus::Valid);
    }
}
