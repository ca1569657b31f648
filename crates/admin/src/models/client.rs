//! CRM client records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ferreteria_core::{ClientId, ClientKind, ClientStatus, Email, Phone, Price, TaxId};

/// Tax data used on invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalData {
    /// RFC, upper-case. Empty when unknown.
    #[serde(default)]
    pub rfc: String,
    /// SAT tax regime code.
    #[serde(alias = "regimenFiscal")]
    pub regime: String,
    #[serde(alias = "codigoPostal", default)]
    pub postal_code: String,
    /// CFDI use code.
    #[serde(alias = "usoCFDI")]
    pub cfdi_use: String,
}

impl Default for FiscalData {
    fn default() -> Self {
        Self {
            rfc: String::new(),
            regime: "605".to_string(),
            postal_code: String::new(),
            cfdi_use: "G03".to_string(),
        }
    }
}

/// Discount and credit terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialTerms {
    /// Highest discount a seller may grant, in percent.
    #[serde(alias = "descuentoMaximo")]
    pub max_discount: Decimal,
    #[serde(alias = "creditoDisponible")]
    pub credit_available: Price,
    #[serde(alias = "limiteCredito")]
    pub credit_limit: Price,
    #[serde(alias = "diasCredito")]
    pub credit_days: u32,
    #[serde(alias = "bloqueado", default)]
    pub blocked: bool,
}

impl Default for CommercialTerms {
    fn default() -> Self {
        Self {
            max_discount: Decimal::from(5),
            credit_available: Price::from_units(5000),
            credit_limit: Price::from_units(5000),
            credit_days: 30,
            blocked: false,
        }
    }
}

impl CommercialTerms {
    /// Credit limit minus what is still available.
    #[must_use]
    pub fn credit_used(&self) -> Price {
        self.credit_limit - self.credit_available
    }
}

/// A client of the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "razonSocial", default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(alias = "contacto", default)]
    pub contact: String,
    #[serde(alias = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "tipoCliente", default)]
    pub kind: ClientKind,
    #[serde(alias = "estado", default)]
    pub status: ClientStatus,
    #[serde(alias = "fechaRegistro")]
    pub registered_at: DateTime<Utc>,
    #[serde(alias = "fechaUltimaCompra", default, skip_serializing_if = "Option::is_none")]
    pub last_purchase_at: Option<DateTime<Utc>>,
    /// Assigned salesperson.
    #[serde(alias = "vendedorAsignado", default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(alias = "datosFiscales", default)]
    pub fiscal: FiscalData,
    #[serde(alias = "condicionesComerciales", default)]
    pub terms: CommercialTerms,
    #[serde(alias = "notas", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Client {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ClientStatus::Active
    }

    /// Name printed on invoices: the legal name when there is one.
    #[must_use]
    pub fn invoice_name(&self) -> &str {
        self.legal_name.as_deref().unwrap_or(&self.name)
    }

    /// Case-insensitive substring match over name, contact, email and RFC,
    /// plus a digit match on the phone. An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let text_match = [&self.name, &self.contact, &self.email, &self.fiscal.rfc]
            .iter()
            .any(|field| field.to_lowercase().contains(&query));
        text_match || (!self.phone.is_empty() && self.phone.contains(&query))
    }
}

/// Fields supplied when registering a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub kind: ClientKind,
    #[serde(default)]
    pub seller: Option<String>,
    /// Defaults to regime `605`, CFDI use `G03`.
    #[serde(default)]
    pub fiscal: Option<FiscalData>,
    /// Defaults to a 5 % cap, 5000 credit over 30 days.
    #[serde(default)]
    pub terms: Option<CommercialTerms>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewClient {
    /// Check and normalize the input.
    ///
    /// The phone keeps only its digits and the RFC is upper-cased.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the invalid field.
    pub fn normalized(mut self) -> Result<Self, String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        self.name = self.name.trim().to_string();

        if !self.email.trim().is_empty() {
            let email = Email::parse(&self.email).map_err(|e| format!("email: {e}"))?;
            self.email = email.into_inner();
        }
        if !self.phone.trim().is_empty() {
            let phone = Phone::parse(&self.phone).map_err(|e| format!("phone: {e}"))?;
            self.phone = phone.as_str().to_string();
        }
        if let Some(fiscal) = self.fiscal.as_mut() {
            if !fiscal.rfc.trim().is_empty() {
                let rfc = TaxId::parse(&fiscal.rfc).map_err(|e| format!("rfc: {e}"))?;
                fiscal.rfc = rfc.as_str().to_string();
            }
        }
        Ok(self)
    }

    /// Build the stored record.
    #[must_use]
    pub fn into_client(self, id: ClientId, now: DateTime<Utc>) -> Client {
        Client {
            id,
            name: self.name,
            legal_name: self.legal_name,
            contact: self.contact,
            phone: self.phone,
            email: self.email,
            kind: self.kind,
            status: ClientStatus::Active,
            registered_at: now,
            last_purchase_at: None,
            seller: self.seller,
            fiscal: self.fiscal.unwrap_or_default(),
            terms: self.terms.unwrap_or_default(),
            notes: self.notes,
        }
    }
}

/// Partial update of a client. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<ClientStatus>,
    pub seller: Option<String>,
    pub fiscal: Option<FiscalData>,
    pub terms: Option<CommercialTerms>,
    pub notes: Option<String>,
}

impl ClientPatch {
    /// Apply the patch, validating any contact or fiscal field it touches.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the invalid field. The client is
    /// left unchanged on error.
    pub fn apply(self, client: &mut Client) -> Result<(), String> {
        let mut updated = client.clone();

        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err("name is required".to_string());
            }
            updated.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            updated.email = Email::parse(&email)
                .map_err(|e| format!("email: {e}"))?
                .into_inner();
        }
        if let Some(phone) = self.phone {
            updated.phone = Phone::parse(&phone)
                .map_err(|e| format!("phone: {e}"))?
                .as_str()
                .to_string();
        }
        if let Some(mut fiscal) = self.fiscal {
            if !fiscal.rfc.trim().is_empty() {
                fiscal.rfc = TaxId::parse(&fiscal.rfc)
                    .map_err(|e| format!("rfc: {e}"))?
                    .as_str()
                    .to_string();
            }
            updated.fiscal = fiscal;
        }
        if self.legal_name.is_some() {
            updated.legal_name = self.legal_name;
        }
        if let Some(contact) = self.contact {
            updated.contact = contact;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if self.seller.is_some() {
            updated.seller = self.seller;
        }
        if let Some(terms) = self.terms {
            updated.terms = terms;
        }
        if self.notes.is_some() {
            updated.notes = self.notes;
        }

        *client = updated;
        Ok(())
    }
}

/// Purchase statistics for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    /// Orders paid, delivered or invoiced.
    pub completed_purchases: usize,
    pub total_amount: Price,
    pub average_purchase: Price,
    pub last_purchase: Option<DateTime<Utc>>,
    /// Orders pending or confirmed.
    pub open_orders: usize,
    pub credit_used: Price,
    /// Nominal payment time; not tracked per payment.
    pub average_payment_days: u32,
}

/// Registry-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySummary {
    pub total_clients: usize,
    pub active_clients: usize,
    pub inactive_clients: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub sales_today: Price,
    pub sales_this_month: Price,
    pub pending_invoices: usize,
    /// Confirmed orders on deferred payment terms.
    pub receivable_credit: Price,
}
