//! Suppliers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use ferreteria_core::{Email, SupplierId};

/// A supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    /// Contact person.
    #[serde(alias = "nombre")]
    pub name: String,
    /// Phone as entered, e.g. `(555) 234-5678`.
    #[serde(alias = "telefono")]
    pub phone: String,
    #[serde(alias = "empresa")]
    pub company: String,
    #[serde(alias = "correo")]
    pub email: String,
    /// Start of the relationship.
    #[serde(alias = "fecha")]
    pub since: NaiveDate,
}

impl Supplier {
    /// Whole years between `since` and `today`, never negative.
    #[must_use]
    pub fn years_active(&self, today: NaiveDate) -> u32 {
        today.years_since(self.since).unwrap_or(0)
    }

    /// Suppliers with at least a year of history.
    #[must_use]
    pub fn is_premium(&self, today: NaiveDate) -> bool {
        self.years_active(today) >= 1
    }

    /// Year the relationship started.
    #[must_use]
    pub fn since_year(&self) -> i32 {
        self.since.year()
    }
}

/// Fields supplied when adding or editing a supplier. All are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub phone: String,
    pub company: String,
    pub email: String,
    pub since: NaiveDate,
}

impl NewSupplier {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the invalid field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("company", &self.company),
            ("email", &self.email),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        Email::parse(&self.email).map_err(|e| format!("email: {e}"))?;
        Ok(())
    }

    #[must_use]
    pub fn into_supplier(self, id: SupplierId) -> Supplier {
        Supplier {
            id,
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            company: self.company.trim().to_string(),
            email: self.email.trim().to_string(),
            since: self.since,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn supplier(since: NaiveDate) -> Supplier {
        Supplier {
            id: SupplierId::new(1),
            name: "Carlos Mendoza".to_string(),
            phone: "(555) 234-5678".to_string(),
            company: "Herramientas del Norte S.A.".to_string(),
            email: "ventas@herramientasnorte.com".to_string(),
            since,
        }
    }

    #[test]
    fn test_years_active() {
        let s = supplier(date(2023, 1, 15));
        assert_eq!(s.years_active(date(2024, 1, 14)), 0);
        assert_eq!(s.years_active(date(2024, 1, 15)), 1);
        assert_eq!(s.years_active(date(2026, 10, 18)), 3);
        assert_eq!(s.years_active(date(2020, 1, 1)), 0);
        assert!(s.is_premium(date(2024, 6, 1)));
        assert!(!s.is_premium(date(2023, 6, 1)));
    }

    #[test]
    fn test_legacy_json() {
        let raw = r#"{"id":2,"nombre":"Ana Patricia López","telefono":"(555) 345-6789",
            "empresa":"Materiales de Construcción López","correo":"contacto@materialeslopez.mx","fecha":"2022-08-22"}"#;
        let s: Supplier = serde_json::from_str(raw).unwrap();
        assert_eq!(s.since, date(2022, 8, 22));
        assert_eq!(s.since_year(), 2022);
    }

    #[test]
    fn test_validate() {
        let mut input = NewSupplier {
            name: "Roberto Silva".to_string(),
            phone: "(555) 456-7890".to_string(),
            company: "Tornillería Especializada RSP".to_string(),
            email: "pedidos@tornilleriarp.com".to_string(),
            since: date(2023, 3, 10),
        };
        assert!(input.validate().is_ok());
        input.company = String::new();
        assert_eq!(input.validate().unwrap_err(), "company is required");
    }
}
