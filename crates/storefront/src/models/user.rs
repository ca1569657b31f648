//! Registered accounts and the persisted session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ferreteria_core::{Email, Role, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(alias = "fechaRegistro")]
    pub created_at: DateTime<Utc>,
}

/// The signed-in user as stored under `userData`.
///
/// The role is written twice, as `role` (`admin`/`user`) and as `rol`
/// (`admin`/`usuario`). Both are kept as raw strings because resolution
/// only cares whether either equals the admin sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: String,
    #[serde(alias = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

impl SessionRecord {
    /// Session record for an account acting with `role`.
    #[must_use]
    pub fn for_account(account: &Account, role: Role) -> Self {
        Self {
            id: Some(account.id),
            username: account.username.clone(),
            name: Some(account.username.clone()),
            email: Some(account.email.as_str().to_owned()),
            role: None,
            rol: None,
        }
        .with_role(role)
    }

    /// Rewrite both role fields.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role.to_string());
        self.rol = Some(role.legacy_name().to_owned());
        self
    }

    /// Role declared by the record itself, if it carries either role field.
    ///
    /// Admin when either field equals the admin sentinel, user otherwise.
    #[must_use]
    pub fn declared_role(&self) -> Option<Role> {
        let fields = [self.role.as_deref(), self.rol.as_deref()];
        if fields.iter().all(Option::is_none) {
            return None;
        }
        let admin = fields.iter().flatten().any(|raw| Role::is_admin_value(raw));
        Some(if admin { Role::Admin } else { Role::User })
    }

    /// Name to show for this session.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}
