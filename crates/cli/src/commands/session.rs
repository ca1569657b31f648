//! Accounts, sign-in and role switching.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::json;

use ferreteria_admin::AdminState;
use ferreteria_core::{Role, UserId};
use ferreteria_storefront::models::Account;

use super::{CommandResult, current_role, print_json};

/// An account without its password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountView {
    id: UserId,
    username: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email.into_inner(),
            role: account.role,
            created_at: account.created_at,
        }
    }
}

pub fn seed(state: &AdminState) -> CommandResult {
    state.seed()?;
    print_json(&json!({ "seeded": true }))
}

pub fn register(state: &AdminState, username: &str, email: &str, password: String) -> CommandResult {
    let account = state
        .app()
        .session()
        .register(username, email, &SecretString::from(password))?;
    print_json(&AccountView::from(account))
}

pub fn login(state: &AdminState, email: &str, password: String) -> CommandResult {
    let session = state.app().session().login(email, &SecretString::from(password))?;
    let role = current_role(state)?;
    print_json(&json!({ "session": session, "role": role }))
}

pub fn logout(state: &AdminState) -> CommandResult {
    state.app().session().logout()?;
    print_json(&json!({ "loggedIn": false }))
}

pub fn whoami(state: &AdminState) -> CommandResult {
    let session = state.app().session().current_session()?;
    let role = current_role(state)?;
    print_json(&json!({
        "loggedIn": session.is_some(),
        "session": session,
        "role": role,
    }))
}

pub fn toggle_role(state: &AdminState) -> CommandResult {
    let role = state.app().session().toggle_role()?;
    print_json(&json!({ "role": role }))
}
