//! Client registry, invoice and supplier commands. All admin only.

use serde_json::json;
use uuid::Uuid;

use ferreteria_admin::AdminState;
use ferreteria_admin::models::{FiscalData, NewClient, NewSupplier};
use ferreteria_core::{ClientId, ClientKind, OrderId, SupplierId};

use super::{CommandResult, admin_role, print_json};

/// Build client input from command-line fields.
#[must_use]
pub fn client_input(
    name: String,
    email: String,
    phone: String,
    contact: String,
    kind: ClientKind,
    rfc: Option<String>,
    seller: Option<String>,
) -> NewClient {
    NewClient {
        name,
        email,
        phone,
        contact,
        kind,
        seller,
        fiscal: rfc.map(|rfc| FiscalData {
            rfc,
            ..FiscalData::default()
        }),
        ..NewClient::default()
    }
}

pub fn list_clients(state: &AdminState) -> CommandResult {
    admin_role(state)?;
    print_json(&state.clients().list()?)
}

pub fn search_clients(state: &AdminState, query: &str) -> CommandResult {
    admin_role(state)?;
    print_json(&state.clients().search(query)?)
}

pub fn add_client(state: &AdminState, input: NewClient) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.clients().create(role, input)?)
}

pub fn deactivate_client(state: &AdminState, id: ClientId) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.clients().deactivate(role, id)?)
}

pub fn client_stats(state: &AdminState, id: ClientId) -> CommandResult {
    admin_role(state)?;
    let clients = state.clients();
    let client = clients.get(id)?;
    print_json(&json!({
        "client": client,
        "stats": clients.stats(id)?,
        "invoices": state.invoices().for_client(id)?,
    }))
}

pub fn summary(state: &AdminState) -> CommandResult {
    admin_role(state)?;
    print_json(&state.clients().summary()?)
}

pub fn list_invoices(state: &AdminState) -> CommandResult {
    admin_role(state)?;
    print_json(&state.invoices().list()?)
}

pub fn create_invoice(state: &AdminState, order: OrderId) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.invoices().create_from_order(role, order)?)
}

pub fn cancel_invoice(state: &AdminState, uuid: Uuid, reason: &str) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.invoices().cancel(role, uuid, reason)?)
}

pub fn list_suppliers(state: &AdminState) -> CommandResult {
    admin_role(state)?;
    print_json(&state.suppliers().list()?)
}

pub fn add_supplier(state: &AdminState, input: NewSupplier) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.suppliers().create(role, input)?)
}

pub fn delete_supplier(state: &AdminState, id: SupplierId) -> CommandResult {
    let role = admin_role(state)?;
    print_json(&state.suppliers().delete(role, id)?)
}
