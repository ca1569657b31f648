//! Order ledger commands.

use ferreteria_admin::AdminState;
use ferreteria_core::{OrderId, OrderStatus};
use ferreteria_storefront::services::orders::OrderFilter;
use ferreteria_storefront::services::session::AuthError;

use super::{CommandResult, current_role, print_json};

/// Admins see every order; shoppers see their own, newest first.
pub fn list(state: &AdminState, status: Option<OrderStatus>, customer: Option<String>) -> CommandResult {
    let orders = state.app().orders();
    let filter = OrderFilter { status, customer };
    if current_role(state)?.is_admin() {
        return print_json(&orders.list_filtered(&filter)?);
    }

    let session = state
        .app()
        .session()
        .current_session()?
        .ok_or(AuthError::NotAuthenticated)?;
    let mine: Vec<_> = orders
        .for_shopper(&session)?
        .into_iter()
        .filter(|o| filter.matches(o))
        .collect();
    print_json(&mine)
}

pub fn set_status(state: &AdminState, id: OrderId, status: OrderStatus) -> CommandResult {
    let role = current_role(state)?;
    print_json(&state.app().orders().set_status(role, id, status)?)
}

pub fn delete(state: &AdminState, id: OrderId) -> CommandResult {
    let role = current_role(state)?;
    print_json(&state.app().orders().delete(role, id)?)
}
