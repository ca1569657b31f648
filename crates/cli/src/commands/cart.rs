//! Cart and checkout commands.

use serde_json::json;
use tracing::info;

use ferreteria_admin::AdminState;
use ferreteria_core::ProductId;
use ferreteria_storefront::models::CustomerRef;

use super::{CommandResult, print_json};

/// Name used when nobody is signed in and no customer is given.
const WALK_IN_CUSTOMER: &str = "Cliente mostrador";

pub fn show(state: &AdminState) -> CommandResult {
    let cart = state.app().cart()?;
    let orders = state.app().orders();
    let totals = cart.totals(orders.policy());
    print_json(&json!({
        "cart": cart.namespace().key(),
        "lines": cart.lines(),
        "itemCount": cart.item_count(),
        "totals": totals,
        "remainingForDiscount": orders.policy().remaining_for_discount(totals.subtotal),
    }))
}

pub fn add(state: &AdminState, product: ProductId, quantity: u32) -> CommandResult {
    let product = state.app().catalog().get(product)?;
    let cart = state.app().cart()?;
    let line = cart.add_product(&product, quantity)?;
    print_json(&line)
}

pub fn set(state: &AdminState, product: ProductId, quantity: u32) -> CommandResult {
    let cart = state.app().cart()?;
    if !cart.set_quantity(product, quantity)? {
        return Err(format!("Product {product} is not in the cart").into());
    }
    print_json(&cart.lines())
}

pub fn remove(state: &AdminState, product: ProductId) -> CommandResult {
    let cart = state.app().cart()?;
    if !cart.remove(product)? {
        return Err(format!("Product {product} is not in the cart").into());
    }
    print_json(&cart.lines())
}

pub fn clear(state: &AdminState) -> CommandResult {
    let cart = state.app().cart()?;
    cart.clear()?;
    print_json(&json!({ "cart": cart.namespace().key(), "lines": [] }))
}

/// Place an order for the cart, on behalf of the signed-in shopper.
pub fn checkout(state: &AdminState, payment: Option<&str>, customer: Option<String>) -> CommandResult {
    let session = state.app().session().current_session()?;
    let name = customer
        .or_else(|| {
            session
                .as_ref()
                .map(|s| s.name.clone().unwrap_or_else(|| s.username.clone()))
        })
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string());
    let customer = CustomerRef {
        user_id: session.as_ref().and_then(|s| s.id),
        email: session.and_then(|s| s.email),
        ..CustomerRef::named(name)
    };

    let cart = state.app().cart()?;
    let order = state.app().orders().checkout(&cart, payment, customer)?;
    info!(folio = %order.folio, total = %order.total, "Checked out");
    print_json(&order)
}
