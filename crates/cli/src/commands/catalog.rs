//! Product catalog commands.

use ferreteria_admin::AdminState;
use ferreteria_core::ProductId;
use ferreteria_storefront::models::NewProduct;

use super::{CommandResult, current_role, print_json};

pub fn list(state: &AdminState) -> CommandResult {
    print_json(&state.app().catalog().list()?)
}

pub fn search(state: &AdminState, query: &str) -> CommandResult {
    print_json(&state.app().catalog().search(query)?)
}

pub fn add(state: &AdminState, input: NewProduct) -> CommandResult {
    let role = current_role(state)?;
    print_json(&state.app().catalog().create(role, input)?)
}

pub fn update(state: &AdminState, id: ProductId, input: NewProduct) -> CommandResult {
    let role = current_role(state)?;
    print_json(&state.app().catalog().update(role, id, input)?)
}

pub fn delete(state: &AdminState, id: ProductId) -> CommandResult {
    let role = current_role(state)?;
    print_json(&state.app().catalog().delete(role, id)?)
}
