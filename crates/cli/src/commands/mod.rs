//! Command implementations.
//!
//! Each command opens services from the shared [`AdminState`], resolves the
//! caller's role from the stored session and prints its result as JSON.

pub mod cart;
pub mod catalog;
pub mod crm;
pub mod orders;
pub mod reports;
pub mod session;

use ferreteria_admin::{AdminConfig, AdminError, AdminState};
use ferreteria_core::Role;
use ferreteria_storefront::AppError;
use ferreteria_storefront::services::session::{AuthError, require_admin};
use serde::Serialize;
use tracing::{debug, error};

/// Result type shared by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load configuration from the environment and open the store.
///
/// # Errors
///
/// Returns an error if a variable is invalid or the data directory cannot
/// be created.
pub fn open_state() -> Result<AdminState, Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    debug!(data_dir = %config.storefront.data_dir.display(), "Loaded configuration");
    Ok(AdminState::open(config)?)
}

/// Role of whoever is signed in.
pub fn current_role(state: &AdminState) -> Result<Role, AuthError> {
    state.app().session().resolve_role()
}

/// Role of whoever is signed in, which must be admin.
pub fn admin_role(state: &AdminState) -> Result<Role, AuthError> {
    let role = current_role(state)?;
    require_admin(role)?;
    Ok(role)
}

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log a failed command with the short message its error carries, if any.
pub fn report_failure(err: &(dyn std::error::Error + 'static)) {
    if let Some(err) = err.downcast_ref::<AdminError>() {
        err.report();
        error!(message = %err.user_message(), "Command failed");
    } else if let Some(err) = err.downcast_ref::<AppError>() {
        err.report();
        error!(message = %err.user_message(), "Command failed");
    } else {
        error!(error = %err, "Command failed");
    }
}
