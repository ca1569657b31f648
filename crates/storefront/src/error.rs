//! Unified error handling.
//!
//! Services return `Result<T, AppError>`. Callers show
//! [`AppError::user_message`] to the user; it never exposes storage detail.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::checkout::CheckoutError;
use crate::services::session::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or permission check failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout validation or stock check failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Whether the error is a fault of the system rather than of the input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
                | Self::Checkout(CheckoutError::Repository(_))
        )
    }

    /// Log the error at a level matching its kind.
    pub fn report(&self) {
        if self.is_server_error() {
            tracing::error!(error = %self, "Operation failed");
        } else {
            tracing::warn!(error = %self, "Operation rejected");
        }
    }

    /// Short message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_server_error() {
            return "Something went wrong, please try again".to_string();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "That username or email is already registered".to_string()
                }
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::NotAuthenticated => "Please sign in first".to_string(),
                AuthError::AdminRequired => "Only administrators can do that".to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::MissingPaymentMethod => "Choose a payment method".to_string(),
                CheckoutError::UnsupportedPaymentMethod(_) => {
                    "Pay with cash (efectivo) or card (tarjeta)".to_string()
                }
                other => other.to_string(),
            },
            Self::NotFound(what) => format!("{what} not found"),
            Self::Validation(msg) => msg.clone(),
            Self::Database(_) => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Validation("name is required".to_string());
        assert_eq!(err.to_string(), "Validation error: name is required");
    }

    #[test]
    fn test_user_message_hides_storage_detail() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "pedidos.json truncated".to_string(),
        ));
        assert!(err.is_server_error());
        assert!(!err.user_message().contains("pedidos"));

        let err = AppError::Checkout(CheckoutError::Repository(RepositoryError::LockPoisoned));
        assert!(err.is_server_error());
        assert!(!err.user_message().contains("lock"));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AppError::Checkout(CheckoutError::EmptyCart).user_message(),
            "Your cart is empty"
        );
        assert_eq!(
            AppError::Auth(AuthError::AdminRequired).user_message(),
            "Only administrators can do that"
        );
        assert_eq!(
            AppError::NotFound("Order 5".to_string()).user_message(),
            "Order 5 not found"
        );
        assert!(!AppError::Validation("x".to_string()).is_server_error());
    }

    #[test]
    fn test_stock_message_names_product() {
        let err = AppError::Checkout(CheckoutError::InsufficientStock {
            product: "Red Bull".to_string(),
            requested: 5,
            available: 2,
        });
        assert!(err.user_message().contains("Red Bull"));
    }
}
