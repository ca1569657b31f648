//! Unified error handling for the back office.

use thiserror::Error;

use ferreteria_storefront::{AppError, RepositoryError};

/// Back-office error type.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A storefront operation (orders, permissions) failed.
    #[error(transparent)]
    Storefront(#[from] AppError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backup or import document is unusable.
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    /// Serializing an export failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    /// Whether the error is a fault of the system rather than of the input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Serialization(_) => true,
            Self::Storefront(err) => err.is_server_error(),
            Self::NotFound(_) | Self::Validation(_) | Self::InvalidBackup(_) => false,
        }
    }

    /// Log the error at a level matching its kind.
    pub fn report(&self) {
        if self.is_server_error() {
            tracing::error!(error = %self, "Back-office operation failed");
        } else {
            tracing::warn!(error = %self, "Back-office operation rejected");
        }
    }

    /// Short message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(err) => err.user_message(),
            _ if self.is_server_error() => "Something went wrong, please try again".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Validation(msg) => msg.clone(),
            Self::InvalidBackup(_) => "The backup file is not valid".to_string(),
            Self::Database(_) | Self::Serialization(_) => self.to_string(),
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use ferreteria_storefront::services::session::AuthError;

    use super::*;

    #[test]
    fn test_storefront_errors_pass_through() {
        let err = AdminError::from(AppError::Auth(AuthError::AdminRequired));
        assert!(!err.is_server_error());
        assert_eq!(err.user_message(), "Only administrators can do that");
    }

    #[test]
    fn test_server_errors_are_hidden() {
        let err = AdminError::Database(RepositoryError::DataCorruption("clientes".to_string()));
        assert!(err.is_server_error());
        assert!(!err.user_message().contains("clientes"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AdminError::NotFound("Client 7".to_string()).user_message(),
            "Client 7 not found"
        );
        assert_eq!(
            AdminError::Validation("RFC has an invalid format".to_string()).to_string(),
            "Validation error: RFC has an invalid format"
        );
    }
}
