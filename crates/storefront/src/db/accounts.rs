//! Registered account repository.

use ferreteria_core::{Email, UserId};

use super::{RepositoryError, Store, keys};
use crate::models::Account;

/// Repository for the registered-accounts document.
pub struct AccountRepository<'a> {
    store: &'a Store,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All registered accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Account>, RepositoryError> {
        self.store.load(keys::ACCOUNTS)
    }

    /// Find an account by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|a| a.email.matches(email.as_str())))
    }

    /// Append a new account with id `max + 1`.
    ///
    /// Username and email are compared case-insensitively against every
    /// existing account; on a match nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    pub fn create_with<F>(
        &self,
        username: &str,
        email: &Email,
        build: F,
    ) -> Result<Account, RepositoryError>
    where
        F: FnOnce(UserId) -> Account,
    {
        self.store.update(keys::ACCOUNTS, |accounts: &mut Vec<Account>| {
            if accounts
                .iter()
                .any(|a| a.username.eq_ignore_ascii_case(username.trim()))
            {
                return Err(RepositoryError::Conflict("username already exists".to_owned()));
            }
            if accounts.iter().any(|a| a.email.matches(email.as_str())) {
                return Err(RepositoryError::Conflict("email already exists".to_owned()));
            }

            let next = accounts.iter().filter_map(|a| a.id.as_i64()).max().unwrap_or(0) + 1;
            let account = build(UserId::new(next));
            accounts.push(account.clone());
            Ok(account)
        })
    }
}
