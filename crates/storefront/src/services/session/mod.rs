//! Session and role resolution.
//!
//! Registered accounts live under `registrousuario` with argon2 password
//! hashes. Signing in writes the session record to `userData` plus the
//! flat keys older screens read (`isLoggedIn`, `role`, `rol`, `userType`,
//! `userEmail`, `userName`, `currentUser`).
//!
//! # Role resolution
//!
//! 1. The session record, if it carries `role` or `rol`: admin when either
//!    equals `admin`, user otherwise.
//! 2. The flat `role` key.
//! 3. The flat `userType` key.
//! 4. User.
//!
//! Comparisons are case-insensitive.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use ferreteria_core::{Email, Role};

use crate::db::{AccountRepository, RepositoryError, Store, Transaction, keys};
use crate::models::{Account, SessionRecord};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Value of `isLoggedIn` while a session is active.
const LOGGED_IN: &str = "true";

/// Keys removed on logout.
const SESSION_KEYS: &[&str] = &[
    keys::SESSION,
    keys::LOGGED_IN,
    keys::USER_TYPE,
    keys::USER_EMAIL,
    keys::USER_NAME,
    keys::ROLE,
    keys::ROLE_LEGACY,
    keys::CURRENT_USER,
    keys::CART_LEGACY,
];

/// Demo accounts created by [`SessionService::seed_default_accounts`]:
/// `(username, email, password, role)`.
pub const DEMO_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("admin", "admin@ferreteria.com", "admin123", Role::Admin),
    ("usuario", "usuario@test.com", "user123", Role::User),
];

/// Session service.
///
/// Handles registration, sign-in, sign-out and role resolution.
pub struct SessionService<'a> {
    store: &'a Store,
    accounts: AccountRepository<'a>,
    admin_email: &'a Email,
}

impl<'a> SessionService<'a> {
    /// Create a new session service.
    ///
    /// `admin_email` is the only account allowed to toggle its role.
    #[must_use]
    pub const fn new(store: &'a Store, admin_email: &'a Email) -> Self {
        Self {
            store,
            accounts: AccountRepository::new(store),
            admin_email,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new user account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the username is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is
    /// already registered; the account list is left unchanged.
    #[instrument(skip(self, email, password))]
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Account, AuthError> {
        self.create_account(username, email, password, Role::User)
    }

    fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<Account, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        let email = Email::parse(email)?;
        validate_password(password.expose_secret())?;
        let password_hash = hash_password(password.expose_secret())?;

        let account = self
            .accounts
            .create_with(username, &email, |id| Account {
                id,
                username: username.to_owned(),
                email: email.clone(),
                password_hash,
                role,
                created_at: Utc::now(),
            })
            .map_err(|e| match e {
                RepositoryError::Conflict(reason) => {
                    warn!(username, %reason, "Registration rejected");
                    AuthError::UserAlreadyExists
                }
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %account.id, role = %account.role, "Registered account");
        Ok(account)
    }

    /// All registered accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub fn accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.accounts.list()?)
    }

    /// Register the demo admin and demo user if their emails are free.
    ///
    /// Returns how many accounts were created.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if registration fails for any other reason.
    pub fn seed_default_accounts(&self) -> Result<usize, AuthError> {
        let mut created = 0;
        for (username, email, password, role) in DEMO_ACCOUNTS {
            let password = SecretString::from(*password);
            match self.create_account(username, email, &password, *role) {
                Ok(_) => created += 1,
                Err(AuthError::UserAlreadyExists) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    // =========================================================================
    // Sign in / sign out
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[instrument(skip(self, email, password))]
    pub fn login(&self, email: &str, password: &SecretString) -> Result<SessionRecord, AuthError> {
        let email = Email::parse(email)?;

        let Some(account) = self.accounts.get_by_email(&email)? else {
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password.expose_secret(), &account.password_hash) {
            warn!(user_id = %account.id, "Login failed: wrong password");
            return Err(e);
        }

        let record = SessionRecord::for_account(&account, account.role);
        self.store
            .transaction(|tx| write_session(tx, &record, account.role))?;

        info!(user_id = %account.id, role = %account.role, "User logged in");
        Ok(record)
    }

    /// Sign out, removing every session key and the legacy cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.transaction(|tx| {
            for key in SESSION_KEYS {
                tx.remove(key);
            }
            Ok::<_, RepositoryError>(())
        })?;
        info!("User logged out");
        Ok(())
    }

    /// The current session record, if any.
    ///
    /// Falls back to the legacy `currentUser` document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub fn current_session(&self) -> Result<Option<SessionRecord>, AuthError> {
        if let Some(record) = self.store.load_optional(keys::SESSION)? {
            return Ok(Some(record));
        }
        Ok(self.store.load_optional(keys::CURRENT_USER)?)
    }

    /// Whether someone is signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        let flag = self.store.get_raw(keys::LOGGED_IN)?;
        let flagged = flag.as_deref().map(unquote) == Some(LOGGED_IN);
        Ok(flagged && self.current_session()?.is_some())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Resolve the current role from the stored session data.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub fn resolve_role(&self) -> Result<Role, AuthError> {
        let session = self.current_session()?;
        let role = self.store.get_raw(keys::ROLE)?;
        let user_type = self.store.get_raw(keys::USER_TYPE)?;
        let resolved = resolve_role_from(session.as_ref(), role.as_deref(), user_type.as_deref());
        debug!(role = %resolved, "Resolved role");
        Ok(resolved)
    }

    /// Flip between admin and user for the signed-in admin account.
    ///
    /// Rewrites both role fields of the session record and the flat keys.
    /// The stored account keeps its registered role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if no one is signed in and
    /// `AuthError::Forbidden` if the session is not the configured admin.
    #[instrument(skip(self))]
    pub fn toggle_role(&self) -> Result<Role, AuthError> {
        let session = self.current_session()?.ok_or(AuthError::NotAuthenticated)?;
        let is_admin_account = session
            .email
            .as_deref()
            .is_some_and(|email| self.admin_email.matches(email));
        if !is_admin_account {
            warn!(user_id = ?session.id, "Role toggle rejected");
            return Err(AuthError::Forbidden(
                "only the administrator account can switch roles".to_string(),
            ));
        }

        let role = self.resolve_role()?.toggled();
        let record = session.with_role(role);
        self.store.transaction(|tx| write_session(tx, &record, role))?;

        info!(user_id = ?record.id, role = %role, "Toggled role");
        Ok(role)
    }
}

/// Pure role resolution over the stored values.
///
/// See the module docs for the order of precedence.
#[must_use]
pub fn resolve_role_from(
    session: Option<&SessionRecord>,
    role: Option<&str>,
    user_type: Option<&str>,
) -> Role {
    if let Some(role) = session.and_then(SessionRecord::declared_role) {
        return role;
    }

    let flat = [role, user_type]
        .into_iter()
        .flatten()
        .map(unquote)
        .find(|v| !v.is_empty());

    match flat {
        Some(raw) if Role::is_admin_value(raw) => Role::Admin,
        _ => Role::User,
    }
}

/// Check that `role` may perform admin actions.
///
/// # Errors
///
/// Returns `AuthError::AdminRequired` for non-admins.
pub fn require_admin(role: Role) -> Result<(), AuthError> {
    if role.is_admin() {
        Ok(())
    } else {
        warn!(role = %role, "Admin action rejected");
        Err(AuthError::AdminRequired)
    }
}

fn write_session(
    tx: &mut Transaction<'_>,
    record: &SessionRecord,
    role: Role,
) -> Result<(), RepositoryError> {
    tx.save(keys::SESSION, record)?;
    tx.save(keys::CURRENT_USER, record)?;
    tx.set_raw(keys::LOGGED_IN, LOGGED_IN);
    tx.set_raw(keys::ROLE, &role.to_string());
    tx.set_raw(keys::ROLE_LEGACY, role.legacy_name());
    tx.set_raw(keys::USER_TYPE, &role.to_string());
    if let Some(email) = &record.email {
        tx.set_raw(keys::USER_EMAIL, email);
    }
    tx.set_raw(keys::USER_NAME, record.display_name());
    Ok(())
}

/// Strip the quotes of a value that was stored JSON-encoded.
fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
