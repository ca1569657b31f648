//! Persistence for the storefront and back office.
//!
//! # Layout
//!
//! Every collection is one JSON document stored under a fixed key (see
//! [`keys`]). A [`KeyValueStore`] backend holds the raw strings:
//!
//! - [`MemoryStore`] - process-local map, used by tests
//! - [`FileStore`] - one `<key>.json` file per key in a directory
//!
//! [`Store`] layers typed access on top: documents that fail to parse are
//! logged and replaced by their default value, and multi-key updates run
//! inside a [`Transaction`] that either commits every staged write or
//! restores the keys it already touched.

pub mod accounts;
pub mod counters;
pub mod file;
pub mod memory;
pub mod orders;
pub mod products;

use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};

pub use accounts::AccountRepository;
pub use counters::Counters;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Fixed document keys.
pub mod keys {
    use ferreteria_core::UserId;

    pub const CLIENTS: &str = "clientes";
    pub const PRODUCTS: &str = "productos";
    pub const SUPPLIERS: &str = "proveedores";
    pub const ORDERS: &str = "pedidos";
    pub const INVOICES: &str = "facturas";
    /// Purchase history kept by older builds, read only.
    pub const PURCHASES: &str = "compras_realizadas";

    pub const CART_LEGACY: &str = "carrito";
    pub const CART_GLOBAL: &str = "carrito_global";

    pub const SESSION: &str = "userData";
    pub const LOGGED_IN: &str = "isLoggedIn";
    pub const USER_TYPE: &str = "userType";
    pub const ROLE: &str = "role";
    pub const ROLE_LEGACY: &str = "rol";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_NAME: &str = "userName";
    pub const CURRENT_USER: &str = "currentUser";
    pub const ACCOUNTS: &str = "registrousuario";

    pub const ORDER_COUNTER: &str = "contador_pedidos";
    pub const INVOICE_COUNTER: &str = "contador_facturas";
    pub const LAST_ID: &str = "ultimo_id";

    /// Cart key for a signed-in user.
    #[must_use]
    pub fn user_cart(user: UserId) -> String {
        format!("carrito_{user}")
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Reading or writing the backing files failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Key contains characters that cannot be stored.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Raw string storage keyed by document name.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), RepositoryError>;

    /// List stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Typed access to a [`KeyValueStore`] with a process-wide write lock.
pub struct Store {
    backend: Box<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    /// An empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open (creating if needed) a file-backed store in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self, RepositoryError> {
        Ok(Self::new(FileStore::open(dir)?))
    }

    /// Load a document, falling back to its default.
    ///
    /// A missing key yields `T::default()`. So does a document that is not
    /// valid JSON for `T`; the parse failure is logged and the stored value
    /// is left untouched until the next write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the backend itself fails.
    pub fn load<T>(&self, key: &str) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(decode_or_default(key, self.backend.get(key)?))
    }

    /// Load a document if the key is present and parses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the backend itself fails.
    pub fn load_optional<T>(&self, key: &str) -> Result<Option<T>, RepositoryError>
    where
        T: DeserializeOwned,
    {
        Ok(decode(key, self.backend.get(key)?))
    }

    /// Serialize and store a document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if serialization or the write fails.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)?;
        let _guard = self.lock()?;
        self.backend.set(key, &json)?;
        debug!(key, bytes = json.len(), "Saved document");
        Ok(())
    }

    /// Read a flat string value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        self.backend.get(key)
    }

    /// Write a flat string value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock()?;
        self.backend.set(key, value)
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock()?;
        self.backend.remove(key)
    }

    /// Whether a key is present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// List stored keys.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        self.backend.keys()
    }

    /// Read-modify-write a single document under the write lock.
    ///
    /// The document is written back only if `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a `RepositoryError` from the store.
    pub fn update<T, R, E, F>(&self, key: &str, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default,
        E: From<RepositoryError>,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        self.transaction(|tx| {
            let mut value: T = tx.load(key)?;
            let result = f(&mut value)?;
            tx.save(key, &value)?;
            Ok(result)
        })
    }

    /// Run a multi-key read-modify-write under the write lock.
    ///
    /// Writes made through the [`Transaction`] are staged and only applied
    /// when `f` returns `Ok`. If applying a staged write fails, every key
    /// already written in this commit is restored to its previous value.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a `RepositoryError` from the commit.
    pub fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut Transaction<'_>) -> Result<R, E>,
    {
        let _guard = self.lock()?;
        let mut tx = Transaction {
            backend: self.backend.as_ref(),
            staged: Vec::new(),
        };
        let result = f(&mut tx)?;
        tx.commit()?;
        Ok(result)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, RepositoryError> {
        self.write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)
    }
}

/// Staged writes against a [`Store`], visible to later reads in the same
/// transaction.
pub struct Transaction<'s> {
    backend: &'s dyn KeyValueStore,
    staged: Vec<(String, Option<String>)>,
}

impl Transaction<'_> {
    /// Load a document, seeing writes staged earlier in this transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the backend itself fails.
    pub fn load<T>(&self, key: &str) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(decode_or_default(key, self.get_raw(key)?))
    }

    /// Read a flat string value, seeing staged writes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend fails.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        match self.staged.iter().find(|(k, _)| k == key) {
            Some((_, value)) => Ok(value.clone()),
            None => self.backend.get(key),
        }
    }

    /// Stage a document write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if `value` cannot be encoded.
    pub fn save<T>(&mut self, key: &str, value: &T) -> Result<(), RepositoryError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)?;
        self.stage(key, Some(json));
        Ok(())
    }

    /// Stage a flat string write.
    pub fn set_raw(&mut self, key: &str, value: &str) {
        self.stage(key, Some(value.to_owned()));
    }

    /// Stage a deletion.
    pub fn remove(&mut self, key: &str) {
        self.stage(key, None);
    }

    fn stage(&mut self, key: &str, value: Option<String>) {
        if let Some(slot) = self.staged.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.staged.push((key.to_owned(), value));
        }
    }

    /// Apply staged writes in the order they were first staged.
    fn commit(self) -> Result<(), RepositoryError> {
        let mut previous = Vec::with_capacity(self.staged.len());
        for (key, _) in &self.staged {
            previous.push(self.backend.get(key)?);
        }

        for (index, (key, value)) in self.staged.iter().enumerate() {
            let result = match value {
                Some(v) => self.backend.set(key, v),
                None => self.backend.remove(key),
            };

            if let Err(e) = result {
                warn!(key, error = %e, "Write failed, rolling back transaction");
                for ((written, _), before) in self.staged.iter().zip(&previous).take(index) {
                    let restored = match before {
                        Some(v) => self.backend.set(written, v),
                        None => self.backend.remove(written),
                    };
                    if let Err(restore_err) = restored {
                        error!(key = %written, error = %restore_err, "Rollback failed");
                    }
                }
                return Err(e);
            }
        }

        debug!(keys = self.staged.len(), "Committed transaction");
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Malformed document, using default");
            None
        }
    }
}

fn decode_or_default<T>(key: &str, raw: Option<String>) -> T
where
    T: DeserializeOwned + Default,
{
    decode(key, raw).unwrap_or_default()
}
