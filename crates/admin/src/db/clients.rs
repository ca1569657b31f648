//! Client repository.

use ferreteria_core::ClientId;
use ferreteria_storefront::db::{RepositoryError, Store, keys};

use crate::models::Client;

/// Repository for the `clientes` document.
pub struct ClientRepository<'a> {
    store: &'a Store,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All clients in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        self.store.load(keys::CLIENTS)
    }

    /// Get a client by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|c| c.id == id))
    }

    /// Whether the client document has ever been written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn exists(&self) -> Result<bool, RepositoryError> {
        self.store.contains(keys::CLIENTS)
    }

    /// Replace every client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn replace_all(&self, clients: &[Client]) -> Result<(), RepositoryError> {
        self.store.save(keys::CLIENTS, clients)
    }

    /// Append a client with the next id (`max + 1`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn insert_with<F>(&self, build: F) -> Result<Client, RepositoryError>
    where
        F: FnOnce(ClientId) -> Client,
    {
        self.store.update(keys::CLIENTS, |clients: &mut Vec<Client>| {
            let next = clients.iter().filter_map(|c| c.id.as_i64()).max().unwrap_or(0) + 1;
            let client = build(ClientId::new(next));
            clients.push(client.clone());
            Ok(client)
        })
    }

    /// Modify a client in place and return the result.
    ///
    /// Nothing is written if `f` fails.
    ///
    /// # Errors
    ///
    /// Returns `E::from(RepositoryError::NotFound)` if no client has the id,
    /// or whatever `f` returns.
    pub fn modify<F, E>(&self, id: ClientId, f: F) -> Result<Client, E>
    where
        F: FnOnce(&mut Client) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        self.store.update(keys::CLIENTS, |clients: &mut Vec<Client>| {
            let client = clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(RepositoryError::NotFound)?;
            f(client)?;
            Ok(client.clone())
        })
    }

    /// Remove a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no client has the id.
    pub fn delete(&self, id: ClientId) -> Result<Client, RepositoryError> {
        self.store.update(keys::CLIENTS, |clients: &mut Vec<Client>| {
            let index = clients
                .iter()
                .position(|c| c.id == id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(clients.remove(index))
        })
    }
}
