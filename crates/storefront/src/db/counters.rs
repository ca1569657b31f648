//! Persisted folio counters and unique timestamp ids.

use chrono::Utc;
use tracing::debug;

use super::{RepositoryError, Store, Transaction, keys};

/// Folio counters stored as plain integers under their own keys.
pub struct Counters<'a> {
    store: &'a Store,
}

impl<'a> Counters<'a> {
    /// Create a counter accessor.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Increment a counter and return the new value (the first is 1).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn next(&self, key: &str) -> Result<u64, RepositoryError> {
        self.store.transaction(|tx| next_in(tx, key))
    }

    /// Current value of a counter without incrementing it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn current(&self, key: &str) -> Result<u64, RepositoryError> {
        self.store.load(key)
    }

    /// A millisecond timestamp id, strictly greater than any issued before.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn next_timestamp_id(&self) -> Result<i64, RepositoryError> {
        self.store.transaction(next_timestamp_id_in)
    }
}

/// Increment a counter inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError` if the counter cannot be staged.
pub fn next_in(tx: &mut Transaction<'_>, key: &str) -> Result<u64, RepositoryError> {
    let current: u64 = tx.load(key)?;
    let next = current.saturating_add(1);
    tx.save(key, &next)?;
    debug!(key, value = next, "Advanced counter");
    Ok(next)
}

/// Issue a timestamp id inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError` if the last id cannot be staged.
pub fn next_timestamp_id_in(tx: &mut Transaction<'_>) -> Result<i64, RepositoryError> {
    timestamp_id_at(tx, Utc::now().timestamp_millis())
}

fn timestamp_id_at(tx: &mut Transaction<'_>, now_ms: i64) -> Result<i64, RepositoryError> {
    let last: i64 = tx.load(keys::LAST_ID)?;
    let id = now_ms.max(last.saturating_add(1));
    tx.save(keys::LAST_ID, &id)?;
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_one() {
        let store = Store::in_memory();
        let counters = Counters::new(&store);
        assert_eq!(counters.current(keys::ORDER_COUNTER).unwrap(), 0);
        assert_eq!(counters.next(keys::ORDER_COUNTER).unwrap(), 1);
        assert_eq!(counters.next(keys::ORDER_COUNTER).unwrap(), 2);
        assert_eq!(counters.next(keys::INVOICE_COUNTER).unwrap(), 1);
        assert_eq!(counters.current(keys::ORDER_COUNTER).unwrap(), 2);
    }

    #[test]
    fn test_timestamp_ids_are_unique_in_same_millisecond() {
        let store = Store::in_memory();
        let ids: Vec<i64> = (0..3)
            .map(|_| store.transaction(|tx| timestamp_id_at(tx, 1_000)).unwrap())
            .collect();
        assert_eq!(ids, vec![1_000, 1_001, 1_002]);
    }

    #[test]
    fn test_timestamp_id_follows_clock() {
        let store = Store::in_memory();
        store.transaction(|tx| timestamp_id_at(tx, 1_000)).unwrap();
        let id = store.transaction(|tx| timestamp_id_at(tx, 5_000)).unwrap();
        assert_eq!(id, 5_000);
    }

    #[test]
    fn test_next_timestamp_id_increases() {
        let store = Store::in_memory();
        let counters = Counters::new(&store);
        let first = counters.next_timestamp_id().unwrap();
        let second = counters.next_timestamp_id().unwrap();
        assert!(second > first);
    }
}
