//! Cart ledger.
//!
//! A cart is the list of [`CartLine`]s stored under its namespace key.
//! Every mutation reads the stored list, applies the change, writes it back
//! under the store lock and then publishes the full list to subscribers.

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use ferreteria_core::{Price, ProductId, Quantity, UserId};

use super::checkout::{self, CheckoutError, DiscountPolicy, Totals};
use crate::db::{RepositoryError, Store, Transaction, counters, keys};
use crate::models::{CartItem, CartLine, Product};

/// Which cart a ledger works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartNamespace {
    /// Shared cart used by the catalog screens (`carrito_global`).
    Global,
    /// Pre-namespacing cart (`carrito`), cleared on logout.
    Legacy,
    /// Per-user cart (`carrito_<id>`).
    User(UserId),
}

impl CartNamespace {
    /// Storage key for this cart.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Global => keys::CART_GLOBAL.to_owned(),
            Self::Legacy => keys::CART_LEGACY.to_owned(),
            Self::User(id) => keys::user_cart(*id),
        }
    }
}

impl fmt::Display for CartNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A cart bound to one namespace of a [`Store`].
pub struct CartLedger<'a> {
    store: &'a Store,
    namespace: CartNamespace,
    key: String,
    sender: watch::Sender<Vec<CartLine>>,
}

impl<'a> CartLedger<'a> {
    /// Open a cart, loading its current lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails. A malformed cart
    /// document loads as an empty cart.
    pub fn open(store: &'a Store, namespace: CartNamespace) -> Result<Self, RepositoryError> {
        let key = namespace.key();
        let lines: Vec<CartLine> = store.load(&key)?;
        debug!(cart = %key, lines = lines.len(), "Opened cart");
        let (sender, _) = watch::channel(lines);
        Ok(Self {
            store,
            namespace,
            key,
            sender,
        })
    }

    /// The namespace this ledger is bound to.
    #[must_use]
    pub const fn namespace(&self) -> CartNamespace {
        self.namespace
    }

    /// Current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.sender.borrow().clone()
    }

    /// Receive the full line list after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.sender.subscribe()
    }

    /// Re-read the stored lines and publish them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub fn reload(&self) -> Result<(), RepositoryError> {
        let lines: Vec<CartLine> = self.store.load(&self.key)?;
        self.sender.send_replace(lines);
        Ok(())
    }

    /// Add `quantity` units of an item.
    ///
    /// Merges into an existing line with the same id or name; otherwise
    /// appends a line. Items without an id get a generated one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidQuantity` for zero units, or
    /// `CheckoutError::Repository` if the store fails.
    #[instrument(skip(self, item), fields(cart = %self.key, product = %item.name))]
    pub fn add(&self, item: CartItem, quantity: Quantity) -> Result<CartLine, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity);
        }

        let line = self.mutate(|lines, tx| merge_line(lines, tx, &item, quantity))?;

        info!(quantity, line_quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Add a catalog product, refusing more units than are in stock.
    ///
    /// Units already stored in the cart count against the stock.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OutOfStock` or `CheckoutError::InsufficientStock`
    /// and leaves the cart unchanged, plus the errors of [`CartLedger::add`].
    #[instrument(skip(self, product), fields(cart = %self.key, product_id = %product.id))]
    pub fn add_product(&self, product: &Product, quantity: Quantity) -> Result<CartLine, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity);
        }
        if !product.in_stock() {
            warn!("Product out of stock");
            return Err(CheckoutError::OutOfStock {
                product: product.name.clone(),
            });
        }

        let item = CartItem::from(product);
        let line = self.mutate(|lines, tx| {
            let in_cart = lines
                .iter()
                .find(|l| l.refers_to(item.id, &item.name))
                .map_or(0, |l| u64::from(l.quantity));
            let requested = in_cart + u64::from(quantity);
            if requested > u64::from(product.stock) {
                warn!(requested, stock = product.stock, "Insufficient stock");
                return Err(CheckoutError::InsufficientStock {
                    product: product.name.clone(),
                    requested,
                    available: product.stock,
                });
            }
            merge_line(lines, tx, &item, quantity)
        })?;

        info!(quantity, line_quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Remove the line with the given id. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self), fields(cart = %self.key))]
    pub fn remove(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let removed = self.mutate(|lines, _| {
            let before = lines.len();
            lines.retain(|l| l.id != id);
            Ok::<_, RepositoryError>(lines.len() != before)
        })?;
        if removed {
            info!("Removed from cart");
        }
        Ok(removed)
    }

    /// Set the quantity of a line. Zero removes it.
    ///
    /// Returns whether a line with the id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self), fields(cart = %self.key))]
    pub fn set_quantity(&self, id: ProductId, quantity: Quantity) -> Result<bool, RepositoryError> {
        let found = self.mutate(|lines, _| {
            let Some(index) = lines.iter().position(|l| l.id == id) else {
                return Ok::<_, RepositoryError>(false);
            };
            if quantity == 0 {
                lines.remove(index);
            } else if let Some(line) = lines.get_mut(index) {
                line.set_quantity(quantity);
            }
            Ok(true)
        })?;
        if found {
            info!("Updated cart quantity");
        }
        Ok(found)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self), fields(cart = %self.key))]
    pub fn clear(&self) -> Result<(), RepositoryError> {
        self.mutate(|lines, _| {
            lines.clear();
            Ok::<_, RepositoryError>(())
        })?;
        info!("Cleared cart");
        Ok(())
    }

    /// `Σ(quantity × price)` over the current lines.
    #[must_use]
    pub fn total(&self) -> Price {
        checkout::subtotal(&self.sender.borrow())
    }

    /// Total units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        checkout::item_count(&self.sender.borrow())
    }

    /// Totals with the volume discount applied.
    #[must_use]
    pub fn totals(&self, policy: &DiscountPolicy) -> Totals {
        policy.totals(&self.sender.borrow())
    }

    fn mutate<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut Vec<CartLine>, &mut Transaction<'_>) -> Result<R, E>,
    {
        let (result, lines) = self.store.transaction(|tx| {
            let mut lines: Vec<CartLine> = tx.load(&self.key)?;
            let result = f(&mut lines, tx)?;
            tx.save(&self.key, &lines)?;
            Ok::<_, E>((result, lines))
        })?;
        self.sender.send_replace(lines);
        Ok(result)
    }
}

/// Merge `quantity` units of `item` into the line with the same id or name,
/// or append a new line.
fn merge_line(
    lines: &mut Vec<CartLine>,
    tx: &mut Transaction<'_>,
    item: &CartItem,
    quantity: Quantity,
) -> Result<CartLine, CheckoutError> {
    if let Some(line) = lines.iter_mut().find(|l| l.refers_to(item.id, &item.name)) {
        line.set_quantity(line.quantity.saturating_add(quantity));
        return Ok(line.clone());
    }

    let id = match item.id {
        Some(id) => id,
        None => ProductId::new(counters::next_timestamp_id_in(tx)?),
    };
    let line = CartLine::new(id, item.name.clone(), item.price, quantity);
    lines.push(line.clone());
    Ok(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, price: i64) -> CartItem {
        CartItem {
            id: Some(ProductId::new(id)),
            name: name.to_string(),
            price: Price::from_units(price),
        }
    }

    fn product(id: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("producto {id}"),
            description: String::new(),
            price: Price::from_units(45),
            stock,
            category: String::new(),
            supplier: String::new(),
            image: None,
            added_on: None,
        }
    }

    #[test]
    fn test_namespace_keys() {
        assert_eq!(CartNamespace::Global.key(), "carrito_global");
        assert_eq!(CartNamespace::Legacy.key(), "carrito");
        assert_eq!(CartNamespace::User(UserId::new(4)).key(), "carrito_4");
    }

    #[test]
    fn test_add_merges_by_id_or_name() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();

        cart.add(item(1, "Red Bull", 45), 1).unwrap();
        cart.add(item(1, "Red Bull", 45), 1).unwrap();
        cart.add(
            CartItem {
                id: None,
                name: "Red Bull".to_string(),
                price: Price::from_units(45),
            },
            1,
        )
        .unwrap();
        cart.add(item(2, "Monster", 35), 1).unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].total, Price::from_units(135));
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Price::from_units(170));
    }

    #[test]
    fn test_add_without_id_generates_one() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let line = cart
            .add(
                CartItem {
                    id: None,
                    name: "Cemento Portland".to_string(),
                    price: Price::from_units(180),
                },
                2,
            )
            .unwrap();
        assert!(line.id.as_i64().is_some_and(|id| id > 0));
    }

    #[test]
    fn test_add_zero_rejected() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();
        assert!(matches!(
            cart.add(item(1, "Red Bull", 45), 0),
            Err(CheckoutError::InvalidQuantity)
        ));
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();
        cart.add(item(1, "Red Bull", 45), 2).unwrap();

        assert!(cart.set_quantity(ProductId::new(1), 5).unwrap());
        assert_eq!(cart.total(), Price::from_units(225));

        assert!(cart.set_quantity(ProductId::new(1), 0).unwrap());
        assert!(cart.lines().is_empty());
        assert!(!cart.set_quantity(ProductId::new(1), 3).unwrap());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();
        cart.add(item(1, "Red Bull", 45), 1).unwrap();
        cart.add(item(2, "Monster", 35), 1).unwrap();

        assert!(cart.remove(ProductId::new(1)).unwrap());
        assert!(!cart.remove(ProductId::new(1)).unwrap());
        assert_eq!(cart.lines().len(), 1);

        cart.clear().unwrap();
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_mutations_persist_and_publish() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::User(UserId::new(9))).unwrap();
        let mut rx = cart.subscribe();

        cart.add(item(1, "Red Bull", 45), 2).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        let stored: Vec<CartLine> = store.load("carrito_9").unwrap();
        assert_eq!(stored, cart.lines());

        let reopened = CartLedger::open(&store, CartNamespace::User(UserId::new(9))).unwrap();
        assert_eq!(reopened.lines(), cart.lines());
    }

    #[test]
    fn test_reload_picks_up_other_writers() {
        let store = Store::in_memory();
        let first = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let second = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let mut rx = first.subscribe();

        second.add(item(2, "Monster", 35), 3).unwrap();
        assert!(first.lines().is_empty());

        first.reload().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert_eq!(first.item_count(), 3);
    }

    #[test]
    fn test_stock_check_counts_stored_lines() {
        let store = Store::in_memory();
        let stale = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let other = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let limited = product(5, 3);

        other.add_product(&limited, 3).unwrap();
        assert!(stale.lines().is_empty());
        assert!(matches!(
            stale.add_product(&limited, 1),
            Err(CheckoutError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            })
        ));

        stale.reload().unwrap();
        assert_eq!(stale.item_count(), 3);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let store = Store::in_memory();
        let global = CartLedger::open(&store, CartNamespace::Global).unwrap();
        let user = CartLedger::open(&store, CartNamespace::User(UserId::new(1))).unwrap();
        global.add(item(1, "Red Bull", 45), 1).unwrap();
        assert!(user.lines().is_empty());
    }

    #[test]
    fn test_add_product_checks_stock() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();

        assert!(matches!(
            cart.add_product(&product(1, 0), 1),
            Err(CheckoutError::OutOfStock { .. })
        ));

        let limited = product(2, 3);
        cart.add_product(&limited, 2).unwrap();
        assert!(matches!(
            cart.add_product(&limited, 2),
            Err(CheckoutError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            })
        ));
        cart.add_product(&limited, 1).unwrap();
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_totals_with_policy() {
        let store = Store::in_memory();
        let cart = CartLedger::open(&store, CartNamespace::Global).unwrap();
        cart.add(item(1, "Taladro", 300), 2).unwrap();
        let totals = cart.totals(&DiscountPolicy::default());
        assert_eq!(totals.discount, Price::from_units(60));
        assert_eq!(totals.total, Price::from_units(540));
    }
}
