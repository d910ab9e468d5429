//! Cart and wishlist state, persisted write-through to client storage.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Storage key for the cart line array
pub const CART_KEY: &str = "cart";
/// Storage key for the wishlist entry array
pub const WISHLIST_KEY: &str = "wishlist";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key/value storage seam (the browser localStorage analog).
pub trait StateStorage: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One JSON file per key inside a directory.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Product fields the store keeps on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

/// A cart row: unique per product id, quantity at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

/// A saved-for-later row: unique per product id, no quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

/// Whether a wishlist add inserted or found the product already saved;
/// the UI messages the two cases differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistOutcome {
    Added,
    AlreadyPresent,
}

/// Cart/wishlist store.
///
/// Invariants, re-established by every mutation before it returns:
/// - at most one cart line per product id; quantity reaching 0 deletes the line
/// - a product id in the cart is never simultaneously in the wishlist
/// - the new state is persisted to storage before the call returns
pub struct StorefrontStore<S: StateStorage> {
    storage: S,
    cart: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
}

impl<S: StateStorage> StorefrontStore<S> {
    /// Loads cart and wishlist state from storage. Missing keys start
    /// empty; unreadable payloads are dropped with a warning rather than
    /// wedging the storefront.
    pub fn open(storage: S) -> Result<Self, StoreError> {
        let cart = load_list(&storage, CART_KEY)?;
        let wishlist = load_list(&storage, WISHLIST_KEY)?;
        Ok(Self {
            storage,
            cart,
            wishlist,
        })
    }

    /// Adds one unit of `product` to the cart.
    ///
    /// An existing line increments its quantity; a fresh product inserts a
    /// line with quantity 1. The product is always removed from the
    /// wishlist, whatever its prior state there.
    pub fn add_to_cart(&mut self, product: &ProductSummary) -> Result<(), StoreError> {
        if let Some(line) = self
            .cart
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity += 1;
        } else {
            self.cart.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: 1,
            });
        }

        self.wishlist.retain(|entry| entry.product_id != product.id);
        self.persist_wishlist()?;
        self.persist_cart()
    }

    /// Applies `delta` (+1/-1) to the matching line; the line is removed
    /// when its quantity falls to 0. An absent id is a silent no-op.
    pub fn change_quantity(&mut self, product_id: &str, delta: i32) -> Result<(), StoreError> {
        let Some(pos) = self
            .cart
            .iter()
            .position(|line| line.product_id == product_id)
        else {
            return Ok(());
        };

        let next = i64::from(self.cart[pos].quantity) + i64::from(delta);
        if next <= 0 {
            self.cart.remove(pos);
        } else {
            self.cart[pos].quantity = next as u32;
        }

        self.persist_cart()
    }

    /// Saves a product for later unless it is already saved.
    pub fn add_to_wishlist(
        &mut self,
        product: &ProductSummary,
    ) -> Result<WishlistOutcome, StoreError> {
        if self
            .wishlist
            .iter()
            .any(|entry| entry.product_id == product.id)
        {
            return Ok(WishlistOutcome::AlreadyPresent);
        }

        self.wishlist.push(WishlistEntry {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        });
        self.persist_wishlist()?;
        Ok(WishlistOutcome::Added)
    }

    /// Removes a saved product; absent ids are a no-op.
    pub fn remove_from_wishlist(&mut self, product_id: &str) -> Result<(), StoreError> {
        let before = self.wishlist.len();
        self.wishlist.retain(|entry| entry.product_id != product_id);
        if self.wishlist.len() != before {
            self.persist_wishlist()?;
        }
        Ok(())
    }

    /// Moves a saved product into the cart. Returns false when the id is
    /// not on the wishlist.
    pub fn move_to_cart(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let Some(entry) = self
            .wishlist
            .iter()
            .find(|entry| entry.product_id == product_id)
            .cloned()
        else {
            return Ok(false);
        };

        self.add_to_cart(&ProductSummary {
            id: entry.product_id,
            name: entry.name,
            price: entry.price,
            image: entry.image,
        })?;
        Ok(true)
    }

    /// Sum of price x quantity across the cart; the exact amount checkout
    /// submits.
    pub fn total(&self) -> Decimal {
        self.cart
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Sum of quantities, not row count.
    pub fn cart_count(&self) -> u32 {
        self.cart.iter().map(|line| line.quantity).sum()
    }

    /// Wishlist row count.
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart
    }

    pub fn wishlist_entries(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    /// Empties the cart and persists the cleared state.
    pub fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.cart.clear();
        self.persist_cart()
    }

    fn persist_cart(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.cart)?;
        self.storage.save(CART_KEY, &payload)
    }

    fn persist_wishlist(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.wishlist)?;
        self.storage.save(WISHLIST_KEY, &payload)
    }
}

fn load_list<T: DeserializeOwned>(
    storage: &impl StateStorage,
    key: &str,
) -> Result<Vec<T>, StoreError> {
    match storage.load(key)? {
        None => Ok(Vec::new()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!("Discarding unreadable '{}' state: {}", key, err);
                Ok(Vec::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str, price: Decimal) -> ProductSummary {
        ProductSummary {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            image: "public/images/placeholder.jpg".to_string(),
        }
    }

    fn store() -> StorefrontStore<MemoryStorage> {
        StorefrontStore::open(MemoryStorage::new()).unwrap()
    }

    // ==================== Cart semantics ====================

    #[test]
    fn repeated_adds_accumulate_quantity_on_one_line() {
        let mut store = store();
        let p = product("p1", dec!(500));

        for _ in 0..4 {
            store.add_to_cart(&p).unwrap();
        }

        assert_eq!(store.cart_lines().len(), 1);
        assert_eq!(store.cart_lines()[0].quantity, 4);
        assert_eq!(store.cart_count(), 4);
    }

    #[test]
    fn decrement_to_zero_removes_the_line() {
        let mut store = store();
        store.add_to_cart(&product("p1", dec!(100))).unwrap();
        store.add_to_cart(&product("p1", dec!(100))).unwrap();

        store.change_quantity("p1", -1).unwrap();
        assert_eq!(store.cart_lines()[0].quantity, 1);

        store.change_quantity("p1", -1).unwrap();
        assert!(store.cart_lines().is_empty());
    }

    #[test]
    fn decrement_on_absent_id_is_a_no_op() {
        let mut store = store();
        store.add_to_cart(&product("p1", dec!(100))).unwrap();

        store.change_quantity("ghost", -1).unwrap();

        assert_eq!(store.cart_lines().len(), 1);
        assert_eq!(store.cart_count(), 1);
    }

    #[test]
    fn total_is_price_times_quantity() {
        let mut store = store();
        let p1 = product("p1", dec!(500));
        let p2 = product("p2", dec!(249.50));

        store.add_to_cart(&p1).unwrap();
        store.add_to_cart(&p1).unwrap();
        store.add_to_cart(&p2).unwrap();

        assert_eq!(store.total(), dec!(1249.50));
    }

    #[test]
    fn clear_cart_empties_and_persists() {
        let mut store = store();
        store.add_to_cart(&product("p1", dec!(10))).unwrap();
        store.clear_cart().unwrap();

        assert!(store.cart_lines().is_empty());
        assert_eq!(store.total(), Decimal::ZERO);

        let raw = store.storage.load(CART_KEY).unwrap().unwrap();
        assert_eq!(raw, "[]");
    }

    // ==================== Wishlist semantics ====================

    #[test]
    fn wishlist_add_reports_duplicates_distinctly() {
        let mut store = store();
        let p = product("p1", dec!(100));

        assert_eq!(store.add_to_wishlist(&p).unwrap(), WishlistOutcome::Added);
        assert_eq!(
            store.add_to_wishlist(&p).unwrap(),
            WishlistOutcome::AlreadyPresent
        );
        assert_eq!(store.wishlist_count(), 1);
    }

    #[test]
    fn remove_from_wishlist_is_idempotent() {
        let mut store = store();
        store.add_to_wishlist(&product("p1", dec!(100))).unwrap();

        store.remove_from_wishlist("p1").unwrap();
        store.remove_from_wishlist("p1").unwrap();

        assert_eq!(store.wishlist_count(), 0);
    }

    #[test]
    fn adding_to_cart_evicts_the_wishlist_entry() {
        let mut store = store();
        let p = product("p1", dec!(100));

        store.add_to_wishlist(&p).unwrap();
        store.add_to_cart(&p).unwrap();

        assert_eq!(store.wishlist_count(), 0);
        assert_eq!(store.cart_count(), 1);
    }

    #[test]
    fn move_to_cart_transfers_the_entry() {
        let mut store = store();
        store.add_to_wishlist(&product("p1", dec!(100))).unwrap();

        assert!(store.move_to_cart("p1").unwrap());
        assert!(!store.move_to_cart("p1").unwrap());

        assert_eq!(store.cart_count(), 1);
        assert_eq!(store.wishlist_count(), 0);
    }

    // ==================== Persistence ====================

    #[test]
    fn state_round_trips_through_storage() {
        let storage = MemoryStorage::new();
        {
            let mut store = StorefrontStore::open(storage).unwrap();
            store.add_to_cart(&product("p1", dec!(500))).unwrap();
            store.add_to_cart(&product("p1", dec!(500))).unwrap();
            store.add_to_wishlist(&product("p2", dec!(300))).unwrap();

            // Reopen over the same entries by snapshotting the raw payloads
            let cart_raw = store.storage.load(CART_KEY).unwrap().unwrap();
            let wishlist_raw = store.storage.load(WISHLIST_KEY).unwrap().unwrap();

            let reopened_storage = MemoryStorage::new();
            reopened_storage.save(CART_KEY, &cart_raw).unwrap();
            reopened_storage.save(WISHLIST_KEY, &wishlist_raw).unwrap();

            let reopened = StorefrontStore::open(reopened_storage).unwrap();
            assert_eq!(reopened.cart_count(), 2);
            assert_eq!(reopened.wishlist_count(), 1);
            assert_eq!(reopened.total(), dec!(1000));
        }
    }

    #[test]
    fn cart_lines_serialize_with_camel_case_keys() {
        let line = CartLine {
            product_id: "p1".to_string(),
            name: "Dupatta".to_string(),
            price: dec!(500),
            image: "x.jpg".to_string(),
            quantity: 2,
        };

        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["productId"], "p1");
        assert!(value.get("product_id").is_none());
    }

    #[test]
    fn unreadable_state_starts_empty() {
        let storage = MemoryStorage::new();
        storage.save(CART_KEY, "{not json").unwrap();

        let store = StorefrontStore::open(storage).unwrap();
        assert_eq!(store.cart_count(), 0);
    }

    #[test]
    fn json_file_storage_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        assert!(storage.load(CART_KEY).unwrap().is_none());
        storage.save(CART_KEY, "[]").unwrap();
        assert_eq!(storage.load(CART_KEY).unwrap().unwrap(), "[]");
    }
}
