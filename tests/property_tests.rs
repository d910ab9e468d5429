//! Property-based tests for storefront invariants.
//!
//! These use proptest to verify the cart/wishlist store and the payment
//! signature check across a wide range of inputs, catching edge cases that
//! unit tests might miss.

use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront_api::client::{MemoryStorage, ProductSummary, StorefrontStore};
use storefront_api::services::payments::{compute_signature, signature_matches};

// Strategies for generating test data

fn product_pool() -> Vec<ProductSummary> {
    (0..5)
        .map(|i| ProductSummary {
            id: format!("p{i}"),
            name: format!("Product {i}"),
            price: Decimal::from(100 + 50 * i),
            image: "public/images/placeholder.jpg".to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Action {
    AddToCart(usize),
    Increment(usize),
    Decrement(usize),
    AddToWishlist(usize),
    RemoveFromWishlist(usize),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..5).prop_map(Action::AddToCart),
        (0usize..5).prop_map(Action::Increment),
        (0usize..5).prop_map(Action::Decrement),
        (0usize..5).prop_map(Action::AddToWishlist),
        (0usize..5).prop_map(Action::RemoveFromWishlist),
    ]
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{5,24}"
}

fn apply(store: &mut StorefrontStore<MemoryStorage>, pool: &[ProductSummary], action: &Action) {
    match action {
        Action::AddToCart(i) => store.add_to_cart(&pool[*i]).unwrap(),
        Action::Increment(i) => store.change_quantity(&pool[*i].id, 1).unwrap(),
        Action::Decrement(i) => store.change_quantity(&pool[*i].id, -1).unwrap(),
        Action::AddToWishlist(i) => {
            store.add_to_wishlist(&pool[*i]).unwrap();
        }
        Action::RemoveFromWishlist(i) => store.remove_from_wishlist(&pool[*i].id).unwrap(),
    }
}

// Property: store invariants hold under arbitrary action sequences
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn store_invariants_hold_for_any_action_sequence(
        actions in proptest::collection::vec(action_strategy(), 0..60)
    ) {
        let pool = product_pool();
        let mut store = StorefrontStore::open(MemoryStorage::new()).unwrap();

        for action in &actions {
            apply(&mut store, &pool, action);

            // One line per product id
            let mut ids: Vec<&str> = store.cart_lines().iter().map(|l| l.product_id.as_str()).collect();
            ids.sort_unstable();
            let before = ids.len();
            ids.dedup();
            prop_assert_eq!(ids.len(), before, "duplicate cart line");

            // Every line has a positive quantity
            prop_assert!(store.cart_lines().iter().all(|l| l.quantity >= 1));

            // Cart and wishlist memberships are mutually exclusive
            for line in store.cart_lines() {
                prop_assert!(
                    !store.wishlist_entries().iter().any(|e| e.product_id == line.product_id),
                    "product {} in both cart and wishlist", line.product_id
                );
            }

            // total() always equals the recomputed sum
            let expected: Decimal = store
                .cart_lines()
                .iter()
                .map(|l| l.price * Decimal::from(l.quantity))
                .sum();
            prop_assert_eq!(store.total(), expected);

            // cart_count() is the quantity sum, not the row count
            let expected_count: u32 = store.cart_lines().iter().map(|l| l.quantity).sum();
            prop_assert_eq!(store.cart_count(), expected_count);
        }
    }

    #[test]
    fn n_adds_of_one_product_yield_quantity_n(n in 1usize..40) {
        let pool = product_pool();
        let mut store = StorefrontStore::open(MemoryStorage::new()).unwrap();

        for _ in 0..n {
            store.add_to_cart(&pool[0]).unwrap();
        }

        prop_assert_eq!(store.cart_lines().len(), 1);
        prop_assert_eq!(store.cart_lines()[0].quantity as usize, n);
    }

    #[test]
    fn decrementing_to_zero_always_removes_the_line(n in 1u32..20) {
        let pool = product_pool();
        let mut store = StorefrontStore::open(MemoryStorage::new()).unwrap();

        for _ in 0..n {
            store.add_to_cart(&pool[1]).unwrap();
        }
        for _ in 0..n {
            store.change_quantity(&pool[1].id, -1).unwrap();
        }

        prop_assert!(store.cart_lines().is_empty());

        // Further decrements on the absent id stay no-ops
        store.change_quantity(&pool[1].id, -1).unwrap();
        prop_assert!(store.cart_lines().is_empty());
    }

    #[test]
    fn add_to_cart_always_evicts_the_wishlist_entry(
        wishlist_first in any::<bool>()
    ) {
        let pool = product_pool();
        let mut store = StorefrontStore::open(MemoryStorage::new()).unwrap();

        if wishlist_first {
            store.add_to_wishlist(&pool[2]).unwrap();
        }
        store.add_to_cart(&pool[2]).unwrap();

        prop_assert!(store
            .wishlist_entries()
            .iter()
            .all(|e| e.product_id != pool[2].id));
    }
}

// Property: signature verification accepts exactly the matching digest
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn computed_signatures_verify(
        secret in id_strategy(),
        order_id in id_strategy(),
        payment_id in id_strategy()
    ) {
        let signature = compute_signature(&secret, &order_id, &payment_id);
        prop_assert_eq!(signature.len(), 64, "hex-encoded SHA-256 digest");
        prop_assert!(signature_matches(&secret, &order_id, &payment_id, &signature));
    }

    #[test]
    fn any_single_character_flip_breaks_verification(
        secret in id_strategy(),
        order_id in id_strategy(),
        payment_id in id_strategy(),
        flip_pos in 0usize..64
    ) {
        let signature = compute_signature(&secret, &order_id, &payment_id);

        let mut tampered: Vec<char> = signature.chars().collect();
        tampered[flip_pos] = if tampered[flip_pos] == '0' { '1' } else { '0' };
        let tampered: String = tampered.into_iter().collect();

        prop_assert!(!signature_matches(&secret, &order_id, &payment_id, &tampered));
    }

    #[test]
    fn signatures_bind_the_payment_id(
        secret in id_strategy(),
        order_id in id_strategy(),
        payment_a in id_strategy(),
        payment_b in id_strategy()
    ) {
        prop_assume!(payment_a != payment_b);
        let signature = compute_signature(&secret, &order_id, &payment_a);
        prop_assert!(!signature_matches(&secret, &order_id, &payment_b, &signature));
    }
}
