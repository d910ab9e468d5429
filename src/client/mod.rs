//! Storefront client components.
//!
//! Everything a page script would hold: the cart/wishlist store persisted
//! to durable client storage, the catalog read path, and the checkout
//! orchestrator driving the payment flow against the backend. The payment
//! widget and the storage medium stay behind trait seams.

pub mod catalog;
pub mod checkout;
pub mod store;

pub use catalog::{CatalogGateway, CatalogProduct, CatalogUnavailable};
pub use checkout::{
    CheckoutCustomer, CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutState,
    GatewayOrderHandle, PaymentOutcome, PaymentWidget,
};
pub use store::{
    CartLine, JsonFileStorage, MemoryStorage, ProductSummary, StateStorage, StoreError,
    StorefrontStore, WishlistEntry, WishlistOutcome,
};
