pub mod catalog;
pub mod orders;
pub mod payments;
/// Storefront services module - catalog, orders and payment verification
pub mod razorpay;

// Re-export services for convenience
pub use catalog::{CreateProductInput, ProductCatalogService, UpdateProductInput};
pub use orders::{CustomerDetails, OrderLine, OrderService, VerifiedOrderInput};
pub use payments::{CheckoutOrder, PaymentService};
pub use razorpay::{PaymentGatewayApi, RazorpayClient};
