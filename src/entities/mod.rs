/// Storefront entities module
pub mod order;
pub mod product;

// Re-export entities
pub use order::{Entity as Order, Model as OrderModel};
pub use product::{Entity as Product, Model as ProductModel};
