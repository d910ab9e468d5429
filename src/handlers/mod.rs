pub mod checkout;
pub mod common;
pub mod orders;
/// Storefront API handlers module
pub mod products;

use crate::services::{OrderService, PaymentService, ProductCatalogService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Aggregated services used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<ProductCatalogService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, payments: Arc<PaymentService>) -> Self {
        Self {
            catalog: Arc::new(ProductCatalogService::new(db.clone())),
            orders: Arc::new(OrderService::new(db)),
            payments,
        }
    }
}
