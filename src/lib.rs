//! Storefront API Library
//!
//! Backend and client-side components for a small e-commerce storefront:
//! product catalog CRUD behind an admin bearer gate, Razorpay order
//! creation, HMAC callback verification, and the cart/wishlist/checkout
//! client machinery.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AdminRouterExt, AdminToken};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
}

/// Builds the storefront's flat HTTP surface.
///
/// Catalog reads, direct order inserts and the checkout endpoints are
/// public; product mutations and the order listing are gated on the admin
/// shared secret.
pub fn storefront_routes(admin_token: &AdminToken) -> Router<AppState> {
    // Product mutations require the admin bearer token
    let products_admin = Router::new()
        .route("/products", post(handlers::products::create_product))
        .route(
            "/products/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .with_admin_auth(admin_token);

    // Order review is admin-only
    let orders_admin = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .with_admin_auth(admin_token);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Public catalog read
        .route("/products", get(handlers::products::list_products))
        // Direct order insert, no verification
        .route("/orders", post(handlers::orders::create_order_direct))
        // Checkout flow
        .route("/create-order", post(handlers::checkout::create_order))
        .route("/verify-order", post(handlers::checkout::verify_order))
        // Admin surfaces
        .merge(products_admin)
        .merge(orders_admin)
}

async fn api_status() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    Json(json!({
        "status": "ok",
        "service": "storefront-api",
        "version": version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
