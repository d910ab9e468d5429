use crate::{entities::OrderModel, errors::ServiceError, AppState};
use axum::extract::{Json, State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// List all orders, newest first (admin)
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, ServiceError> {
    let orders = state.services.orders.list().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Direct order insert without payment verification. The payload's
/// `customer`/`items` documents are stored as submitted.
pub async fn create_order_direct(
    State(state): State<AppState>,
    Json(payload): Json<DirectOrderRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = state
        .services
        .orders
        .record_direct(
            payload.customer.unwrap_or(serde_json::Value::Null),
            payload.items.unwrap_or_else(|| serde_json::json!([])),
            state.config.default_currency.clone(),
        )
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

// Request/Response DTOs

#[derive(Debug, Deserialize)]
pub struct DirectOrderRequest {
    pub customer: Option<serde_json::Value>,
    pub items: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub customer: serde_json::Value,
    pub items: serde_json::Value,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub date: DateTime<Utc>,
}

impl From<OrderModel> for OrderResponse {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            order_id: model.gateway_order_id,
            payment_id: model.payment_id,
            customer: model.customer,
            items: model.items,
            amount: model.amount,
            currency: model.currency,
            date: model.placed_at,
        }
    }
}
