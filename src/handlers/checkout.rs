use crate::{
    errors::ServiceError,
    services::orders::{CustomerDetails, OrderLine, VerifiedOrderInput},
    services::payments::CheckoutOrder,
    AppState,
};
use axum::extract::{Json, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Create a payment-gateway order for the submitted amount (major units).
///
/// The response carries the gateway order handle plus the key id the
/// checkout widget needs; a missing or non-positive amount is a 400.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<CheckoutOrder>, ServiceError> {
    let order = state
        .services
        .payments
        .create_checkout_order(payload.amount)
        .await?;
    Ok(Json(order))
}

/// Verify a payment callback and persist the order on success.
///
/// A bad signature and an internal failure both answer
/// `200 {"success": false}`, so the storefront can distinguish rejection
/// from transport errors.
pub async fn verify_order(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOrderRequest>,
) -> Json<VerifyOrderResponse> {
    let valid = state.services.payments.signature_valid(
        &payload.razorpay_order_id,
        &payload.razorpay_payment_id,
        &payload.razorpay_signature,
    );

    if !valid {
        warn!(
            order_id = %payload.razorpay_order_id,
            payment_id = %payload.razorpay_payment_id,
            "Payment signature verification failed"
        );
        return Json(VerifyOrderResponse { success: false });
    }

    let input = VerifiedOrderInput {
        gateway_order_id: payload.razorpay_order_id,
        payment_id: payload.razorpay_payment_id,
        customer: CustomerDetails {
            name: payload.order_data.name,
            email: payload.order_data.email,
            phone: payload.order_data.phone,
            address: payload.order_data.address,
        },
        items: payload.order_data.items,
        currency: state.config.default_currency.clone(),
    };

    match state.services.orders.record_verified(input).await {
        Ok(_) => Json(VerifyOrderResponse { success: true }),
        Err(err) => {
            error!("Failed to persist verified order: {}", err);
            Json(VerifyOrderResponse { success: false })
        }
    }
}

// Request/Response DTOs

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Decimal,
}

/// Callback payload as the checkout widget submits it.
#[derive(Debug, Deserialize)]
pub struct VerifyOrderRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "orderData")]
    pub order_data: OrderData,
}

/// Customer form fields plus purchased lines, as one document.
#[derive(Debug, Deserialize)]
pub struct OrderData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOrderResponse {
    pub success: bool,
}
