use crate::errors::ServiceError;
use crate::services::razorpay::{receipt_id, CreateGatewayOrderRequest, PaymentGatewayApi};
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, instrument};

type HmacSha256 = Hmac<Sha256>;

/// Gateway order plus the key id the checkout widget needs to open.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutOrder {
    pub id: String,
    /// Amount in currency minor units
    pub amount: i64,
    pub currency: String,
    pub key: String,
}

/// Payment service: creates gateway orders and authenticates callbacks.
///
/// The callback signature is `HMAC-SHA256(key_secret, order_id + "|" +
/// payment_id)` hex-encoded, compared constant-time against the value the
/// widget hands back.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGatewayApi>,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGatewayApi>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            currency: currency.into(),
        }
    }

    /// Creates a gateway order for the given amount in major currency units.
    ///
    /// The backend is the single authority on subunit conversion: the
    /// storefront always submits major units and this method converts to
    /// minor units (x100), rejecting non-positive amounts and amounts with
    /// sub-minor-unit precision.
    #[instrument(skip(self))]
    pub async fn create_checkout_order(&self, amount: Decimal) -> Result<CheckoutOrder, ServiceError> {
        let minor = to_minor_units(amount)?;

        let order = self
            .gateway
            .create_order(CreateGatewayOrderRequest {
                amount: minor,
                currency: self.currency.clone(),
                receipt: receipt_id(),
            })
            .await?;

        if order.id.is_empty() {
            return Err(ServiceError::ExternalServiceError(
                "gateway returned an order without an id".to_string(),
            ));
        }

        info!(order_id = %order.id, amount_minor = order.amount, "Created gateway order");

        Ok(CheckoutOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.key_id.clone(),
        })
    }

    /// Verifies a callback signature against the configured key secret.
    pub fn signature_valid(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        signature_matches(&self.key_secret, gateway_order_id, payment_id, signature)
    }
}

/// Constant-time check that `signature` is the expected digest for the
/// given identifiers.
pub fn signature_matches(
    secret: &str,
    gateway_order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = compute_signature(secret, gateway_order_id, payment_id);
    constant_time_eq(&expected, signature)
}

/// Converts a major-unit amount to integer minor units (x100).
pub fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let minor = amount * Decimal::from(100);
    if !minor.fract().is_zero() {
        return Err(ServiceError::ValidationError(
            "Amount has sub-minor-unit precision".to_string(),
        ));
    }

    minor
        .to_i64()
        .ok_or_else(|| ServiceError::ValidationError("Amount out of range".to_string()))
}

/// Hex digest of `HMAC-SHA256(secret, order_id + "|" + payment_id)`.
pub fn compute_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}|{}", gateway_order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
