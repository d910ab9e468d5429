use crate::errors::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Order handle returned by the payment gateway before the customer pays.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in currency minor units (paise for INR)
    pub amount: i64,
    pub currency: String,
}

/// Request body for gateway order creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGatewayOrderRequest {
    /// Amount in currency minor units
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Seam over the payment gateway's order-creation API.
///
/// Production uses [`RazorpayClient`]; tests substitute a scripted
/// implementation so no network traffic leaves the process.
#[async_trait]
pub trait PaymentGatewayApi: Send + Sync {
    async fn create_order(
        &self,
        request: CreateGatewayOrderRequest,
    ) -> Result<GatewayOrder, ServiceError>;
}

/// Razorpay Orders API client
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }
}

#[async_trait]
impl PaymentGatewayApi for RazorpayClient {
    #[instrument(skip(self))]
    async fn create_order(
        &self,
        request: CreateGatewayOrderRequest,
    ) -> Result<GatewayOrder, ServiceError> {
        let url = format!("{}/v1/orders", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("gateway order creation failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "gateway order creation returned {status}"
            )));
        }

        response.json::<GatewayOrder>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("malformed gateway order response: {e}"))
        })
    }
}

/// Gateway receipt identifier: `rcpt_` plus a millisecond timestamp.
pub fn receipt_id() -> String {
    format!("rcpt_{}", chrono::Utc::now().timestamp_millis())
}
