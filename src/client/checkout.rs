//! Checkout orchestration: validation, gateway order creation, the
//! payment-widget suspension and callback verification.

use crate::client::store::{StateStorage, StoreError, StorefrontStore};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// How long the orchestrator waits on the payment widget before giving up.
const DEFAULT_WIDGET_TIMEOUT: Duration = Duration::from_secs(300);

/// Orchestrator position in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Validating,
    CreatingOrder,
    AwaitingPayment,
    Verifying,
    Settled,
    Failed,
}

/// Customer fields the checkout form collects; all required.
#[derive(Debug, Clone)]
pub struct CheckoutCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// The gateway order handle the widget opens with.
#[derive(Debug, Clone)]
pub struct GatewayOrderHandle {
    pub order_id: String,
    /// Amount in currency minor units, as the gateway returned it
    pub amount: i64,
    pub currency: String,
    pub key: String,
}

/// What the external payment widget reported back.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The customer paid; the gateway supplied a payment id and signature
    Completed {
        payment_id: String,
        signature: String,
    },
    /// The widget reported a payment failure
    Failed { reason: String },
    /// The customer closed the widget without paying
    Dismissed,
}

/// Seam over the externally-provided payment widget.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn collect_payment(
        &self,
        order: &GatewayOrderHandle,
        prefill: &CheckoutCustomer,
    ) -> PaymentOutcome;
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Validation: nothing to pay for. Surfaced inline, never sent upstream.
    #[error("cart is empty")]
    EmptyCart,

    /// Validation: a required customer field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The backend did not return a usable gateway order.
    #[error("could not create order: {0}")]
    OrderCreation(String),

    /// The widget reported the payment itself failed.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// The widget never resolved within the configured timeout.
    #[error("payment widget timed out")]
    WidgetTimeout,

    /// The backend rejected the callback signature. Distinct from
    /// transport failures: the customer is told to contact support.
    #[error("payment verification failed")]
    VerificationRejected,

    /// Transport failure talking to the verification endpoint.
    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result of a completed submission that did not error.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Payment verified and recorded; the cart has been cleared.
    Settled { payment_id: String },
    /// The customer dismissed the widget; the cart is intact.
    Cancelled,
}

/// Drives the checkout flow `Idle -> Validating -> CreatingOrder ->
/// AwaitingPayment -> Verifying -> Settled`, with failure exits to
/// `Failed` from any non-terminal state.
///
/// Invariants:
/// - an empty cart never reaches the order-creation endpoint
/// - widget dismissal returns to `Idle` with the cart intact
/// - the cart is cleared only after the backend confirms verification
/// - nothing retries automatically; the customer must resubmit
pub struct CheckoutOrchestrator<W: PaymentWidget> {
    http: reqwest::Client,
    base_url: String,
    widget: W,
    widget_timeout: Duration,
    state: CheckoutState,
}

impl<W: PaymentWidget> CheckoutOrchestrator<W> {
    pub fn new(base_url: impl Into<String>, widget: W) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            widget,
            widget_timeout: DEFAULT_WIDGET_TIMEOUT,
            state: CheckoutState::Idle,
        }
    }

    pub fn with_widget_timeout(mut self, timeout: Duration) -> Self {
        self.widget_timeout = timeout;
        self
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Runs one checkout attempt for the current cart contents.
    pub async fn submit<S: StateStorage>(
        &mut self,
        store: &mut StorefrontStore<S>,
        customer: &CheckoutCustomer,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.state = CheckoutState::Validating;
        if let Err(err) = validate(store, customer) {
            self.state = CheckoutState::Idle;
            return Err(err);
        }

        let amount = store.total();

        self.state = CheckoutState::CreatingOrder;
        let order = match self.create_order(amount).await {
            Ok(order) => order,
            Err(err) => {
                self.state = CheckoutState::Failed;
                return Err(err);
            }
        };

        self.state = CheckoutState::AwaitingPayment;
        let outcome = match tokio::time::timeout(
            self.widget_timeout,
            self.widget.collect_payment(&order, customer),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(order_id = %order.order_id, "Payment widget timed out");
                self.state = CheckoutState::Failed;
                return Err(CheckoutError::WidgetTimeout);
            }
        };

        match outcome {
            PaymentOutcome::Dismissed => {
                // Opening the widget consumed nothing; the attempt simply ends.
                info!(order_id = %order.order_id, "Checkout dismissed by the customer");
                self.state = CheckoutState::Idle;
                Ok(CheckoutOutcome::Cancelled)
            }
            PaymentOutcome::Failed { reason } => {
                self.state = CheckoutState::Failed;
                Err(CheckoutError::PaymentFailed(reason))
            }
            PaymentOutcome::Completed {
                payment_id,
                signature,
            } => {
                self.state = CheckoutState::Verifying;
                if let Err(err) = self
                    .verify(&order, &payment_id, &signature, store, customer)
                    .await
                {
                    self.state = CheckoutState::Failed;
                    return Err(err);
                }

                // Only a confirmed verification may consume the cart.
                store.clear_cart()?;
                self.state = CheckoutState::Settled;
                info!(payment_id = %payment_id, "Checkout settled");
                Ok(CheckoutOutcome::Settled { payment_id })
            }
        }
    }

    async fn create_order(&self, amount: Decimal) -> Result<GatewayOrderHandle, CheckoutError> {
        let url = format!("{}/create-order", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "amount": amount }))
            .send()
            .await
            .map_err(|e| CheckoutError::OrderCreation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::OrderCreation(format!(
                "backend returned {status}"
            )));
        }

        let reply: CreateOrderReply = response
            .json()
            .await
            .map_err(|e| CheckoutError::OrderCreation(format!("malformed response: {e}")))?;

        // Absence of the order id is a hard failure
        let order_id = reply
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CheckoutError::OrderCreation("order not created".to_string()))?;

        Ok(GatewayOrderHandle {
            order_id,
            amount: reply.amount.unwrap_or_default(),
            currency: reply.currency.unwrap_or_default(),
            key: reply.key.unwrap_or_default(),
        })
    }

    async fn verify<S: StateStorage>(
        &self,
        order: &GatewayOrderHandle,
        payment_id: &str,
        signature: &str,
        store: &StorefrontStore<S>,
        customer: &CheckoutCustomer,
    ) -> Result<(), CheckoutError> {
        let url = format!("{}/verify-order", self.base_url.trim_end_matches('/'));

        let items: Vec<serde_json::Value> = store
            .cart_lines()
            .iter()
            .map(|line| {
                serde_json::json!({
                    "id": line.product_id,
                    "name": line.name,
                    "qty": line.quantity,
                    "price": line.price,
                })
            })
            .collect();

        let body = serde_json::json!({
            "razorpay_order_id": order.order_id,
            "razorpay_payment_id": payment_id,
            "razorpay_signature": signature,
            "orderData": {
                "name": customer.name,
                "email": customer.email,
                "phone": customer.phone,
                "address": customer.address,
                "items": items,
            },
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(format!("verification request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::Network(format!(
                "verification endpoint returned {status}"
            )));
        }

        let reply: VerifyReply = response
            .json()
            .await
            .map_err(|e| CheckoutError::Network(format!("malformed verification reply: {e}")))?;

        if reply.success {
            Ok(())
        } else {
            Err(CheckoutError::VerificationRejected)
        }
    }
}

fn validate<S: StateStorage>(
    store: &StorefrontStore<S>,
    customer: &CheckoutCustomer,
) -> Result<(), CheckoutError> {
    if store.cart_count() == 0 || store.total() <= Decimal::ZERO {
        return Err(CheckoutError::EmptyCart);
    }

    for (field, value) in [
        ("name", &customer.name),
        ("email", &customer.email),
        ("phone", &customer.phone),
        ("address", &customer.address),
    ] {
        if value.trim().is_empty() {
            return Err(CheckoutError::MissingField(field));
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct CreateOrderReply {
    id: Option<String>,
    amount: Option<i64>,
    currency: Option<String>,
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyReply {
    success: bool,
}
