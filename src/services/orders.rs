use crate::{
    entities::{order, Order, OrderModel},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Customer fields collected by the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// One purchased line as the storefront submits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub qty: i32,
    pub price: Decimal,
}

/// Input for persisting an order after successful signature verification.
#[derive(Debug, Clone)]
pub struct VerifiedOrderInput {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub customer: CustomerDetails,
    pub items: Vec<OrderLine>,
    pub currency: String,
}

/// Order repository service.
///
/// Orders are insert-only: one row per verified payment, plus the legacy
/// direct-insert path. There is no update surface.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persists an order for a verified payment, exactly once per payment id.
    ///
    /// Duplicate submissions of the same `payment_id` (client retries after
    /// an ambiguous response) return the already-stored order instead of
    /// double-recording. The dedupe check and the insert share one
    /// transaction; a unique index on `payment_id` backstops races between
    /// concurrent submissions.
    ///
    /// Returns the order and whether it was newly created.
    #[instrument(skip(self, input), fields(payment_id = %input.payment_id))]
    pub async fn record_verified(
        &self,
        input: VerifiedOrderInput,
    ) -> Result<(OrderModel, bool), ServiceError> {
        let txn = self.db.begin().await?;

        if let Some(existing) = Order::find()
            .filter(order::Column::PaymentId.eq(input.payment_id.as_str()))
            .one(&txn)
            .await?
        {
            txn.commit().await?;
            info!(
                payment_id = %input.payment_id,
                order_id = %existing.id,
                "Payment already recorded; returning existing order"
            );
            return Ok((existing, false));
        }

        let amount: Decimal = input
            .items
            .iter()
            .map(|line| line.price * Decimal::from(line.qty))
            .sum();

        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            gateway_order_id: Set(Some(input.gateway_order_id)),
            payment_id: Set(Some(input.payment_id.clone())),
            customer: Set(serde_json::to_value(&input.customer)?),
            items: Set(serde_json::to_value(&input.items)?),
            amount: Set(Some(amount)),
            currency: Set(input.currency),
            placed_at: Set(Utc::now()),
        };

        let order = model.insert(&txn).await?;
        txn.commit().await?;

        info!(order_id = %order.id, "Recorded verified order");
        Ok((order, true))
    }

    /// Direct order insert, bypassing payment verification.
    ///
    /// Backs `POST /orders`; rows created here carry no gateway
    /// identifiers.
    #[instrument(skip(self, customer, items))]
    pub async fn record_direct(
        &self,
        customer: serde_json::Value,
        items: serde_json::Value,
        currency: String,
    ) -> Result<OrderModel, ServiceError> {
        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            gateway_order_id: Set(None),
            payment_id: Set(None),
            customer: Set(customer),
            items: Set(items),
            amount: Set(None),
            currency: Set(currency),
            placed_at: Set(Utc::now()),
        };

        let order = model.insert(&*self.db).await?;
        info!(order_id = %order.id, "Recorded direct order");
        Ok(order)
    }

    /// Lists all orders, newest first. Admin-only at the HTTP layer.
    pub async fn list(&self) -> Result<Vec<OrderModel>, ServiceError> {
        let orders = Order::find()
            .order_by_desc(order::Column::PlacedAt)
            .all(&*self.db)
            .await?;
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_lines_serialize_with_the_storefront_field_names() {
        let line = OrderLine {
            id: "p1".to_string(),
            name: "Embroidered dupatta".to_string(),
            qty: 2,
            price: dec!(500),
        };

        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["qty"], 2);
        assert_eq!(value["price"], "500");
    }

    #[test]
    fn customer_details_round_trip() {
        let json = r#"{
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9876543210",
            "address": "12 Lake Road"
        }"#;

        let customer: CustomerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(customer.name, "Asha");
        assert_eq!(customer.phone, "9876543210");
    }

    #[test]
    fn verified_order_amount_sums_line_totals() {
        let items = vec![
            OrderLine {
                id: "p1".into(),
                name: "a".into(),
                qty: 2,
                price: dec!(500),
            },
            OrderLine {
                id: "p2".into(),
                name: "b".into(),
                qty: 1,
                price: dec!(249.50),
            },
        ];

        let amount: Decimal = items
            .iter()
            .map(|line| line.price * Decimal::from(line.qty))
            .sum();

        assert_eq!(amount, dec!(1249.50));
    }
}
