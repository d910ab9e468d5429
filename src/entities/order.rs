use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order entity; one row per verified payment (or direct insert).
///
/// `customer` and `items` keep the document shape the storefront submits,
/// so the admin surface can render them without a join.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(nullable)]
    pub gateway_order_id: Option<String>,
    /// Gateway payment id; unique, deduplicates verification retries
    #[sea_orm(nullable)]
    pub payment_id: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub customer: Json,
    #[sea_orm(column_type = "Json")]
    pub items: Json,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub amount: Option<Decimal>,
    pub currency: String,
    pub placed_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
