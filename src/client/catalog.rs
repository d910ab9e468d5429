//! Read path from the backend product collection to the storefront UI.

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Image reference substituted when a record carries none.
pub const PLACEHOLDER_IMAGE: &str = "public/images/placeholder.jpg";
const DEFAULT_CATEGORY: &str = "Uncategorized";

/// The catalog could not be loaded; callers must render an explicit
/// empty/error state rather than showing stale data.
#[derive(Debug, Error)]
#[error("catalog unavailable: {reason}")]
pub struct CatalogUnavailable {
    pub reason: String,
}

/// A catalog record normalized into the stable shape the UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub description: String,
}

/// Fetches the product list from the backend and normalizes records that
/// differ in id field naming or omit optional fields.
pub struct CatalogGateway {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches every product. Any transport failure, non-success status or
    /// malformed body is a [`CatalogUnavailable`].
    pub async fn fetch_all(&self) -> Result<Vec<CatalogProduct>, CatalogUnavailable> {
        let url = format!("{}/products", self.base_url.trim_end_matches('/'));

        let response = self.http.get(&url).send().await.map_err(|e| CatalogUnavailable {
            reason: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogUnavailable {
                reason: format!("backend returned {status}"),
            });
        }

        let records: Vec<Value> = response.json().await.map_err(|e| CatalogUnavailable {
            reason: format!("malformed product list: {e}"),
        })?;

        Ok(records.iter().map(normalize_record).collect())
    }
}

/// Maps a raw backend record into a [`CatalogProduct`], canonicalizing the
/// heterogeneous id field (`id`, `_id`, `productId`, or a generated
/// surrogate) and substituting documented defaults for missing fields.
fn normalize_record(record: &Value) -> CatalogProduct {
    let id = ["id", "_id", "productId"]
        .iter()
        .find_map(|key| id_as_string(record.get(key)))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    CatalogProduct {
        id,
        name: record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        price: price_of(record.get("price")),
        category: non_empty_string(record.get("category"))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        image: non_empty_string(record.get("image"))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        description: record
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn id_as_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn price_of(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::String(s)) => s.parse().unwrap_or(Decimal::ZERO),
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(Decimal::from_f64_retain)
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
