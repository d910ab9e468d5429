use crate::handlers::common::{normalize_optional_string, normalize_string, validate_input};
use crate::{
    entities::ProductModel,
    errors::ServiceError,
    services::catalog::{CreateProductInput, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_price_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Price must be greater than 0".into());
        Err(err)
    }
}

/// List all products (public)
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ServiceError> {
    let products = state.services.catalog.list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Create a new product (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let name = normalize_string(payload.name);
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Product name cannot be blank".to_string(),
        ));
    }

    let input = CreateProductInput {
        name,
        price: payload.price,
        category: normalize_optional_string(payload.category),
        image: normalize_optional_string(payload.image),
        description: payload.description,
    };

    let product = state.services.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Update a product (admin); absent fields are left untouched
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    validate_input(&payload)?;

    let input = UpdateProductInput {
        name: normalize_optional_string(payload.name),
        price: payload.price,
        category: normalize_optional_string(payload.category),
        image: normalize_optional_string(payload.image),
        description: payload.description,
    };

    state.services.catalog.update(id, input).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Delete a product (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.catalog.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom = "validate_price_positive")]
    pub price: Decimal,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[validate(custom = "validate_optional_price_positive")]
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

fn validate_optional_price_positive(value: &Decimal) -> Result<(), ValidationError> {
    validate_price_positive(value)
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub description: String,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            category: model.category,
            image: model.image,
            description: model.description,
        }
    }
}
