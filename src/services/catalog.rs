use crate::{
    entities::{product, Product, ProductModel},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Image reference used when a product is created without one.
pub const PLACEHOLDER_IMAGE: &str = "public/images/placeholder.jpg";
const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Product catalog service: CRUD over the products collection.
///
/// Reads are public; every mutation sits behind the admin gate at the HTTP
/// layer. Updates are last-write-wins; there is no versioning on product
/// records.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the whole catalog, oldest first.
    pub async fn list(&self) -> Result<Vec<ProductModel>, ServiceError> {
        let products = Product::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Fetches one product by id.
    pub async fn get(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Creates a product, filling documented defaults for omitted fields.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateProductInput) -> Result<ProductModel, ServiceError> {
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            price: Set(input.price),
            category: Set(input
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
            image: Set(input
                .image
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())),
            description: Set(input.description.unwrap_or_default()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db).await?;
        info!(product_id = %created.id, "Created product");
        Ok(created)
    }

    /// Applies a partial update; absent fields keep their stored values.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let existing = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let mut model: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(category) = input.category {
            model.category = Set(category);
        }
        if let Some(image) = input.image {
            model.image = Set(image);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;
        info!(product_id = %updated.id, "Updated product");
        Ok(updated)
    }

    /// Deletes a product; `NotFound` when the id does not exist (the
    /// delete-then-update race surfaces here, and the caller must handle it).
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        existing.delete(&*self.db).await?;
        info!(product_id = %id, "Deleted product");
        Ok(())
    }
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Input for a partial product update
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}
