//! Product CRUD endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Serialize;
use tracing::instrument;

use mona_core::ProductId;

use super::ScopeQuery;
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub status: &'static str,
    pub id: ProductId,
}

/// List products, newest first.
///
/// # Errors
///
/// Returns 400 for an invalid `user_id`, or 500 if the query fails.
pub async fn list_products(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ProductListResponse>> {
    let tenant = query.tenant()?;
    let repo = ProductRepository::new(state.pool(), tenant.as_ref());

    Ok(Json(ProductListResponse {
        products: repo.list(query.limit()).await?,
        total: repo.count().await?,
    }))
}

/// Create a product.
///
/// # Errors
///
/// Returns 400 for a missing name or negative price, 409 for a duplicate
/// SKU, or 500 if the insert fails.
#[instrument(skip_all, fields(user_id = ?query.user_id))]
pub async fn create_product(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if let Some(problem) = product.problem() {
        return Err(AppError::BadRequest(format!("Invalid product: {problem}")));
    }
    let tenant = query.tenant()?;

    let created = ProductRepository::new(state.pool(), tenant.as_ref())
        .create(&product)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns 404 if the product is not visible to the tenant, 409 for a
/// duplicate SKU, or 500 if the update fails.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update_product(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<ScopeQuery>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Product name cannot be empty".to_string()));
    }
    let tenant = query.tenant()?;

    ProductRepository::new(state.pool(), tenant.as_ref())
        .update(id, &update)
        .await
        .map(Json)
        .map_err(not_found)
}

/// Delete a product.
///
/// # Errors
///
/// Returns 404 if the product is not visible to the tenant, or 500 if the
/// delete fails.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn delete_product(
    _auth: RequireApiKey,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<DeletedResponse>> {
    let tenant = query.tenant()?;

    ProductRepository::new(state.pool(), tenant.as_ref())
        .delete(id)
        .await
        .map_err(not_found)?;
    Ok(Json(DeletedResponse {
        status: "deleted",
        id,
    }))
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => other.into(),
    }
}
