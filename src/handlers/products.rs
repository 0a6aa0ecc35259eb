use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::catalog::{NewProduct, Product, ProductPatch};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/products - Full product list, newest first
pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let products = state.catalog.list().await;
    (
        [(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate")],
        Json(products),
    )
}

/// GET /api/products/:id - Single product
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get(&id).await?))
}

/// POST /api/products - Create from a multipart form
///
/// Text fields: `name`, `price` (both required), `description`, `outOfStock`.
/// File fields: `images` (up to 8), `video` (at most 1).
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let form = state.uploads.read_create_form(&mut multipart).await?;
    let input = NewProduct::from_form(&form.fields, form.images, form.video)?;
    let product = state.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /api/products/:id - Partial update from a JSON object
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
    let body = body
        .as_object()
        .ok_or_else(|| ApiError::invalid_json("Request body must be a JSON object"))?;

    let patch = ProductPatch::from_json(body);
    tracing::debug!("PATCH /api/products/{} {:?}", id, patch);

    Ok(Json(state.catalog.update(&id, &patch).await?))
}

/// DELETE /api/products/:id - Remove from the catalog, keeping media files
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
