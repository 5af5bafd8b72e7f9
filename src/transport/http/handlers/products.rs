use crate::domain::model::Product;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{
    create_record, delete_record, list_records, update_record,
};
use crate::transport::http::types::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [Product]),
        (status = 500, description = "Store failure", body = ApiResponse),
        (status = 504, description = "Store call timed out", body = ApiResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    list_records(state.catalog.products()).await
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Missing or invalid name, categoryid or price", body = ApiResponse),
        (status = 409, description = "A product with this name already exists", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    create_record(state.catalog.products(), body).await
}

#[utoipa::path(
    put,
    path = "/api/products",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated (only supplied fields change)", body = Product),
        (status = 400, description = "Missing or invalid field", body = ApiResponse),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    update_record(state.catalog.products(), body).await
}

#[utoipa::path(
    delete,
    path = "/api/products",
    request_body = DeleteRequest,
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Missing or invalid id", body = ApiResponse),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    delete_record(state.catalog.products(), body).await
}
