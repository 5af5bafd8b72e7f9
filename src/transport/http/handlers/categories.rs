use crate::domain::model::Category;
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
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 500, description = "Store failure", body = ApiResponse),
        (status = 504, description = "Store call timed out", body = ApiResponse)
    )
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    list_records(state.catalog.categories()).await
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Missing or invalid name", body = ApiResponse),
        (status = 409, description = "A category with this name already exists", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    create_record(state.catalog.categories(), body).await
}

#[utoipa::path(
    put,
    path = "/api/categories",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category renamed", body = Category),
        (status = 400, description = "Missing or invalid field", body = ApiResponse),
        (status = 404, description = "No category with this id", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn update_category_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    update_record(state.catalog.categories(), body).await
}

#[utoipa::path(
    delete,
    path = "/api/categories",
    request_body = DeleteRequest,
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Missing or invalid id", body = ApiResponse),
        (status = 404, description = "No category with this id", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    delete_record(state.catalog.categories(), body).await
}
