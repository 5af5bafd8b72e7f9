use crate::app::Collection;
use crate::domain::model::Entity;
use crate::domain::validate::parse_delete;
use crate::transport::http::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode};
use axum::Json;
use serde_json::Value as JsonValue;

/// Unwraps the JSON body; a malformed body is an input error (400), not a 422.
pub fn read_body(body: Result<Json<JsonValue>, JsonRejection>) -> Result<JsonValue, ApiError> {
    let Json(value) = body?;
    Ok(value)
}

pub async fn list_records<E: Entity>(
    collection: Collection<'_, E>,
) -> Result<Json<Vec<E>>, ApiError> {
    Ok(Json(collection.list().await?))
}

pub async fn create_record<E: Entity>(
    collection: Collection<'_, E>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let body = read_body(body)?;
    let draft = E::parse_draft(&body)?;
    let created = collection.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_record<E: Entity>(
    collection: Collection<'_, E>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let body = read_body(body)?;
    let (id, patch) = E::parse_update(&body)?;
    Ok(Json(collection.update(id, patch).await?))
}

pub async fn delete_record<E: Entity>(
    collection: Collection<'_, E>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let body = read_body(body)?;
    let id = parse_delete(&body, E::LABEL)?;
    collection.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for any method a collection resource does not serve.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}
