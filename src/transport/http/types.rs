use crate::app::CatalogService;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Envelope for error and status responses. Collections and records are returned bare.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct UpdateCategoryRequest {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub categoryid: i64,
    /// Must be >= 0.
    pub price: f64,
}

/// Only the supplied fields change.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct UpdateProductRequest {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub categoryid: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct DeleteRequest {
    pub id: i64,
}
