use crate::domain::stats::CatalogStats;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard figures over both collections", body = CatalogStats),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<CatalogStats>, ApiError> {
    Ok(Json(state.catalog.stats().await?))
}
