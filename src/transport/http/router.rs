use crate::domain::model::{
    Category, CategoryDraft, CategoryPatch, Product, ProductDraft, ProductPatch,
};
use crate::domain::stats::{CatalogStats, CategoryCount};
use crate::transport::http::handlers::common::method_not_allowed;
use crate::transport::http::handlers::{categories, health, products, stats};
use crate::transport::http::types::{
    ApiResponse, AppState, CreateCategoryRequest, CreateProductRequest, DeleteRequest,
    UpdateCategoryRequest, UpdateProductRequest,
};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        categories::list_categories_handler,
        categories::create_category_handler,
        categories::update_category_handler,
        categories::delete_category_handler,
        products::list_products_handler,
        products::create_product_handler,
        products::update_product_handler,
        products::delete_product_handler,
        stats::stats_handler
    ),
    components(schemas(
        ApiResponse,
        Category,
        CategoryDraft,
        CategoryPatch,
        Product,
        ProductDraft,
        ProductPatch,
        CreateCategoryRequest,
        UpdateCategoryRequest,
        CreateProductRequest,
        UpdateProductRequest,
        DeleteRequest,
        CatalogStats,
        CategoryCount
    ))
)]
pub struct ApiDoc;

/// Routes for the catalog API. Each collection resource dispatches on the method and
/// answers anything else with 405 and an `Allow` header.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/categories",
            get(categories::list_categories_handler)
                .post(categories::create_category_handler)
                .put(categories::update_category_handler)
                .delete(categories::delete_category_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/products",
            get(products::list_products_handler)
                .post(products::create_product_handler)
                .put(products::update_product_handler)
                .delete(products::delete_product_handler)
                .fallback(method_not_allowed),
        )
        .route("/api/stats", get(stats::stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
