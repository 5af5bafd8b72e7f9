// src/bin/api_server.rs

use catalog_admin::infra::{logging, Config};
use catalog_admin::transport;
use catalog_admin::CatalogService;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // --- Configuration ---
    let config = Config::from_env()?;
    info!(
        backend = config.backend.as_str(),
        timeout_secs = config.store_timeout.as_secs(),
        "configuration loaded"
    );

    // --- Service Initialization ---
    let catalog = CatalogService::from_config(&config).await?;
    // An unreachable store at startup is reported but not fatal; /health keeps reporting it.
    match catalog.ping().await {
        Ok(()) => info!("store reachable"),
        Err(e) => warn!(error = %e, "store not reachable at startup"),
    }
    let app_state = transport::http::AppState::new(catalog);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "API server listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
