pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::CatalogService;
pub use domain::model::{Category, Entity, Product};
pub use infra::config::{Config, StoreBackend};
pub use storage::{EntityStore, JsonFileStore, PgTableStore, RestTableStore, StoreError};
