//! The catalog service.
//!
//! This module sits between the HTTP layer and the configured stores. It is
//! responsible for:
//! 1.  Building the category and product stores for the selected backend.
//! 2.  Recording when a store call last succeeded, so `/health` can tell a stale
//!     service from a healthy one.
//! 3.  Aggregating both collections for the dashboard statistics.

use crate::domain::model::{Category, Entity, Product};
use crate::domain::stats::CatalogStats;
use crate::infra::config::{Config, StoreBackend};
use crate::storage::postgres::connect_pool;
use crate::storage::{EntityStore, JsonFileStore, PgTableStore, RestTableStore, StoreError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Timestamps of the last successful and failed store calls.
#[derive(Default)]
pub struct StoreHealth {
    last_success: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<(DateTime<Utc>, String)>>,
}

impl StoreHealth {
    pub async fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.read().await
    }

    pub async fn last_error(&self) -> Option<(DateTime<Utc>, String)> {
        self.last_error.read().await.clone()
    }

    async fn observe<T>(&self, result: &Result<T, StoreError>) {
        match result {
            Ok(_) => {
                *self.last_success.write().await = Some(Utc::now());
            }
            // Client-side outcomes say nothing about backend reachability.
            Err(StoreError::NotFound { .. }) | Err(StoreError::Duplicate(_)) => {
                *self.last_success.write().await = Some(Utc::now());
            }
            Err(e) => {
                *self.last_error.write().await = Some((Utc::now(), e.to_string()));
            }
        }
    }
}

/// One collection's store, with every call reported to the shared health record.
pub struct Collection<'a, E: Entity> {
    store: &'a dyn EntityStore<E>,
    health: &'a StoreHealth,
}

impl<'a, E: Entity> Collection<'a, E> {
    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        let result = self.store.list().await;
        self.health.observe(&result).await;
        result
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        let result = self.store.create(draft).await;
        self.health.observe(&result).await;
        if let Ok(record) = &result {
            info!(table = E::TABLE, id = record.id(), "record created");
        }
        result
    }

    pub async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        let result = self.store.update(id, patch).await;
        self.health.observe(&result).await;
        if result.is_ok() {
            info!(table = E::TABLE, id, "record updated");
        }
        result
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = self.store.delete(id).await;
        self.health.observe(&result).await;
        if result.is_ok() {
            info!(table = E::TABLE, id, "record deleted");
        }
        result
    }
}

/// The main service that owns the category and product stores.
pub struct CatalogService {
    backend: StoreBackend,
    categories: Arc<dyn EntityStore<Category>>,
    products: Arc<dyn EntityStore<Product>>,
    health: StoreHealth,
}

impl CatalogService {
    pub fn new(
        backend: StoreBackend,
        categories: Arc<dyn EntityStore<Category>>,
        products: Arc<dyn EntityStore<Product>>,
    ) -> Self {
        Self {
            backend,
            categories,
            products,
            health: StoreHealth::default(),
        }
    }

    /// Builds both stores for the backend selected in `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let service = match config.backend {
            StoreBackend::File => {
                info!(data_dir = %config.data_dir.display(), "using JSON file store");
                Self::new(
                    StoreBackend::File,
                    Arc::new(JsonFileStore::<Category>::new(config.categories_path())),
                    Arc::new(JsonFileStore::<Product>::new(config.products_path())),
                )
            }
            StoreBackend::Rest => {
                let base_url = config
                    .remote_url
                    .clone()
                    .context("REMOTE_URL must be set when STORE_BACKEND=rest")?;
                let api_key = config
                    .remote_api_key
                    .clone()
                    .context("REMOTE_API_KEY must be set when STORE_BACKEND=rest")?;
                let client = reqwest::Client::builder()
                    .timeout(config.store_timeout)
                    .build()?;
                info!(%base_url, "using remote table store (REST)");
                Self::new(
                    StoreBackend::Rest,
                    Arc::new(RestTableStore::<Category>::new(
                        client.clone(),
                        base_url.clone(),
                        api_key.clone(),
                        config.store_timeout,
                    )),
                    Arc::new(RestTableStore::<Product>::new(
                        client,
                        base_url,
                        api_key,
                        config.store_timeout,
                    )),
                )
            }
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set when STORE_BACKEND=postgres")?;
                let pool = connect_pool(database_url, config.store_timeout).await?;
                info!("using remote table store (PostgreSQL)");
                Self::new(
                    StoreBackend::Postgres,
                    Arc::new(PgTableStore::<Category>::new(pool.clone(), config.store_timeout)),
                    Arc::new(PgTableStore::<Product>::new(pool, config.store_timeout)),
                )
            }
        };
        Ok(service)
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    pub fn health(&self) -> &StoreHealth {
        &self.health
    }

    pub fn categories(&self) -> Collection<'_, Category> {
        Collection {
            store: self.categories.as_ref(),
            health: &self.health,
        }
    }

    pub fn products(&self) -> Collection<'_, Product> {
        Collection {
            store: self.products.as_ref(),
            health: &self.health,
        }
    }

    /// Dashboard figures; both collections are read concurrently.
    pub async fn stats(&self) -> Result<CatalogStats, StoreError> {
        let categories = self.categories();
        let products = self.products();
        let (categories, products) = tokio::try_join!(categories.list(), products.list())?;
        debug!(
            categories = categories.len(),
            products = products.len(),
            "computing catalog stats"
        );
        Ok(CatalogStats::compute(&categories, &products))
    }

    /// Pings both stores.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let result = async {
            self.categories.ping().await?;
            self.products.ping().await
        }
        .await;
        if let Err(e) = &result {
            warn!(backend = self.backend.as_str(), error = %e, "store ping failed");
        }
        self.health.observe(&result).await;
        result
    }
}
