//! Persistence backends for catalog collections.

use crate::domain::model::Entity;
use crate::domain::validate::DuplicateName;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod file;
pub mod postgres;
pub mod rest;

pub use file::JsonFileStore;
pub use postgres::PgTableStore;
pub use rest::RestTableStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: i64 },
    #[error("{0}")]
    Duplicate(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found<E: Entity>(id: i64) -> Self {
        StoreError::NotFound { label: E::LABEL, id }
    }
}

impl From<DuplicateName> for StoreError {
    fn from(err: DuplicateName) -> Self {
        StoreError::Duplicate(err.to_string())
    }
}

/// Common persistence interface for one collection.
///
/// Every call may do blocking-style I/O (file or network), so the trait is async and
/// implementations never keep an in-process copy of the collection between calls.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// All records, in storage order.
    async fn list(&self) -> Result<Vec<E>, StoreError>;

    /// Stores a new record and returns it with its assigned id.
    async fn create(&self, draft: E::Draft) -> Result<E, StoreError>;

    /// Applies a sparse update to the record with `id`.
    async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError>;

    /// Removes exactly the record with `id`.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Cheap reachability check used by `/health` and `preflight`.
    async fn ping(&self) -> Result<(), StoreError>;
}
