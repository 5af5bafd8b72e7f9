//! Remote table store over a direct PostgreSQL connection.
//!
//! Same semantics as the REST variant: one statement per operation, rows come back as
//! `row_to_json`, ids are assigned by the table and uniqueness is enforced (if at all) by
//! the table's own constraints.

use crate::domain::model::Entity;
use crate::storage::{EntityStore, StoreError};
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

const UNIQUE_VIOLATION: &str = "23505";

/// Connects a small pool; every acquire is bounded by `timeout`.
pub async fn connect_pool(database_url: &str, timeout: Duration) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgTableStore<E> {
    pool: PgPool,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgTableStore<E> {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Err(_) => Err(StoreError::Timeout(self.timeout)),
            Ok(Err(sqlx::Error::PoolTimedOut)) => Err(StoreError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(Self::db_error(e)),
            Ok(Ok(v)) => Ok(v),
        }
    }

    fn db_error(e: sqlx::Error) -> StoreError {
        let unique = e
            .as_database_error()
            .and_then(|db| db.code())
            .map_or(false, |code| code == UNIQUE_VIOLATION);
        if unique {
            return StoreError::Duplicate(format!("{} conflicts with an existing row", E::LABEL));
        }
        anyhow::Error::new(e)
            .context(format!("table '{}' query failed", E::TABLE))
            .into()
    }

    fn decode(record: JsonValue) -> Result<E, StoreError> {
        serde_json::from_value(record)
            .map_err(|e| anyhow!("unexpected row shape in '{}': {}", E::TABLE, e).into())
    }

    /// Writable `(column, value)` pairs of a draft or patch, restricted to known columns.
    fn columns_of<T: Serialize>(
        value: &T,
    ) -> Result<Vec<(&'static str, &'static str, JsonValue)>, StoreError> {
        let JsonValue::Object(map) = serde_json::to_value(value).map_err(anyhow::Error::new)? else {
            return Err(anyhow!("{} payload must serialize to an object", E::LABEL).into());
        };
        Ok(E::COLUMNS
            .iter()
            .filter_map(|(col, sql_type)| map.get(*col).map(|v| (*col, *sql_type, v.clone())))
            .collect())
    }

    /// Pushes `(($n::jsonb) #>> '{}')::<type>` so every column is bound the same way.
    fn push_cast(qb: &mut QueryBuilder<'_, Postgres>, value: JsonValue, sql_type: &str) {
        qb.push("((")
            .push_bind(value)
            .push("::jsonb) #>> '{}')::")
            .push(sql_type);
    }

    async fn fetch_one(&self, id: i64) -> Result<E, StoreError> {
        let sql = format!(
            "SELECT row_to_json(t.*) AS record FROM {} t WHERE t.id = $1::int8",
            E::TABLE
        );
        let row = self
            .bounded(sqlx::query(&sql).bind(id).fetch_optional(&self.pool))
            .await?
            .ok_or_else(|| StoreError::not_found::<E>(id))?;
        let record: JsonValue = row.try_get("record").map_err(Self::db_error)?;
        Self::decode(record)
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for PgTableStore<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let sql = format!(
            "SELECT row_to_json(t.*) AS record FROM {} t ORDER BY t.id",
            E::TABLE
        );
        let rows = self.bounded(sqlx::query(&sql).fetch_all(&self.pool)).await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let record: JsonValue = row.try_get("record").map_err(Self::db_error)?;
            items.push(Self::decode(record)?);
        }
        Ok(items)
    }

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        let columns = Self::columns_of(&draft)?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO ");
        qb.push(E::TABLE).push(" (");
        for (i, (col, _, _)) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*col);
        }
        qb.push(") VALUES (");
        for (i, (_, sql_type, value)) in columns.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            Self::push_cast(&mut qb, value, sql_type);
        }
        qb.push(") RETURNING row_to_json(")
            .push(E::TABLE)
            .push(".*) AS record");

        let row = self.bounded(qb.build().fetch_one(&self.pool)).await?;
        let record: JsonValue = row.try_get("record").map_err(Self::db_error)?;
        Self::decode(record)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        let columns = Self::columns_of(&patch)?;
        if columns.is_empty() {
            return self.fetch_one(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE ");
        qb.push(E::TABLE).push(" SET ");
        for (i, (col, sql_type, value)) in columns.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(col).push(" = ");
            Self::push_cast(&mut qb, value, sql_type);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push("::int8 RETURNING row_to_json(")
            .push(E::TABLE)
            .push(".*) AS record");

        let row = self
            .bounded(qb.build().fetch_optional(&self.pool))
            .await?
            .ok_or_else(|| StoreError::not_found::<E>(id))?;
        let record: JsonValue = row.try_get("record").map_err(Self::db_error)?;
        Self::decode(record)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1::int8", E::TABLE);
        let result = self
            .bounded(sqlx::query(&sql).bind(id).execute(&self.pool))
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found::<E>(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }
}
