//! Remote table store speaking the PostgREST dialect used by the hosted table service.
//!
//! Each operation is exactly one HTTP call against `{base_url}/{table}`. Update and delete
//! filter on `id=eq.{id}` and ask for the affected rows back, so an empty result means the
//! id does not exist. Name uniqueness is left to the remote table's own constraints.

use crate::domain::model::Entity;
use crate::storage::{EntityStore, StoreError};
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::marker::PhantomData;
use std::time::Duration;

pub struct RestTableStore<E> {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RestTableStore<E> {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            _entity: PhantomData,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, E::TABLE)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
    }

    fn id_filter(id: i64) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    /// Sends the request and decodes the returned rows.
    async fn rows(&self, req: RequestBuilder) -> Result<Vec<E>, StoreError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::CONFLICT {
                return Err(StoreError::Duplicate(format!(
                    "{} conflicts with an existing row: {}",
                    E::LABEL,
                    body
                )));
            }
            return Err(anyhow!("remote table '{}' returned {}: {}", E::TABLE, status, body).into());
        }

        resp.json::<Vec<E>>()
            .await
            .map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            anyhow::Error::new(e)
                .context(format!("remote table '{}' call failed", E::TABLE))
                .into()
        }
    }

    async fn fetch_one(&self, id: i64) -> Result<E, StoreError> {
        let req = self
            .client
            .get(self.table_url())
            .query(&[("select", "*")])
            .query(&Self::id_filter(id));
        self.rows(req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for RestTableStore<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let req = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "id.asc")]);
        self.rows(req).await
    }

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        let req = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&draft);
        self.rows(req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("insert into '{}' returned no row", E::TABLE).into())
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        if E::patch_is_empty(&patch) {
            return self.fetch_one(id).await;
        }
        let req = self
            .client
            .patch(self.table_url())
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.rows(req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let req = self
            .client
            .delete(self.table_url())
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation");
        if self.rows(req).await?.is_empty() {
            return Err(StoreError::not_found::<E>(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let req = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("limit", "1")]);
        self.rows(req).await.map(|_| ())
    }
}
