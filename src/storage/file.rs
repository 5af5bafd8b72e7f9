//! Flat-file JSON store: one pretty-printed array per collection.
//!
//! Every call reads the whole document. Mutations hold a per-collection write lock for
//! the full read-modify-write cycle and replace the file atomically (temp file + rename),
//! so readers never observe a half-written document and in-process writers never lose
//! each other's updates.

use crate::domain::model::Entity;
use crate::domain::validate::{ensure_unique_name, next_id};
use crate::storage::{EntityStore, StoreError};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct JsonFileStore<E> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> JsonFileStore<E> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty collection if the document does not exist yet.
    /// Returns true when a file was created.
    pub async fn init_if_missing(&self) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("failed to stat {}", self.path.display()))?
        {
            return Ok(false);
        }
        self.write_all(&[]).await?;
        Ok(true)
    }

    /// A missing file is an empty collection; an unreadable or corrupt one is an error.
    async fn read_all(&self) -> Result<Vec<E>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read {}", self.path.display()))
                    .into())
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items = serde_json::from_str(&content)
            .with_context(|| format!("corrupt collection file {}", self.path.display()))?;
        Ok(items)
    }

    async fn write_all(&self, items: &[E]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(items)
            .with_context(|| format!("failed to serialize {}", E::TABLE))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for JsonFileStore<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        self.read_all().await
    }

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;

        ensure_unique_name(&items, E::draft_name(&draft))?;
        let id = next_id(&items)
            .ok_or_else(|| anyhow!("{} ids exhausted in {}", E::LABEL, self.path.display()))?;
        let record = E::from_draft(id, draft);

        items.push(record.clone());
        self.write_all(&items).await?;
        Ok(record)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;

        let record = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| StoreError::not_found::<E>(id))?;
        if E::patch_is_empty(&patch) {
            return Ok(record.clone());
        }
        record.apply(patch);
        let updated = record.clone();

        self.write_all(&items).await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;

        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(StoreError::not_found::<E>(id));
        }

        self.write_all(&items).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read_all().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Category, CategoryDraft, CategoryPatch, Product, ProductDraft, ProductPatch,
    };
    use std::sync::Arc;

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
        }
    }

    fn category_store(dir: &tempfile::TempDir) -> JsonFileStore<Category> {
        JsonFileStore::new(dir.path().join("categories.json"))
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn init_writes_an_empty_document_once() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Category> =
            JsonFileStore::new(dir.path().join("nested").join("categories.json"));
        assert!(store.init_if_missing().await.unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");

        store.create(draft("A")).await.unwrap();
        assert!(!store.init_if_missing().await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(matches!(
            store.create(draft("A")).await.unwrap_err(),
            StoreError::Backend(_)
        ));
        // The corrupt document is left alone.
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn create_assigns_max_plus_one_and_persists_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);

        let widget = store.create(draft("Widget")).await.unwrap();
        assert_eq!(widget, Category { id: 1, name: "Widget".into() });

        std::fs::write(
            store.path(),
            r#"[{"id": 1, "name": "A"}, {"id": 7, "name": "B"}, {"id": 3, "name": "C"}]"#,
        )
        .unwrap();
        let next = store.create(draft("D")).await.unwrap();
        assert_eq!(next.id, 8);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  {"));
        assert_eq!(store.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn duplicate_create_leaves_collection_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        store.create(draft("Books")).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = store.create(draft("BOOKS")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn create_fails_cleanly_when_ids_are_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        let seeded = r#"[{"id":9223372036854775807,"name":"A"}]"#;
        std::fs::write(store.path(), seeded).unwrap();

        let err = store.create(draft("B")).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(err.to_string().contains("ids exhausted"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), seeded);
    }

    #[tokio::test]
    async fn product_names_are_unique_within_products_only() {
        let dir = tempfile::tempdir().unwrap();
        let categories = category_store(&dir);
        let products: JsonFileStore<Product> =
            JsonFileStore::new(dir.path().join("products.json"));
        let lamp = |name: &str| ProductDraft {
            name: name.to_string(),
            categoryid: 1,
            price: 5.0,
        };

        products.create(lamp("Lamp")).await.unwrap();
        let err = products.create(lamp(" LAMP ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(products.list().await.unwrap().len(), 1);

        // A category may share a product's name.
        categories.create(draft("Lamp")).await.unwrap();
        assert_eq!(products.create(lamp("Desk")).await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        store.create(draft("A")).await.unwrap();
        let before = store.list().await.unwrap();

        let err = store
            .update(99, CategoryPatch { name: "X".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 99, .. }));
        let err = store.delete(99).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 99, .. }));

        assert_eq!(store.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = category_store(&dir);
        for name in ["A", "B", "C"] {
            store.create(draft(name)).await.unwrap();
        }

        store.delete(2).await.unwrap();
        assert_eq!(
            store.list().await.unwrap(),
            vec![
                Category { id: 1, name: "A".into() },
                Category { id: 3, name: "C".into() },
            ]
        );
    }

    #[tokio::test]
    async fn partial_product_update_keeps_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Product> = JsonFileStore::new(dir.path().join("products.json"));
        store
            .create(ProductDraft {
                name: "Lamp".into(),
                categoryid: 4,
                price: 10.0,
            })
            .await
            .unwrap();

        let updated = store
            .update(
                1,
                ProductPatch {
                    price: Some(12.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Lamp");
        assert_eq!(updated.categoryid, 4);
        assert_eq!(updated.price, 12.5);
        assert_eq!(store.list().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(category_store(&dir));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(&format!("cat-{}", i))).await
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<i64>>());
        assert_eq!(store.list().await.unwrap().len(), 16);
    }
}
