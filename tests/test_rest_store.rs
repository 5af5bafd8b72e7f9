//! REST table store against an in-process mock of the hosted table service.
//!
//! The mock implements just enough of the PostgREST dialect: `select`/`order`/`limit`,
//! `id=eq.N` filters, `Prefer: return=representation`, serial ids and a unique name
//! constraint answered with 409.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use catalog_admin::domain::model::{CategoryDraft, CategoryPatch, ProductDraft, ProductPatch};
use catalog_admin::{Category, EntityStore, Product, RestTableStore, StoreError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const API_KEY: &str = "test-anon-key";

#[derive(Clone, Default)]
struct MockTables {
    tables: Arc<Mutex<HashMap<String, Vec<Map<String, Value>>>>>,
    slow: Arc<Mutex<bool>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let key = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    let expected_bearer = format!("Bearer {}", API_KEY);
    key == Some(API_KEY) && bearer == Some(expected_bearer.as_str())
}

fn id_filter(query: &HashMap<String, String>) -> Option<i64> {
    query.get("id")?.strip_prefix("eq.")?.parse().ok()
}

async fn select_rows(
    State(mock): State<MockTables>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if *mock.slow.lock().await {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    let tables = mock.tables.lock().await;
    let mut rows: Vec<Map<String, Value>> = tables.get(&table).cloned().unwrap_or_default();
    if let Some(id) = id_filter(&query) {
        rows.retain(|r| r["id"] == id);
    }
    if let Some(limit) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }
    Json(rows).into_response()
}

async fn insert_row(
    State(mock): State<MockTables>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(mut row): Json<Map<String, Value>>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut tables = mock.tables.lock().await;
    let rows = tables.entry(table).or_default();
    if rows.iter().any(|r| r["name"] == row["name"]) {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "code": "23505", "message": "duplicate key value" })),
        )
            .into_response();
    }
    let next = rows.iter().filter_map(|r| r["id"].as_i64()).max().unwrap_or(0) + 1;
    row.insert("id".to_string(), Value::from(next));
    rows.push(row.clone());
    (StatusCode::CREATED, Json(vec![row])).into_response()
}

async fn update_rows(
    State(mock): State<MockTables>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(patch): Json<Map<String, Value>>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(id) = id_filter(&query) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut tables = mock.tables.lock().await;
    let rows = tables.entry(table).or_default();
    let mut changed = Vec::new();
    for row in rows.iter_mut().filter(|r| r["id"] == id) {
        for (k, v) in &patch {
            row.insert(k.clone(), v.clone());
        }
        changed.push(row.clone());
    }
    Json(changed).into_response()
}

async fn delete_rows(
    State(mock): State<MockTables>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(id) = id_filter(&query) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut tables = mock.tables.lock().await;
    let rows = tables.entry(table).or_default();
    let (removed, kept): (Vec<_>, Vec<_>) = rows.drain(..).partition(|r| r["id"] == id);
    *rows = kept;
    Json(removed).into_response()
}

async fn start_mock() -> Result<(String, MockTables), Box<dyn std::error::Error>> {
    let mock = MockTables::default();
    let router = Router::new()
        .route(
            "/rest/v1/:table",
            get(select_rows)
                .post(insert_row)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok((format!("http://127.0.0.1:{}/rest/v1/", port), mock))
}

fn store<E: catalog_admin::Entity>(base_url: &str, timeout: Duration) -> RestTableStore<E> {
    RestTableStore::new(reqwest::Client::new(), base_url, API_KEY, timeout)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn category_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _mock) = start_mock().await?;
    let categories = store::<Category>(&base_url, Duration::from_secs(5));

    assert!(categories.list().await?.is_empty());
    categories.ping().await?;

    let a = categories.create(CategoryDraft { name: "A".into() }).await?;
    let b = categories.create(CategoryDraft { name: "B".into() }).await?;
    assert_eq!((a.id, b.id), (1, 2));

    let renamed = categories
        .update(2, CategoryPatch { name: "Bee".into() })
        .await?;
    assert_eq!(renamed, Category { id: 2, name: "Bee".into() });

    categories.delete(1).await?;
    assert_eq!(categories.list().await?, vec![renamed]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_results_map_to_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _mock) = start_mock().await?;
    let categories = store::<Category>(&base_url, Duration::from_secs(5));

    let err = categories
        .update(99, CategoryPatch { name: "X".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 99, .. }));

    let err = categories.delete(99).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 99, .. }));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remote_unique_constraint_is_a_duplicate() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _mock) = start_mock().await?;
    let categories = store::<Category>(&base_url, Duration::from_secs(5));

    categories.create(CategoryDraft { name: "A".into() }).await?;
    let err = categories
        .create(CategoryDraft { name: "A".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn product_patch_sends_only_supplied_fields() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _mock) = start_mock().await?;
    let products = store::<Product>(&base_url, Duration::from_secs(5));

    products
        .create(ProductDraft {
            name: "Lamp".into(),
            categoryid: 3,
            price: 10.0,
        })
        .await?;

    let updated = products
        .update(
            1,
            ProductPatch {
                price: Some(7.5),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.categoryid, 3);
    assert_eq!(updated.price, 7.5);

    // No fields: the row is read back unchanged.
    let unchanged = products.update(1, ProductPatch::default()).await?;
    assert_eq!(unchanged, updated);
    let err = products.update(2, ProductPatch::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 2, .. }));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_backend_reports_timeout() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, mock) = start_mock().await?;
    *mock.slow.lock().await = true;
    let categories = store::<Category>(&base_url, Duration::from_millis(300));

    let err = categories.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout(_)), "got {:?}", err);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_api_key_is_a_backend_failure() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, _mock) = start_mock().await?;
    let categories: RestTableStore<Category> = RestTableStore::new(
        reqwest::Client::new(),
        base_url,
        "wrong-key",
        Duration::from_secs(5),
    );

    let err = categories.ping().await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    assert!(err.to_string().contains("401"));
    Ok(())
}
