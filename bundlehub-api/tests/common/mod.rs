/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup and per-test cleanup
/// - In-memory object storage
/// - Test user, app, and API key creation
/// - Request helpers
///
/// Integration tests need a PostgreSQL instance; they skip themselves when
/// DATABASE_URL is not set so the unit suite stays runnable anywhere.

use axum::body::Body;
use axum::http::Request;
use bundlehub_api::app::{build_router, AppState};
use bundlehub_api::config::{ApiConfig, Config, DatabaseConfig, StorageConfig};
use bundlehub_shared::db::migrations::run_migrations;
use bundlehub_shared::models::api_key::{ApiKey, CreateApiKey};
use bundlehub_shared::models::app::{App, CreateApp};
use bundlehub_shared::storage::error::StorageResult;
use bundlehub_shared::storage::{MemoryBackend, ObjectStore, StorageError};
use bytes::Bytes;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub storage: Arc<MemoryBackend>,
    pub app_router: axum::Router,
    pub user_id: Uuid,
    pub app_id: String,
    pub api_key: String,
}

/// Placeholder config for tests; the handlers only read state.db/state.storage
pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        storage: StorageConfig {
            root: String::new(),
        },
    }
}

impl TestContext {
    /// Creates a new test context, or `None` when DATABASE_URL is unset
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let db = PgPool::connect(&database_url).await?;
        run_migrations(&db).await?;

        let user_id = Uuid::new_v4();
        let app_id = format!("com.test.{}", Uuid::new_v4().simple());

        App::create(
            &db,
            CreateApp {
                app_id: app_id.clone(),
                user_id,
                name: "Test App".to_string(),
                icon_url: None,
            },
        )
        .await?;

        let (_, api_key) = ApiKey::create(
            &db,
            CreateApiKey {
                user_id,
                name: "test key".to_string(),
                scopes: vec!["upload".to_string()],
                expires_at: None,
            },
        )
        .await?;

        let storage = Arc::new(MemoryBackend::new());
        let state = AppState::new(db.clone(), storage.clone(), test_config(&database_url));
        let app_router = build_router(state);

        Ok(Some(TestContext {
            db,
            storage,
            app_router,
            user_id,
            app_id,
            api_key,
        }))
    }

    /// Builds a router over this context's database but a different storage
    /// backend (e.g. one that fails writes)
    pub fn router_with_storage(&self, storage: Arc<dyn ObjectStore>) -> axum::Router {
        let state = AppState::new(self.db.clone(), storage, test_config(""));
        build_router(state)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM channels WHERE app_id = $1")
            .bind(&self.app_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM app_versions WHERE app_id = $1")
            .bind(&self.app_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM apps WHERE app_id = $1")
            .bind(&self.app_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM api_keys WHERE user_id = $1")
            .bind(self.user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Posts an upload request and returns (status, parsed body)
pub async fn post_upload(
    router: &axum::Router,
    api_key: Option<&str>,
    body: serde_json::Value,
) -> (axum::http::StatusCode, serde_json::Value) {
    post_upload_raw(router, api_key, body.to_string()).await
}

/// Posts an upload request with a raw (possibly empty or non-JSON) body
pub async fn post_upload_raw(
    router: &axum::Router,
    api_key: Option<&str>,
    body: String,
) -> (axum::http::StatusCode, serde_json::Value) {
    use tower::ServiceExt as _;

    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("apikey", key);
    }
    let request = builder.body(Body::from(body)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// Storage backend whose writes always fail, for exercising the
/// storage-error path of the upload handler.
#[derive(Default)]
pub struct FailingBackend;

#[async_trait::async_trait]
impl ObjectStore for FailingBackend {
    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn put_if_not_exists(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
        Ok(vec![])
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
