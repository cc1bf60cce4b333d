#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use notifier::auth::jwt::{self, Claims};
use notifier::auth::revocation::{MemoryRevocationStore, PgRevocationStore, RevocationStore};
use notifier::auth::verifier::{JwtVerifier, Principal, TokenVerifier, VerifyError};
use notifier::config::{Config, Environment, JwtConfig};
use notifier::models::Endpoint;
use notifier::store::{EndpointStore, MemoryEndpointStore, PgEndpointStore, StoreError};
use notifier::validation::EndpointRequest;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// A running test server. `pg` is set when it runs over a dedicated
/// Postgres database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub revocations: Arc<dyn RevocationStore>,
    pub pg: Option<TestDatabase>,
}

pub struct TestDatabase {
    pub pool: PgPool,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A valid token for `uid`.
    pub fn token(&self, uid: &str) -> String {
        jwt::encode_token(&Claims::new(uid), JWT_SECRET).unwrap()
    }

    /// Create an endpoint, asserting success, and return its id.
    pub async fn create_endpoint(&self, token: &str, body: &Value) -> String {
        let (resp, status) = self.post_auth("/api/endpoints", token, body).await;
        assert_eq!(status, StatusCode::OK, "create endpoint non-200: {resp}");
        resp["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            issuer: None,
            audience: None,
        },
        targets: vec!["alice".to_string(), "bob".to_string()],
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        environment: Environment::Development,
        log_level: "warn".to_string(),
        max_body_size: 1_048_576,
        verify_timeout: Duration::from_secs(5),
        store_timeout: Duration::from_millis(200),
    }
}

/// Spawn a test app with an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(MemoryEndpointStore::new())).await
}

/// Spawn a test app over the given store.
pub async fn spawn_app_with(store: Arc<dyn EndpointStore>) -> TestApp {
    spawn_app_with_revocations(store, Arc::new(MemoryRevocationStore::new())).await
}

/// Spawn a test app over the given store and revocation list.
pub async fn spawn_app_with_revocations(
    store: Arc<dyn EndpointStore>,
    revocations: Arc<dyn RevocationStore>,
) -> TestApp {
    let config = test_config();
    let verifier = JwtVerifier::new(config.jwt.clone(), revocations.clone());
    let addr = serve(config, store, Arc::new(verifier)).await;

    TestApp {
        addr,
        client: Client::new(),
        revocations,
        pg: None,
    }
}

/// Spawn a test app whose token checks go through `verifier`.
pub async fn spawn_app_with_verifier(verifier: Arc<dyn TokenVerifier>) -> TestApp {
    let mut config = test_config();
    config.verify_timeout = Duration::from_millis(200);
    let addr = serve(config, Arc::new(MemoryEndpointStore::new()), verifier).await;

    TestApp {
        addr,
        client: Client::new(),
        revocations: Arc::new(MemoryRevocationStore::new()),
        pg: None,
    }
}

/// Spawn a test app over a fresh temporary Postgres database. `None` when
/// `DATABASE_URL` is not set.
pub async fn spawn_pg_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    // Create a unique test database
    let db_name = format!("notifier_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let mut config = test_config();
    config.database_url = test_url;
    config.store_timeout = Duration::from_secs(5);

    let revocations: Arc<dyn RevocationStore> = Arc::new(PgRevocationStore::new(pool.clone()));
    let verifier = JwtVerifier::new(config.jwt.clone(), revocations.clone());
    let store = Arc::new(PgEndpointStore::new(pool.clone()));
    let addr = serve(config, store, Arc::new(verifier)).await;

    Some(TestApp {
        addr,
        client: Client::new(),
        revocations,
        pg: Some(TestDatabase { pool, db_name }),
    })
}

/// Drop the test database, if there is one.
pub async fn cleanup(app: TestApp) {
    let Some(TestDatabase { pool, db_name }) = app.pg else {
        return;
    };
    pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

async fn serve(
    config: Config,
    store: Arc<dyn EndpointStore>,
    verifier: Arc<dyn TokenVerifier>,
) -> SocketAddr {
    let app = notifier::build_app(config, store, verifier);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

/// A Discord endpoint payload targeting `usernames`.
pub fn discord_body(usernames: &[&str]) -> Value {
    json!({
        "usernames": usernames,
        "label": "Alerts",
        "dest": "discord-webhook",
        "destDetails": { "url": "https://discord.com/api/webhooks/123/abc" }
    })
}

/// A store whose every call fails, or stalls past the store timeout.
pub struct BrokenStore {
    pub stall: bool,
}

impl BrokenStore {
    async fn fail<T>(&self) -> Result<T, StoreError> {
        if self.stall {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[async_trait]
impl EndpointStore for BrokenStore {
    async fn create(
        &self,
        _owner: &str,
        _req: &EndpointRequest,
        _now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        self.fail().await
    }

    async fn list_by_owner(&self, _owner: &str) -> Result<Vec<Endpoint>, StoreError> {
        self.fail().await
    }

    async fn update_by_owner(
        &self,
        _id: Uuid,
        _owner: &str,
        _req: &EndpointRequest,
        _now: DateTime<Utc>,
    ) -> Result<Option<Endpoint>, StoreError> {
        self.fail().await
    }

    async fn delete_by_owner(
        &self,
        _id: Uuid,
        _owner: &str,
    ) -> Result<Option<Endpoint>, StoreError> {
        self.fail().await
    }
}

/// A verifier that never answers in time.
pub struct StalledVerifier;

#[async_trait]
impl TokenVerifier for StalledVerifier {
    async fn verify(&self, _token: &str, _check_revoked: bool) -> Result<Principal, VerifyError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(VerifyError::Malformed("stalled".to_string()))
    }
}

/// A revocation list whose backend is down.
pub struct UnreachableRevocations;

#[async_trait]
impl RevocationStore for UnreachableRevocations {
    async fn revoked_before(&self, _subject: &str) -> Result<Option<DateTime<Utc>>, String> {
        Err("connection refused".to_string())
    }

    async fn revoke(&self, _subject: &str, _at: DateTime<Utc>) -> Result<(), String> {
        Err("connection refused".to_string())
    }
}
