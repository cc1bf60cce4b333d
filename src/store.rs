use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::Endpoint;
use crate::validation::EndpointRequest;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Owner-scoped persistence for endpoints. Update and delete match on
/// `(id, owner)` in a single step and return `None` when nothing matched,
/// whether the endpoint is missing or belongs to someone else.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    async fn create(
        &self,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError>;

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Endpoint>, StoreError>;

    async fn update_by_owner(
        &self,
        id: Uuid,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Endpoint>, StoreError>;

    async fn delete_by_owner(&self, id: Uuid, owner: &str) -> Result<Option<Endpoint>, StoreError>;
}

pub struct PgEndpointStore {
    pool: PgPool,
}

impl PgEndpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointStore for PgEndpointStore {
    async fn create(
        &self,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let endpoint = db::endpoints::create(&self.pool, Uuid::now_v7(), owner, req, now).await?;
        Ok(endpoint.id)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Endpoint>, StoreError> {
        Ok(db::endpoints::list_by_owner(&self.pool, owner).await?)
    }

    async fn update_by_owner(
        &self,
        id: Uuid,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Endpoint>, StoreError> {
        Ok(db::endpoints::update_by_owner(&self.pool, id, owner, req, now).await?)
    }

    async fn delete_by_owner(&self, id: Uuid, owner: &str) -> Result<Option<Endpoint>, StoreError> {
        Ok(db::endpoints::delete_by_owner(&self.pool, id, owner).await?)
    }
}

/// Process-local store. Used by the test harness and for running without a
/// database.
#[derive(Default)]
pub struct MemoryEndpointStore {
    entries: DashMap<Uuid, Endpoint>,
}

impl MemoryEndpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EndpointStore for MemoryEndpointStore {
    async fn create(
        &self,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        self.entries.insert(
            id,
            Endpoint {
                id,
                owner: owner.to_string(),
                usernames: req.usernames.clone(),
                label: req.label.clone(),
                dest: req.destination.kind().to_string(),
                dest_details: req.destination.details(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Endpoint>, StoreError> {
        let mut endpoints: Vec<Endpoint> = self
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .map(|e| e.value().clone())
            .collect();
        endpoints.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(endpoints)
    }

    async fn update_by_owner(
        &self,
        id: Uuid,
        owner: &str,
        req: &EndpointRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Endpoint>, StoreError> {
        let Some(mut entry) = self.entries.get_mut(&id) else {
            return Ok(None);
        };
        if entry.owner != owner {
            return Ok(None);
        }

        entry.usernames = req.usernames.clone();
        entry.label = req.label.clone();
        entry.dest = req.destination.kind().to_string();
        entry.dest_details = req.destination.details();
        entry.updated_at = now;
        Ok(Some(entry.clone()))
    }

    async fn delete_by_owner(&self, id: Uuid, owner: &str) -> Result<Option<Endpoint>, StoreError> {
        Ok(self
            .entries
            .remove_if(&id, |_, e| e.owner == owner)
            .map(|(_, endpoint)| endpoint))
    }
}
