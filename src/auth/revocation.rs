use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;

use crate::db;

/// Per-subject token revocation times, consulted when a token is verified
/// with the revocation check enabled.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoked_before(&self, subject: &str) -> Result<Option<DateTime<Utc>>, String>;
    async fn revoke(&self, subject: &str, at: DateTime<Utc>) -> Result<(), String>;
}

pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoked_before(&self, subject: &str) -> Result<Option<DateTime<Utc>>, String> {
        db::revocations::find_by_subject(&self.pool, subject)
            .await
            .map(|r| r.map(|r| r.revoked_before))
            .map_err(|e| format!("Revocation lookup failed: {e}"))
    }

    async fn revoke(&self, subject: &str, at: DateTime<Utc>) -> Result<(), String> {
        db::revocations::revoke(&self.pool, subject, at)
            .await
            .map_err(|e| format!("Revocation write failed: {e}"))
    }
}

#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoked_before(&self, subject: &str) -> Result<Option<DateTime<Utc>>, String> {
        Ok(self.entries.get(subject).map(|at| *at))
    }

    async fn revoke(&self, subject: &str, at: DateTime<Utc>) -> Result<(), String> {
        self.entries.insert(subject.to_string(), at);
        Ok(())
    }
}
