use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Endpoint;
use crate::validation::EndpointRequest;

pub async fn create(
    pool: &PgPool,
    id: Uuid,
    owner: &str,
    req: &EndpointRequest,
    now: DateTime<Utc>,
) -> Result<Endpoint, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "INSERT INTO endpoints
             (id, owner, usernames, label, dest, dest_details, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(&req.usernames)
    .bind(&req.label)
    .bind(req.destination.kind())
    .bind(req.destination.details())
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner: &str) -> Result<Vec<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "SELECT * FROM endpoints WHERE owner = $1 ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

/// Replace the mutable fields of an owned endpoint. `None` when no row
/// matches both id and owner.
pub async fn update_by_owner(
    pool: &PgPool,
    id: Uuid,
    owner: &str,
    req: &EndpointRequest,
    now: DateTime<Utc>,
) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>(
        "UPDATE endpoints
         SET usernames = $3, label = $4, dest = $5, dest_details = $6, updated_at = $7
         WHERE id = $1 AND owner = $2
         RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(&req.usernames)
    .bind(&req.label)
    .bind(req.destination.kind())
    .bind(req.destination.details())
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete_by_owner(
    pool: &PgPool,
    id: Uuid,
    owner: &str,
) -> Result<Option<Endpoint>, sqlx::Error> {
    sqlx::query_as::<_, Endpoint>("DELETE FROM endpoints WHERE id = $1 AND owner = $2 RETURNING *")
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
}
