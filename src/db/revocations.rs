use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::TokenRevocation;

pub async fn find_by_subject(
    pool: &PgPool,
    subject: &str,
) -> Result<Option<TokenRevocation>, sqlx::Error> {
    sqlx::query_as::<_, TokenRevocation>("SELECT * FROM token_revocations WHERE subject = $1")
        .bind(subject)
        .fetch_optional(pool)
        .await
}

/// Invalidate every token issued to `subject` before `at`.
pub async fn revoke(pool: &PgPool, subject: &str, at: DateTime<Utc>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO token_revocations (subject, revoked_before) VALUES ($1, $2)
         ON CONFLICT (subject) DO UPDATE SET revoked_before = EXCLUDED.revoked_before",
    )
    .bind(subject)
    .bind(at)
    .execute(pool)
    .await?;
    Ok(())
}
