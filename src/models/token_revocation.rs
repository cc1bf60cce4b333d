use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens for `subject` issued before `revoked_before` are no longer honoured.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TokenRevocation {
    pub subject: String,
    pub revoked_before: DateTime<Utc>,
}
