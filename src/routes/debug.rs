use crate::auth::extractor::AuthUser;

pub async fn with_token(auth: AuthUser) -> &'static str {
    tracing::debug!(
        "Token check passed / {} {}",
        auth.uid,
        auth.email.as_deref().unwrap_or("-")
    );
    "Hello from notifier with a verified auth token!"
}
