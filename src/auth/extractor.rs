use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::verifier::Principal;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl From<Principal> for AuthUser {
    fn from(principal: Principal) -> Self {
        Self {
            uid: principal.uid,
            email: principal.email,
        }
    }
}

/// Split an `Authorization` value into its token, requiring the `Bearer`
/// scheme (case-insensitive) and a non-empty token.
pub fn bearer_token(header: &str) -> Result<&str, AppError> {
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AppError::Unauthorized("Invalid type".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing authentication token".to_string()));
    }
    Ok(token)
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth_str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = bearer_token(auth_str)?;

        let principal = tokio::time::timeout(
            state.config.verify_timeout,
            state.verifier.verify(token, true),
        )
        .await
        .map_err(|_| AppError::Timeout("token verification".to_string()))?
        .map_err(|e| {
            tracing::debug!("Authentication failed: {e}");
            AppError::invalid_token()
        })?;

        tracing::Span::current().record("owner", principal.uid.as_str());

        Ok(principal.into())
    }
}
