use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::jwt;
use crate::auth::revocation::RevocationStore;
use crate::config::JwtConfig;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerifyError {
    Malformed(String),
    Revoked,
    Lookup(String),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Malformed(msg) => write!(f, "token rejected: {msg}"),
            VerifyError::Revoked => write!(f, "token has been revoked"),
            VerifyError::Lookup(msg) => write!(f, "revocation check failed: {msg}"),
        }
    }
}

/// Turns an identity token into a principal.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str, check_revoked: bool) -> Result<Principal, VerifyError>;
}

/// HS256 JWTs signed with a shared secret.
pub struct JwtVerifier {
    config: JwtConfig,
    revocations: Arc<dyn RevocationStore>,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            config,
            revocations,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str, check_revoked: bool) -> Result<Principal, VerifyError> {
        let claims = jwt::decode_token(token, &self.config).map_err(VerifyError::Malformed)?;
        if claims.sub.is_empty() {
            return Err(VerifyError::Malformed("empty subject".to_string()));
        }

        if check_revoked {
            let revoked_before = self
                .revocations
                .revoked_before(&claims.sub)
                .await
                .map_err(VerifyError::Lookup)?;
            if revoked_before.is_some_and(|at| claims.iat < at.timestamp()) {
                return Err(VerifyError::Revoked);
            }
        }

        Ok(Principal {
            uid: claims.sub,
            email: claims.email,
        })
    }
}
