use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::Claims;

/// Verifies HS256 tokens issued by the identity provider and remembers which
/// ones were signed out until they would have expired anyway.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    revoked: Arc<DashMap<String, i64>>,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            revoked: Arc::new(DashMap::new()),
        }
    }

    fn revocation_key(claims: &Claims, token: &str) -> String {
        claims.jti.clone().unwrap_or_else(|| token.to_string())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                AppError::Unauthorized
            })?
            .claims;

        if self.revoked.contains_key(&Self::revocation_key(&claims, token)) {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    /// Signs the token out. Entries are dropped once past their `exp`, since
    /// signature validation rejects the token from then on.
    pub fn revoke(&self, claims: &Claims, token: &str) {
        self.purge_expired();
        self.revoked.insert(Self::revocation_key(claims, token), claims.exp);
        info!("Signed out session for user {}", claims.sub);
    }

    pub fn purge_expired(&self) {
        let now = Utc::now().timestamp() - self.validation.leeway as i64;
        self.revoked.retain(|_, exp| *exp >= now);
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}
