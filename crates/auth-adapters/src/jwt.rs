//! HS256 JWT implementation of `TokenService`.
//!
//! Claims carry `{id, email, role, name}` plus `iat`/`exp`. Verification has
//! zero leeway; any decoding failure is reported as `InvalidToken`.

use chrono::{Duration, Utc};
use domains::{DomainError, DomainResult, Identity, Role, TokenService};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: i64,
    email: String,
    role: Role,
    name: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &Identity) -> DomainResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            name: identity.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "token signing failed");
            DomainError::internal("token signing failed")
        })
    }

    fn verify(&self, token: &str) -> DomainResult<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(reason = ?other, "rejected token"),
            }
            DomainError::InvalidToken
        })?;
        let claims = data.claims;
        Ok(Identity {
            id: claims.id,
            email: claims.email,
            role: claims.role,
            name: claims.name,
        })
    }
}
