//! Bearer tokens (HS256 JWT) and reset-token hashing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::contract::model::Role;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    /// Issue time in milliseconds; `iat` alone cannot order a token against
    /// a password change in the same second.
    #[serde(rename = "iatMs")]
    pub iat_ms: i64,
    pub exp: i64,
}

/// Authenticated caller. The role is read from storage on every request,
/// not trusted from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Acting on `owner`'s data: the owner themself or an admin.
    pub fn can_manage(&self, owner: Uuid) -> bool {
        self.id == owner || self.is_admin()
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role, now: DateTime<Utc>) -> Result<String, DomainError> {
        let claims = Claims {
            sub: user_id,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::unauthenticated(format!("invalid token: {e}")))
    }
}

/// True when the password changed after the token was issued.
pub fn issued_before_password_change(claims: &Claims, changed_at: Option<DateTime<Utc>>) -> bool {
    changed_at.is_some_and(|at| at.timestamp_millis() > claims.iat_ms)
}

/// 32 random bytes, hex encoded. Only the SHA-256 of it is stored.
pub fn new_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
