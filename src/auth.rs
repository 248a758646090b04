use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError, models::User};

/// Name of the client-held session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Claims
///
/// Payload of the signed session token. The token carries the full user
/// summary so authenticated requests need no server-side session store;
/// signature validation per request is the only check.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's document id.
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Issued At.
    pub iat: usize,
    /// Expiration Time. Tokens are valid for seven days.
    pub exp: usize,
}

/// Signs a session token for a successfully authenticated user.
pub fn issue_session_token(user: &User, secret: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(7)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Validates a session token's signature and expiry, returning its claims.
pub fn decode_session_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

/// Extracts the client-held session token from a request: the `token` cookie
/// first, then an `Authorization: Bearer` header. Presence only; no
/// validation happens here. This is what the route perimeter checks.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some(value) = pair.trim().strip_prefix("token=") {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// Hashes a plaintext password with a fresh random salt (argon2 defaults).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Compares a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Session
///
/// The resolved identity of an authenticated request: the decoded user
/// summary carried by the session token. Usable as a handler argument via
/// `FromRequestParts`; rejection is a 401 with the generic credentials
/// message.
///
/// This is the second, role-aware layer of the gate. The perimeter
/// middleware in `lib.rs` only checks token presence; this extractor
/// validates the signature, and handlers then call [`Session::require_admin`]
/// where the admin role is mandatory.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Session {
    /// Page-level role check: a valid session without the admin role passes
    /// the perimeter but is rejected here.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == "admin" {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = session_token(&parts.headers).ok_or(ApiError::InvalidCredentials)?;
        let claims = decode_session_token(&token, &config.jwt_secret)
            .ok_or(ApiError::InvalidCredentials)?;

        Ok(Session {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }
}
