//! Bearer-token access control.
//!
//! `POST /login` trades the configured credentials for an HS256 token;
//! [`require_bearer`] guards every other entity route.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// Token payload.  Inserted into request extensions once verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing keys, token lifetime and the single accepted login.
#[derive(Clone)]
pub struct AuthConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
    username: String,
    password: String,
}

impl AuthConfig {
    pub fn new(secret: &str, token_ttl: Duration, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }

    /// Sign a token for `username`, valid for the configured TTL.
    pub fn issue(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_owned(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

/// Middleware: reject requests without a valid `Authorization: Bearer` token.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthorized("authorization header required"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized("invalid token"))?;

    let claims = state.auth.verify(token).map_err(|e| {
        tracing::debug!("token rejected: {e}");
        ApiError::Unauthorized("invalid token")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
