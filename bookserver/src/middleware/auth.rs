//! Session authentication.
//!
//! [`identity_middleware`] turns a signed session token into an [`Identity`]
//! stored in the request extensions. It never rejects a request on its own:
//! handlers that need a caller take the [`CurrentUser`] extractor, which
//! answers `401` when no identity was attached.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{User, UserStore};
use crate::error::ServerError;
use crate::state::AppState;

/// Name of the cookie browsers carry the session token in.
pub const SESSION_COOKIE: &str = "access_token";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    /// Course the user currently has open.
    pub course_name: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity {
            user_id: user.id,
            username: user.username,
            course_name: user.course_name,
        }
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username of the session owner.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys(..)")
    }
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for `username` valid for `ttl`.
    pub fn issue_token(&self, username: &str, ttl: Duration) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: username.to_owned(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ServerError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

/// Session token from `Authorization: Bearer …`, else the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|t| !t.is_empty())
}

/// Attach an [`Identity`] for requests carrying a valid session token.
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = token_from_headers(req.headers()) {
        match state.keys.verify(&token) {
            Ok(claims) => match state.store.get_user_by_username(&claims.sub).await {
                Ok(Some(user)) => {
                    req.extensions_mut().insert(Identity::from(user));
                }
                Ok(None) => debug!(username = %claims.sub, "session token names unknown user"),
                Err(e) => return ServerError::from(e).into_response(),
            },
            Err(e) => debug!(error = %e, "ignoring invalid session token"),
        }
    }
    next.run(req).await
}

/// Extractor for the authenticated caller; rejects with `401` when absent.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ServerError::Unauthorized)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
