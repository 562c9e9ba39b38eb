mod firebase;
mod secret;

pub use firebase::FirebaseVerifier;
pub use secret::SharedSecretVerifier;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Stable identifier of a verified user; names the user's note namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Malformed Authorization header")]
    MalformedHeader,

    #[error("Authorization header must use the Bearer scheme")]
    InvalidScheme,

    #[error("Empty bearer token")]
    EmptyToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Claims shared by the supported token formats.
#[derive(Debug, Deserialize)]
struct SubjectClaims {
    sub: String,
}

impl SubjectClaims {
    fn into_user_id(self) -> Result<UserId, AuthError> {
        if self.sub.is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }
        Ok(UserId::new(self.sub))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidScheme)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    Ok(token)
}

/// Extractor that gates a handler on a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<dyn IdentityVerifier>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let result = match bearer_token(&parts.headers) {
            Ok(token) => Arc::<dyn IdentityVerifier>::from_ref(state).verify(token).await,
            Err(e) => Err(e),
        };

        result.map(Self).inspect_err(|e| {
            tracing::warn!("rejected {} {}: {}", parts.method, parts.uri.path(), e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(bearer_token(&headers("Bearer   tok  ")), Ok("tok"));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingHeader));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        );
        assert_eq!(bearer_token(&headers("bearer tok")), Err(AuthError::InvalidScheme));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(bearer_token(&headers("Bearer    ")), Err(AuthError::EmptyToken));
    }

    #[test]
    fn invalid_token_message_embeds_cause() {
        let err = AuthError::InvalidToken("ExpiredSignature".to_string());
        assert_eq!(err.to_string(), "Invalid token: ExpiredSignature");
    }
}
