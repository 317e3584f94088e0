//! Authentication Middleware
//!
//! JWT validation middleware for the chat routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Authenticated user ID
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Authenticated user extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))
    }
}

/// Verify a bearer token against the configured secret, issuer and audience.
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<AuthUser, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.set_audience(&[settings.audience.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    Ok(AuthUser {
        user_id: token_data.claims.user_id,
    })
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|e| {
        if e.is_missing() {
            AppError::Unauthorized("Missing authorization header".into())
        } else {
            AppError::Unauthorized("Invalid authorization header format".into())
        }
    })?;

    let user = verify_token(bearer.token(), &state.settings.jwt)?;

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(user);

    // Continue to the next handler
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-at-least-32-chars!";

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.into(),
            issuer: "http://localhost:8080/".into(),
            audience: "http://localhost:8080/".into(),
        }
    }

    fn token(user_id: i64, exp_offset: i64, audience: &str) -> String {
        let claims = Claims {
            user_id,
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iss: "http://localhost:8080/".into(),
            aud: audience.into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user = verify_token(&token(7, 3600, "http://localhost:8080/"), &jwt_settings()).unwrap();
        assert_eq!(user, AuthUser { user_id: 7 });
    }

    #[test]
    fn test_expired_token() {
        let err = verify_token(&token(7, -3600, "http://localhost:8080/"), &jwt_settings())
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn test_wrong_audience() {
        let err = verify_token(&token(7, 3600, "someone-else"), &jwt_settings()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(verify_token("not-a-jwt", &jwt_settings()).is_err());
    }
}
