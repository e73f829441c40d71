use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use crate::routes::AppState;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Bearer-token auth over an in-memory credential store.
///
/// Tokens are HS256 JWTs carrying the username as subject. The user store is
/// process-local and non-durable; accounts live until restart.
pub struct AuthService {
    secret: String,
    expiry_minutes: i64,
    users: RwLock<HashMap<String, String>>,
}

impl AuthService {
    pub fn new(secret: String, expiry_minutes: i64) -> Self {
        Self {
            secret,
            expiry_minutes,
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let mut users = self.users.write().expect("user store poisoned");
        if users.contains_key(username) {
            return Err(AuthError::UserExists);
        }
        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        users.insert(username.to_string(), hashed);
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let hashed = {
            let users = self.users.read().expect("user store poisoned");
            users
                .get(username)
                .cloned()
                .ok_or(AuthError::InvalidCredentials)?
        };
        if !bcrypt::verify(password, &hashed)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.create_token(username)
    }

    pub fn create_token(&self, username: &str) -> Result<String, AuthError> {
        let expires_at = chrono::Utc::now() + chrono::Duration::minutes(self.expiry_minutes);
        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Validate a bearer token and return the username it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims.sub)
    }
}

/// Authenticated principal extracted from the `Authorization: Bearer` header.
pub struct AuthUser(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        match state.auth.verify_token(token) {
            Ok(username) => Ok(AuthUser(username)),
            Err(_) => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-secret".to_string(), 30)
    }

    #[test]
    fn test_register_then_login_yields_valid_token() {
        let auth = service();
        auth.register("alice", "hunter2").unwrap();

        let token = auth.login("alice", "hunter2").unwrap();
        assert_eq!(auth.verify_token(&token).unwrap(), "alice");
    }

    #[test]
    fn test_duplicate_register_is_rejected() {
        let auth = service();
        auth.register("alice", "hunter2").unwrap();

        let err = auth.register("alice", "other").unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let auth = service();
        auth.register("alice", "hunter2").unwrap();

        let err = auth.login("alice", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        let auth = service();
        let err = auth.login("nobody", "hunter2").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let auth = service();
        let err = auth.verify_token("not.a.token").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let auth = service();
        let other = AuthService::new("different-secret".to_string(), 30);
        let token = other.create_token("alice").unwrap();

        let err = auth.verify_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
