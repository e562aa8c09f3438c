//! Admin authentication: argon2 password hashes, HS256 bearer tokens and the
//! extractors guarding admin routes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::admin_user::{self, AdminRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Access denied")]
    Forbidden,
    #[error("Account awaiting approval")]
    NotApproved,
    #[error("{0}")]
    WeakPassword(String),
    #[error("Failed to hash password")]
    PasswordHash,
    #[error("Password task failed: {0}")]
    PasswordTask(#[from] JoinError),
    #[error("Failed to issue token: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
}

/// Token claims. `role` stays a plain string so that tokens carrying an
/// unknown role decode and are refused with 403 rather than 401.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn admin_role(&self) -> Option<AdminRole> {
        AdminRole::parse(&self.role)
    }
}

/// Signing settings for admin tokens.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    ttl: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, admin: &admin_user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id,
            email: admin.email.clone(),
            role: admin.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// [`hash_password`] on the blocking pool; argon2 is CPU bound.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), AuthError> {
    spawn_blocking(move || verify_password(&password, &hash)).await?
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Any signed-in admin, whatever its role.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub id: i32,
    pub email: String,
    pub role: AdminRole,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.config.jwt.verify(token)?;
        let Some(role) = claims.admin_role() else {
            warn!("Token for {} carries unknown role '{}'", claims.email, claims.role);
            return Err(AuthError::Forbidden.into());
        };
        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

/// An admin holding the `super_admin` role.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AuthenticatedAdmin);

#[axum::async_trait]
impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let admin = AuthenticatedAdmin::from_request_parts(parts, state).await?;
        if !admin.role.is_super_admin() {
            warn!("Admin {} denied super admin action", admin.email);
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(admin))
    }
}
