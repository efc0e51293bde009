pub mod policy;
pub mod provider;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use policy::{authorize, is_gated, AuthDecision};
pub use provider::{
    AuthError, AuthErrorKind, AuthProvider, CredentialsProvider, SignInError, SignedIn,
    CREDENTIALS_PROVIDER,
};

/// The signed-in user, decoded per request from the session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Signs and verifies session tokens (HS256)
#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
    expiry_hours: u64,
}

impl SessionCodec {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    /// Session lifetime, for the cookie's Max-Age
    pub fn max_age_secs(&self) -> u64 {
        self.expiry_hours * 3600
    }

    pub fn issue(&self, session: &Session) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let now = Utc::now();
        let hours = i64::try_from(self.expiry_hours).unwrap_or(i64::MAX / 3600);
        let claims = Claims {
            sub: session.user_id,
            name: session.name.clone(),
            email: session.email.clone(),
            exp: (now + Duration::hours(hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Session, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}
