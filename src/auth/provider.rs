use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::{JwtError, Session, SessionCodec};
use crate::database::{DatabaseError, InvoiceStore};
use crate::validation::RawForm;

/// Identifier of the email/password provider
pub const CREDENTIALS_PROVIDER: &str = "credentials";

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The submitted credentials did not identify a user
    CredentialsSignin,
    UnsupportedProvider,
    /// The server cannot sign anyone in (secret missing, corrupt hash)
    Configuration,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialsSignin => "CredentialsSignin",
            AuthErrorKind::UnsupportedProvider => "UnsupportedProvider",
            AuthErrorKind::Configuration => "Configuration",
        }
    }
}

#[derive(Debug, Error)]
#[error("{}: {}", .kind.as_str(), .detail)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub detail: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    fn credentials(detail: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::CredentialsSignin, detail)
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        Self::new(AuthErrorKind::Configuration, err.to_string())
    }
}

/// Sign-in failures: typed authentication errors, or anything else that
/// went wrong on the way (those are not the user's fault)
#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: Session,
    pub token: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, provider: &str, form: &RawForm) -> Result<SignedIn, SignInError>;
}

/// Email + password against the `users` table, bcrypt hashes
pub struct CredentialsProvider {
    store: Arc<dyn InvoiceStore>,
    codec: SessionCodec,
}

impl CredentialsProvider {
    pub fn new(store: Arc<dyn InvoiceStore>, codec: SessionCodec) -> Self {
        Self { store, codec }
    }

    fn parse_credentials(form: &RawForm) -> Option<(&str, &str)> {
        let email = form.get("email").map(String::as_str).filter(|e| looks_like_email(e))?;
        let password = form
            .get("password")
            .map(String::as_str)
            .filter(|p| p.chars().count() >= MIN_PASSWORD_CHARS)?;
        Some((email, password))
    }
}

#[async_trait]
impl AuthProvider for CredentialsProvider {
    async fn sign_in(&self, provider: &str, form: &RawForm) -> Result<SignedIn, SignInError> {
        if provider != CREDENTIALS_PROVIDER {
            return Err(AuthError::new(
                AuthErrorKind::UnsupportedProvider,
                format!("provider '{}' is not configured", provider),
            )
            .into());
        }

        let Some((email, password)) = Self::parse_credentials(form) else {
            debug!("Sign-in rejected: malformed credentials");
            return Err(AuthError::credentials("malformed credentials").into());
        };

        let Some(user) = self.store.find_user_by_email(email).await? else {
            warn!("Invalid credentials: no user {}", email);
            return Err(AuthError::credentials("unknown user").into());
        };

        let password = password.to_string();
        let hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::new(AuthErrorKind::Configuration, e.to_string()))?
            .map_err(|e| {
                error!("Stored password hash for {} is unusable: {}", user.email, e);
                AuthError::new(AuthErrorKind::Configuration, e.to_string())
            })?;

        if !matches {
            warn!("Invalid credentials: wrong password for {}", email);
            return Err(AuthError::credentials("password mismatch").into());
        }

        let session = Session {
            user_id: user.id,
            name: user.name,
            email: user.email,
        };
        let token = self.codec.issue(&session).map_err(AuthError::from)?;
        debug!("Signed in {}", session.email);

        Ok(SignedIn { session, token })
    }
}

/// Minimal address shape check: one `@`, something before it, a dotted
/// domain after it, no whitespace
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(looks_like_email("user@nextmail.com"));
        assert!(!looks_like_email("user"));
        assert!(!looks_like_email("@nextmail.com"));
        assert!(!looks_like_email("user@nextmail"));
        assert!(!looks_like_email("us er@nextmail.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn error_display_names_the_kind() {
        let err = AuthError::credentials("unknown user");
        assert_eq!(err.to_string(), "CredentialsSignin: unknown user");
    }
}
