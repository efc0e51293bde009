use axum::http::HeaderValue;
use tracing::warn;

use crate::auth::{AuthErrorKind, AuthProvider, SignInError, SignedIn, CREDENTIALS_PROVIDER};
use crate::auth::policy::DASHBOARD;
use crate::database::DatabaseError;
use crate::validation::RawForm;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

#[derive(Debug, Clone)]
pub enum SignInOutcome {
    SignedIn { signed_in: SignedIn, redirect_to: String },
    /// Message to show on the login form
    Rejected(String),
}

/// Sign in with the credentials provider. Authentication failures become a
/// message for the form; anything else is returned as an error.
pub async fn authenticate(provider: &dyn AuthProvider, form: &RawForm) -> Result<SignInOutcome, DatabaseError> {
    match provider.sign_in(CREDENTIALS_PROVIDER, form).await {
        Ok(signed_in) => Ok(SignInOutcome::SignedIn {
            signed_in,
            redirect_to: redirect_target(form),
        }),
        Err(SignInError::Auth(e)) => {
            let message = match e.kind {
                AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS,
                _ => {
                    warn!("Sign-in failed: {}", e);
                    SOMETHING_WENT_WRONG
                }
            };
            Ok(SignInOutcome::Rejected(message.to_string()))
        }
        Err(SignInError::Database(e)) => Err(e),
    }
}

/// Where to go after signing in. Only same-site paths that can travel in a
/// `Location` header are honoured.
pub fn redirect_target(form: &RawForm) -> String {
    form.get("redirectTo")
        .or_else(|| form.get("callbackUrl"))
        .map(|target| target.trim())
        .filter(|target| is_local_path(target))
        .map_or_else(|| DASHBOARD.to_string(), str::to_string)
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
        && HeaderValue::from_str(target).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> RawForm {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn redirect_defaults_to_dashboard() {
        assert_eq!(redirect_target(&RawForm::new()), "/dashboard");
    }

    #[test]
    fn redirect_honours_local_paths_only() {
        assert_eq!(
            redirect_target(&form(&[("redirectTo", "/dashboard/invoices")])),
            "/dashboard/invoices"
        );
        assert_eq!(redirect_target(&form(&[("redirectTo", "https://evil.example")])), "/dashboard");
        assert_eq!(redirect_target(&form(&[("redirectTo", "//evil.example")])), "/dashboard");
    }

    #[test]
    fn redirect_rejects_header_breaking_targets() {
        assert_eq!(redirect_target(&form(&[("redirectTo", "/dash\nboard")])), "/dashboard");
        assert_eq!(redirect_target(&form(&[("callbackUrl", "/a\r\nSet-Cookie: x=1")])), "/dashboard");
        assert_eq!(redirect_target(&form(&[("redirectTo", "/tab\there")])), "/dashboard");
        assert_eq!(redirect_target(&form(&[("redirectTo", "/dashboard/café")])), "/dashboard");
    }
}
