// handlers/public/auth.rs - GET/POST /login

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;

use crate::actions::{authenticate, SignInOutcome};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::pages::LoginPage;
use crate::validation::RawForm;

/// GET /login - Props for the sign-in form
///
/// `callbackUrl` is handed back so the form can post it with the
/// credentials.
pub async fn login_get(Query(params): Query<HashMap<String, String>>) -> ApiResponse<LoginPage> {
    ApiResponse::success(LoginPage {
        callback_url: params.get("callbackUrl").cloned(),
    })
}

/// POST /login - Sign in with email and password
///
/// Form fields: `email`, `password`, optional `redirectTo`/`callbackUrl`.
/// Success sets the session cookie and redirects (303). Bad credentials
/// answer 401 with the message for the form.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<RawForm>) -> Result<Response, ApiError> {
    match authenticate(state.auth.as_ref(), &form).await? {
        SignInOutcome::SignedIn { signed_in, redirect_to } => {
            info!("{} signed in", signed_in.session.email);
            let cookie = session_cookie(&state, &signed_in.token, state.sessions.max_age_secs());
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&redirect_to)).into_response())
        }
        SignInOutcome::Rejected(message) => Err(ApiError::unauthorized(message)),
    }
}

/// `Set-Cookie` value for the session. An empty token with zero max-age
/// clears it.
pub fn session_cookie(state: &AppState, token: &str, max_age_secs: u64) -> String {
    let security = &state.config.security;
    let secure = if security.require_https { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        security.session_cookie, token, max_age_secs, secure
    )
}
