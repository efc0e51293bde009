// handlers/protected/session.rs - POST /dashboard/logout

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use tracing::info;

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::public::auth::session_cookie;

/// POST /dashboard/logout - Clear the session cookie and go home
pub async fn logout_post(State(state): State<AppState>, session: Option<Extension<Session>>) -> Response {
    if let Some(Extension(session)) = session {
        info!("{} signed out", session.email);
    }

    let cookie = session_cookie(&state, "", 0);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}
