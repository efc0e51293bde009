use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::{authorize, is_gated, AuthDecision, Session, SessionCodec};

/// Decodes the session (if any) into the request extensions, then applies
/// the route policy to every path the matcher covers.
pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let security = &state.config.security;
    let session = current_session(request.headers(), &security.session_cookie, &state.sessions);
    let is_logged_in = session.is_some();

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }

    let path = request.uri().path();
    if is_gated(path) {
        match authorize(is_logged_in, path) {
            AuthDecision::Allow => {}
            AuthDecision::Deny => {
                let target = sign_in_url(&security.sign_in_page, request.uri());
                debug!("No session for {}; sending to {}", path, target);
                return Redirect::temporary(&target).into_response();
            }
            AuthDecision::Redirect(target) => {
                debug!("Signed in on {}; sending to {}", path, target);
                return Redirect::temporary(&target).into_response();
            }
        }
    }

    next.run(request).await
}

/// A verified session from the cookie, falling back to a Bearer header.
/// Missing, expired and forged tokens all mean "not signed in".
fn current_session(headers: &HeaderMap, cookie_name: &str, codec: &SessionCodec) -> Option<Session> {
    let token = cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))?;

    match codec.verify(token) {
        Ok(session) => Some(session),
        Err(e) => {
            debug!("Ignoring session token: {}", e);
            None
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `/login?callbackUrl=<where the user was going>`
fn sign_in_url(sign_in_page: &str, uri: &Uri) -> String {
    let callback = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("{}?{}", sign_in_page, query)
}
