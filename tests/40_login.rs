mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

use common::{json_body, location, set_cookie, TestApp, USER_EMAIL, USER_PASSWORD};
use invoice_dashboard::auth::{AuthError, AuthErrorKind, AuthProvider, SignInError, SignedIn};
use invoice_dashboard::validation::RawForm;

#[tokio::test]
async fn valid_credentials_set_the_session_cookie() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post_form("/login", &[("email", USER_EMAIL), ("password", USER_PASSWORD)], false)
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/dashboard"));

    let cookie = set_cookie(&res).unwrap_or_default().to_string();
    assert!(cookie.starts_with("session="), "cookie {cookie}");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));

    // the issued cookie opens the dashboard
    let token = cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim_start_matches("session=")
        .to_string();
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, format!("session={}", token))
        .body(Body::empty())?;
    assert_eq!(app.send(request).await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn sign_in_returns_to_the_callback_url() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post_form(
            "/login",
            &[
                ("email", USER_EMAIL),
                ("password", USER_PASSWORD),
                ("callbackUrl", "/dashboard/invoices?page=2"),
            ],
            false,
        )
        .await?;

    assert_eq!(location(&res), Some("/dashboard/invoices?page=2"));
    Ok(())
}

#[tokio::test]
async fn unsafe_callback_url_falls_back_to_dashboard() -> Result<()> {
    let app = TestApp::new();

    for target in ["/dash\nboard", "/x\r\nSet-Cookie: admin=1", "https://evil.example"] {
        let res = app
            .post_form(
                "/login",
                &[("email", USER_EMAIL), ("password", USER_PASSWORD), ("redirectTo", target)],
                false,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::SEE_OTHER, "target {target:?}");
        assert_eq!(location(&res), Some("/dashboard"));
        assert!(set_cookie(&res).is_some_and(|c| c.starts_with("session=")));
    }
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post_form("/login", &[("email", USER_EMAIL), ("password", "wrong-password")], false)
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&res).is_none());
    let body = json_body(res).await?;
    assert_eq!(body["message"], "Invalid credentials.");
    Ok(())
}

#[tokio::test]
async fn malformed_credentials_are_invalid_credentials() -> Result<()> {
    let app = TestApp::new();

    for (email, password) in [("not-an-email", USER_PASSWORD), (USER_EMAIL, "123"), ("nobody@nextmail.com", "123456")] {
        let res = app
            .post_form("/login", &[("email", email), ("password", password)], false)
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(json_body(res).await?["message"], "Invalid credentials.");
    }
    Ok(())
}

#[tokio::test]
async fn database_errors_during_sign_in_propagate() -> Result<()> {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    let res = app
        .post_form("/login", &[("email", USER_EMAIL), ("password", USER_PASSWORD)], false)
        .await?;

    assert!(res.status().is_server_error(), "status {}", res.status());
    Ok(())
}

struct MisconfiguredProvider;

#[async_trait]
impl AuthProvider for MisconfiguredProvider {
    async fn sign_in(&self, _provider: &str, _form: &RawForm) -> Result<SignedIn, SignInError> {
        Err(AuthError::new(AuthErrorKind::Configuration, "no secret").into())
    }
}

#[tokio::test]
async fn other_auth_errors_are_something_went_wrong() -> Result<()> {
    let mut app = TestApp::new();
    app.state = app.state.clone().with_auth(Arc::new(MisconfiguredProvider));

    let res = app
        .post_form("/login", &[("email", USER_EMAIL), ("password", USER_PASSWORD)], false)
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await?["message"], "Something went wrong.");
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_cookie() -> Result<()> {
    let app = TestApp::new();

    let res = app.post_form("/dashboard/logout", &[], true).await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/"));
    let cookie = set_cookie(&res).unwrap_or_default();
    assert!(cookie.starts_with("session=;"), "cookie {cookie}");
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}
