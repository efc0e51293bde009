#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use invoice_dashboard::auth::{hash_password, Session};
use invoice_dashboard::config::AppConfig;
use invoice_dashboard::database::models::InvoiceStatus;
use invoice_dashboard::database::MemoryInvoiceStore;
use invoice_dashboard::{app, AppState};

pub const USER_NAME: &str = "User";
pub const USER_EMAIL: &str = "user@nextmail.com";
pub const USER_PASSWORD: &str = "123456";

/// Router over a seeded in-memory store: two customers, three invoices and
/// one user who can sign in
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryInvoiceStore>,
    pub user_id: Uuid,
    pub lee: Uuid,
    pub evil_rabbit: Uuid,
    pub paid_invoice: Uuid,
    pub pending_invoice: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut store = MemoryInvoiceStore::new();
        let lee = store.add_customer("Lee Robinson", "lee@robinson.com");
        let evil_rabbit = store.add_customer("Evil Rabbit", "evil@rabbit.com");

        let paid_invoice = store.add_invoice(lee, 15_795, InvoiceStatus::Paid, date(2023, 12, 6));
        let pending_invoice = store.add_invoice(evil_rabbit, 20_348, InvoiceStatus::Pending, date(2023, 11, 14));
        store.add_invoice(evil_rabbit, 3_040, InvoiceStatus::Paid, date(2023, 10, 29));

        let hash = hash_password(USER_PASSWORD, 4).expect("bcrypt hash");
        let user_id = store.add_user(USER_NAME, USER_EMAIL, &hash);

        let store = Arc::new(store);
        let mut config = AppConfig::for_tests();
        adjust(&mut config);
        let state = AppState::new(store.clone(), config);

        Self {
            state,
            store,
            user_id,
            lee,
            evil_rabbit,
            paid_invoice,
            pending_invoice,
        }
    }

    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    pub fn token(&self) -> String {
        let session = Session {
            user_id: self.user_id,
            name: USER_NAME.to_string(),
            email: USER_EMAIL.to_string(),
        };
        self.state.sessions.issue(&session).expect("session token")
    }

    pub fn session_cookie(&self) -> String {
        format!("session={}", self.token())
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router().oneshot(request).await?)
    }

    pub async fn get(&self, path: &str, signed_in: bool) -> Result<Response> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if signed_in {
            builder = builder.header(header::COOKIE, self.session_cookie());
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)], signed_in: bool) -> Result<Response> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if signed_in {
            builder = builder.header(header::COOKIE, self.session_cookie());
        }
        self.send(builder.body(Body::from(body))?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .header(header::COOKIE, self.session_cookie())
            .body(Body::empty())?;
        self.send(request).await
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub async fn json_body(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub fn set_cookie(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
}
