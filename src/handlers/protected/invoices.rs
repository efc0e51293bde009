// handlers/protected/invoices.rs - /dashboard/invoices/*
//
// Page reads return props; form posts run an action and either redirect to
// the list or answer with the action state.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    Form,
};
use serde_json::Value;
use tracing::debug;

use crate::actions::{create_invoice, delete_invoice, update_invoice, ActionState, INVOICES_PATH};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{envelope, ApiResponse, Outcome};
use crate::pages::{create_invoice_page, edit_invoice_page, invoices_page, parse_page, CreateInvoicePage};
use crate::validation::RawForm;

pub const INVOICE_NOT_FOUND: &str = "404 Not Found. Could not find the requested invoice.";

/// Cache key for one page of the invoice list. Built from the parsed
/// parameters so unknown query-string noise never mints a new entry.
pub fn list_key(query: &str, page: u32) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("query", query)
        .append_pair("page", &page.to_string())
        .finish();
    format!("{}?{}", INVOICES_PATH, params)
}

/// GET /dashboard/invoices?query=&page= - Filtered, paginated invoice table
///
/// Served from the page cache until an invoice mutation revalidates the
/// list or the entry expires.
pub async fn invoices_get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let query = params.get("query").map(String::as_str).unwrap_or_default();
    let page = parse_page(params.get("page").map(String::as_str));

    let key = list_key(query, page);
    if let Some(body) = state.cache.get(&key).await {
        debug!("Cache hit for {}", key);
        return Ok(Json(body));
    }

    let props = invoices_page(state.store.as_ref(), query, page, state.config.api.items_per_page).await?;
    let body = envelope(serde_json::to_value(props).map_err(|e| ApiError::internal_server_error(e.to_string()))?);
    state.cache.put(key, body.clone()).await;

    Ok(Json(body))
}

/// GET /dashboard/invoices/create - Customer list for the create form
pub async fn create_page_get(State(state): State<AppState>) -> Result<ApiResponse<CreateInvoicePage>, ApiError> {
    let page = create_invoice_page(state.store.as_ref()).await?;
    Ok(ApiResponse::success(page))
}

/// GET /dashboard/invoices/:id/edit - Invoice and customer list for the edit form
pub async fn edit_page_get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    match edit_invoice_page(state.store.as_ref(), &id).await? {
        Outcome::Success(page) => Ok(ApiResponse::success(page).into_response()),
        Outcome::Redirect(target) => Ok(Outcome::<()>::Redirect(target).into_response()),
        Outcome::NotFound => Err(ApiError::not_found(INVOICE_NOT_FOUND)),
    }
}

/// POST /dashboard/invoices - Create an invoice from the submitted form
pub async fn invoice_create(State(state): State<AppState>, Form(form): Form<RawForm>) -> Outcome<ActionState> {
    create_invoice(state.store.as_ref(), &state.cache, &form).await
}

/// POST /dashboard/invoices/:id - Update an invoice from the submitted form
pub async fn invoice_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RawForm>,
) -> Outcome<ActionState> {
    update_invoice(state.store.as_ref(), &state.cache, &id, &form).await
}

/// DELETE /dashboard/invoices/:id, POST /dashboard/invoices/:id/delete
pub async fn invoice_delete(State(state): State<AppState>, Path(id): Path<String>) -> Outcome<ActionState> {
    delete_invoice(state.store.as_ref(), &state.cache, &id).await
}
