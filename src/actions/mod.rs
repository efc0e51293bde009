//! Form actions. Each one takes the raw submitted form, does its single
//! piece of work and reports back as an [`Outcome`](crate::middleware::Outcome).

pub mod auth;
pub mod invoices;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::types::Operation;
use crate::validation::FieldErrors;

pub use auth::{authenticate, SignInOutcome};
pub use invoices::{create_invoice, delete_invoice, update_invoice, INVOICES_PATH};

/// What a form action hands back when it does not navigate away
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    /// The form failed validation; nothing was written
    Invalid { errors: FieldErrors, message: String },
    /// The statement failed
    Failed { message: String },
    Done { message: String },
}

impl ActionState {
    pub fn database_failure(operation: Operation) -> Self {
        ActionState::Failed {
            message: format!("Database Error: Failed to {} Invoice.", operation.verb()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionState::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ActionState::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ActionState::Done { .. } => StatusCode::OK,
        }
    }
}

impl IntoResponse for ActionState {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "success": matches!(self, ActionState::Done { .. }),
            "data": self,
        });
        (status, Json(body)).into_response()
    }
}
