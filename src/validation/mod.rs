//! Invoice form schema.
//!
//! Forms arrive as flat `name -> value` maps. The full invoice shape has
//! `id`, `customerId`, `amount`, `status` and `date`; the create and update
//! schemas drop `id` and `date` because the server owns them, so anything the
//! client sends under those names is ignored.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::InvoiceStatus;
use crate::money;
use crate::types::Operation;

/// A submitted form, field name to raw value
pub type RawForm = HashMap<String, String>;

/// Field name to its error messages, in the order they were found
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const CUSTOMER_ID: &str = "customerId";
pub const AMOUNT: &str = "amount";
pub const STATUS: &str = "status";

// User-facing text, kept verbatim (including the spelling) for compatibility.
pub const CUSTOMER_ERROR: &str = "Please select a costumer.";
pub const AMOUNT_ERROR: &str = "Please enter an amount greater than $0.";
pub const STATUS_ERROR: &str = "Please select an invoice status.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSchema {
    Create,
    Update,
}

impl InvoiceSchema {
    pub fn operation(&self) -> Operation {
        match self {
            InvoiceSchema::Create => Operation::Create,
            InvoiceSchema::Update => Operation::Update,
        }
    }

    pub fn failure_message(&self) -> String {
        format!("Missing Fields. Failed to {} Invoice.", self.operation().verb())
    }
}

/// Invoice fields after coercion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceInput {
    pub customer_id: String,
    /// Dollars, as entered
    pub amount: Decimal,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(InvoiceInput),
    Invalid { errors: FieldErrors, message: String },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }
}

pub fn validate(schema: InvoiceSchema, form: &RawForm) -> ValidationResult {
    let mut errors = FieldErrors::new();

    let customer_id = form
        .get(CUSTOMER_ID)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty());
    if customer_id.is_none() {
        push_error(&mut errors, CUSTOMER_ID, CUSTOMER_ERROR);
    }

    // Amounts that round to zero cents are not greater than $0 either.
    let amount = form
        .get(AMOUNT)
        .and_then(|raw| money::parse_amount(raw))
        .filter(|amount| *amount > Decimal::ZERO)
        .and_then(|amount| Some((amount, money::amount_to_cents(amount)?)))
        .filter(|(_, cents)| *cents > 0);
    if amount.is_none() {
        push_error(&mut errors, AMOUNT, AMOUNT_ERROR);
    }

    let status = form.get(STATUS).and_then(|raw| InvoiceStatus::parse(raw));
    if status.is_none() {
        push_error(&mut errors, STATUS, STATUS_ERROR);
    }

    match (customer_id, amount, status) {
        (Some(customer_id), Some((amount, amount_in_cents)), Some(status)) => {
            ValidationResult::Valid(InvoiceInput {
                customer_id: customer_id.to_string(),
                amount,
                amount_in_cents,
                status,
            })
        }
        _ => ValidationResult::Invalid {
            errors,
            message: schema.failure_message(),
        },
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}
