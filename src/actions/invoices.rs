use chrono::Utc;
use tracing::{debug, error, info};

use super::ActionState;
use crate::cache::PageCache;
use crate::database::models::{InvoiceChanges, NewInvoice};
use crate::database::InvoiceStore;
use crate::middleware::Outcome;
use crate::types::Operation;
use crate::validation::{validate, InvoiceInput, InvoiceSchema, RawForm, ValidationResult};

/// The invoice list route; revalidated after every successful mutation and
/// where create/update send the browser afterwards
pub const INVOICES_PATH: &str = "/dashboard/invoices";

fn validated(schema: InvoiceSchema, form: &RawForm) -> Result<InvoiceInput, ActionState> {
    match validate(schema, form) {
        ValidationResult::Valid(input) => Ok(input),
        ValidationResult::Invalid { errors, message } => {
            debug!("{:?} invoice rejected: {:?}", schema.operation(), errors);
            Err(ActionState::Invalid { errors, message })
        }
    }
}

pub async fn create_invoice(
    store: &dyn InvoiceStore,
    cache: &PageCache,
    form: &RawForm,
) -> Outcome<ActionState> {
    let input = match validated(InvoiceSchema::Create, form) {
        Ok(input) => input,
        Err(state) => return Outcome::Success(state),
    };

    let invoice = NewInvoice {
        customer_id: input.customer_id,
        amount: input.amount_in_cents,
        status: input.status,
        date: Utc::now().date_naive(),
    };

    if let Err(e) = store.insert_invoice(&invoice).await {
        error!("Failed to create invoice: {}", e);
        return Outcome::Success(ActionState::database_failure(Operation::Create));
    }
    info!("Created invoice for customer {} ({} cents)", invoice.customer_id, invoice.amount);

    cache.revalidate_path(INVOICES_PATH).await;
    Outcome::redirect(INVOICES_PATH)
}

pub async fn update_invoice(
    store: &dyn InvoiceStore,
    cache: &PageCache,
    id: &str,
    form: &RawForm,
) -> Outcome<ActionState> {
    let input = match validated(InvoiceSchema::Update, form) {
        Ok(input) => input,
        Err(state) => return Outcome::Success(state),
    };

    let changes = InvoiceChanges {
        customer_id: input.customer_id,
        amount: input.amount_in_cents,
        status: input.status,
    };

    match store.update_invoice(id, &changes).await {
        Ok(rows) => info!("Updated invoice {} ({} rows)", id, rows),
        Err(e) => {
            error!("Failed to update invoice {}: {}", id, e);
            return Outcome::Success(ActionState::database_failure(Operation::Update));
        }
    }

    cache.revalidate_path(INVOICES_PATH).await;
    Outcome::redirect(INVOICES_PATH)
}

/// Deletes without checking that the invoice exists; a missing id still
/// reports success. The caller is already on the list, so no redirect.
pub async fn delete_invoice(store: &dyn InvoiceStore, cache: &PageCache, id: &str) -> Outcome<ActionState> {
    match store.delete_invoice(id).await {
        Ok(rows) => info!("Deleted invoice {} ({} rows)", id, rows),
        Err(e) => {
            error!("Failed to delete invoice {}: {}", id, e);
            return Outcome::Success(ActionState::database_failure(Operation::Delete));
        }
    }

    cache.revalidate_path(INVOICES_PATH).await;
    Outcome::Success(ActionState::Done {
        message: "Deleted Invoice.".to_string(),
    })
}
