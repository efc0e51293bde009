use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }

    /// Exact, case-sensitive match against the stored spelling
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

/// Row in `invoices`. `amount` is in cents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub date: NaiveDate,
}

/// Values bound into the INSERT. The date is always server-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Values bound into the UPDATE. The date is not modifiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Invoice as the edit form consumes it, amount back in dollars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceForm {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub status: InvoiceStatus,
}

impl TryFrom<Invoice> for InvoiceForm {
    type Error = DatabaseError;

    fn try_from(invoice: Invoice) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&invoice.status).ok_or_else(|| {
            DatabaseError::Constraint(format!(
                "invoice {} has unknown status '{}'",
                invoice.id, invoice.status
            ))
        })?;

        Ok(Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: money::cents_to_amount(invoice.amount),
            status,
        })
    }
}

/// One line of the invoices list page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoicesTable {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestInvoice {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    /// Formatted, e.g. `$1,250.00`
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub number_of_customers: i64,
    pub number_of_invoices: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}
