//! Read-side page props. Each function gathers what one page renders.

use serde::Serialize;

use crate::database::models::{CardData, CustomerField, InvoiceForm, InvoicesTable, LatestInvoice};
use crate::database::{DatabaseError, InvoiceStore};
use crate::middleware::Outcome;

#[derive(Debug, Clone, Serialize)]
pub struct EditInvoicePage {
    pub invoice: InvoiceForm,
    pub customers: Vec<CustomerField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoicePage {
    pub customers: Vec<CustomerField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoicesPage {
    pub query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub invoices: Vec<InvoicesTable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub cards: CardData,
    pub latest_invoices: Vec<LatestInvoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPage {
    pub callback_url: Option<String>,
}

/// Invoice and customer list are fetched together; either failure aborts
/// the page. An unknown invoice never reaches the form.
pub async fn edit_invoice_page(
    store: &dyn InvoiceStore,
    id: &str,
) -> Result<Outcome<EditInvoicePage>, DatabaseError> {
    let (invoice, customers) =
        tokio::try_join!(store.fetch_invoice_by_id(id), store.fetch_customers())?;

    let Some(invoice) = invoice else {
        return Ok(Outcome::NotFound);
    };

    Ok(Outcome::Success(EditInvoicePage { invoice, customers }))
}

pub async fn create_invoice_page(store: &dyn InvoiceStore) -> Result<CreateInvoicePage, DatabaseError> {
    Ok(CreateInvoicePage {
        customers: store.fetch_customers().await?,
    })
}

pub async fn invoices_page(
    store: &dyn InvoiceStore,
    query: &str,
    page: u32,
    per_page: u32,
) -> Result<InvoicesPage, DatabaseError> {
    let (invoices, total_pages) = tokio::try_join!(
        store.fetch_filtered_invoices(query, page, per_page),
        store.fetch_invoices_pages(query, per_page)
    )?;

    Ok(InvoicesPage {
        query: query.to_string(),
        current_page: page,
        total_pages,
        invoices,
    })
}

pub async fn dashboard_page(store: &dyn InvoiceStore, latest: u32) -> Result<DashboardPage, DatabaseError> {
    let (cards, latest_invoices) =
        tokio::try_join!(store.fetch_card_data(), store.fetch_latest_invoices(latest))?;

    Ok(DashboardPage {
        cards,
        latest_invoices,
    })
}

/// `?page=` as typed by a user: anything that is not a positive number
/// means the first page
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}
