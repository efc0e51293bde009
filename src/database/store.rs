use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CardData, CustomerField, InvoiceChanges, InvoiceForm, InvoicesTable, LatestInvoice,
    NewInvoice, User,
};

/// Every read and write the dashboard performs. Identifiers arrive as the
/// raw strings taken from routes; an id that cannot name a row behaves like
/// a row that does not exist.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), DatabaseError>;

    /// Returns the number of rows affected
    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError>;

    /// Returns the number of rows affected
    async fn delete_invoice(&self, id: &str) -> Result<u64, DatabaseError>;

    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<InvoiceForm>, DatabaseError>;

    /// All customers ordered by name
    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, DatabaseError>;

    /// One page (1-based) of invoices matching `query`, newest first
    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<InvoicesTable>, DatabaseError>;

    async fn fetch_invoices_pages(&self, query: &str, per_page: u32) -> Result<u32, DatabaseError>;

    async fn fetch_latest_invoices(&self, limit: u32) -> Result<Vec<LatestInvoice>, DatabaseError>;

    async fn fetch_card_data(&self) -> Result<CardData, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Number of pages needed for `total` rows; an empty table still has zero pages
pub fn page_count(total: i64, per_page: u32) -> u32 {
    if total <= 0 || per_page == 0 {
        return 0;
    }
    let per_page = i64::from(per_page);
    u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX)
}

/// Row offset of a 1-based page
pub fn page_offset(page: u32, per_page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 6), 0);
        assert_eq!(page_count(1, 6), 1);
        assert_eq!(page_count(6, 6), 1);
        assert_eq!(page_count(7, 6), 2);
        assert_eq!(page_count(13, 6), 3);
    }

    #[test]
    fn page_offset_is_one_based() {
        assert_eq!(page_offset(1, 6), 0);
        assert_eq!(page_offset(3, 6), 12);
        assert_eq!(page_offset(0, 6), 0);
    }
}
