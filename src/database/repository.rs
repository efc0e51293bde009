use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    CardData, CustomerField, Invoice, InvoiceChanges, InvoiceForm, InvoicesTable, LatestInvoice,
    NewInvoice, User,
};
use crate::database::store::{page_count, page_offset, InvoiceStore};
use crate::money::format_currency;

/// PostgreSQL-backed store. Every value reaches the server as a bound
/// parameter; SQL text is never assembled from input.
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

const FILTER_CLAUSE: &str = r#"
    customers.name ILIKE $1 OR
    customers.email ILIKE $1 OR
    invoices.amount::text ILIKE $1 OR
    invoices.date::text ILIKE $1 OR
    invoices.status ILIKE $1
"#;

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn like_pattern(query: &str) -> String {
        format!("%{}%", query)
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO invoices (customer_id, amount, status, date)
             VALUES ($1::uuid, $2, $3, $4)",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        let Ok(id) = Uuid::parse_str(id) else {
            debug!("update skipped, '{}' is not an invoice id", id);
            return Ok(0);
        };

        let result = sqlx::query(
            "UPDATE invoices
             SET customer_id = $1::uuid, amount = $2, status = $3
             WHERE id = $4",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, DatabaseError> {
        let Ok(id) = Uuid::parse_str(id) else {
            debug!("delete skipped, '{}' is not an invoice id", id);
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<InvoiceForm>, DatabaseError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, customer_id, amount, status, date
             FROM invoices
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        invoice.map(InvoiceForm::try_from).transpose()
    }

    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, DatabaseError> {
        let customers = sqlx::query_as::<_, CustomerField>(
            "SELECT id, name FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<InvoicesTable>, DatabaseError> {
        let sql = format!(
            "SELECT
                invoices.id, invoices.customer_id, invoices.amount, invoices.date, invoices.status,
                customers.name, customers.email, customers.image_url
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE {FILTER_CLAUSE}
             ORDER BY invoices.date DESC
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, InvoicesTable>(&sql)
            .bind(Self::like_pattern(query))
            .bind(i64::from(per_page))
            .bind(page_offset(page, per_page))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_invoices_pages(&self, query: &str, per_page: u32) -> Result<u32, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*)
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE {FILTER_CLAUSE}"
        );

        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(Self::like_pattern(query))
            .fetch_one(&self.pool)
            .await?;
        Ok(page_count(total, per_page))
    }

    async fn fetch_latest_invoices(&self, limit: u32) -> Result<Vec<LatestInvoice>, DatabaseError> {
        let rows: Vec<(Uuid, String, String, String, i64)> = sqlx::query_as(
            "SELECT invoices.id, customers.name, customers.image_url, customers.email, invoices.amount
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             ORDER BY invoices.date DESC
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, image_url, email, amount)| LatestInvoice {
                id,
                name,
                image_url,
                email,
                amount: format_currency(amount),
            })
            .collect())
    }

    async fn fetch_card_data(&self) -> Result<CardData, DatabaseError> {
        let invoice_count = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool);
        let customer_count = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool);
        let totals = sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0)::BIGINT AS paid,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::BIGINT AS pending
             FROM invoices",
        )
        .fetch_one(&self.pool);

        let ((number_of_invoices,), (number_of_customers,), (paid, pending)) =
            tokio::try_join!(invoice_count, customer_count, totals)?;

        Ok(CardData {
            number_of_customers,
            number_of_invoices,
            total_paid_invoices: format_currency(paid),
            total_pending_invoices: format_currency(pending),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// Insert a user with an already-hashed password. Used by the admin CLI.
pub async fn insert_user(pool: &PgPool, name: &str, email: &str, password_hash: &str) -> Result<Uuid, DatabaseError> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
