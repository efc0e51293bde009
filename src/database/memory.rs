use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CardData, Customer, CustomerField, Invoice, InvoiceChanges, InvoiceForm, InvoiceStatus,
    InvoicesTable, LatestInvoice, NewInvoice, User,
};
use crate::database::store::{page_count, page_offset, InvoiceStore};
use crate::money::format_currency;
use crate::types::Operation;

#[derive(Debug, Default)]
struct Tables {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    users: Vec<User>,
}

/// Store kept entirely in process memory. Mirrors the PostgreSQL schema
/// rules that matter to callers (foreign key on `customer_id`, unknown ids
/// affect nothing) and records every mutating statement it receives.
#[derive(Debug, Default)]
pub struct MemoryInvoiceStore {
    tables: RwLock<Tables>,
    statements: RwLock<Vec<Operation>>,
    unavailable: AtomicBool,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customer(&mut self, name: &str, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let image_url = format!("/customers/{}.png", name.to_lowercase().replace(' ', "-"));
        self.tables_mut().customers.push(Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
            image_url,
        });
        id
    }

    pub fn add_invoice(&mut self, customer_id: Uuid, amount: i64, status: InvoiceStatus, date: NaiveDate) -> Uuid {
        let id = Uuid::new_v4();
        self.tables_mut().invoices.push(Invoice {
            id,
            customer_id,
            amount,
            status: status.as_str().to_string(),
            date,
        });
        id
    }

    /// `password_hash` must already be a bcrypt hash
    pub fn add_user(&mut self, name: &str, email: &str, password_hash: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables_mut().users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
        });
        id
    }

    /// Make every subsequent call fail as if the server went away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Mutating statements received so far, in order
    pub fn statements(&self) -> Vec<Operation> {
        self.statements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.read().invoices.iter().find(|i| i.id == id).cloned()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.read().invoices.clone()
    }

    fn tables_mut(&mut self) -> &mut Tables {
        self.tables.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, operation: Operation) {
        self.statements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(operation);
    }

    fn ensure_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn existing_customer(tables: &Tables, customer_id: &str) -> Result<Uuid, DatabaseError> {
        Uuid::parse_str(customer_id)
            .ok()
            .filter(|id| tables.customers.iter().any(|c| c.id == *id))
            .ok_or_else(|| {
                DatabaseError::Constraint(format!(
                    "invoices_customer_id_fkey: no customer '{}'",
                    customer_id
                ))
            })
    }

    fn table_rows(tables: &Tables, query: &str) -> Vec<InvoicesTable> {
        let needle = query.to_lowercase();
        let mut rows: Vec<InvoicesTable> = tables
            .invoices
            .iter()
            .filter_map(|invoice| {
                let customer = tables.customers.iter().find(|c| c.id == invoice.customer_id)?;
                Some(InvoicesTable {
                    id: invoice.id,
                    customer_id: invoice.customer_id,
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    date: invoice.date,
                    amount: invoice.amount,
                    status: invoice.status.clone(),
                })
            })
            .filter(|row| {
                [
                    row.name.to_lowercase(),
                    row.email.to_lowercase(),
                    row.amount.to_string(),
                    row.date.to_string(),
                    row.status.to_lowercase(),
                ]
                .iter()
                .any(|field| field.contains(&needle))
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), DatabaseError> {
        self.record(Operation::Create);
        self.ensure_available()?;

        let mut tables = self.write();
        let customer_id = Self::existing_customer(&tables, &invoice.customer_id)?;
        tables.invoices.push(Invoice {
            id: Uuid::new_v4(),
            customer_id,
            amount: invoice.amount,
            status: invoice.status.as_str().to_string(),
            date: invoice.date,
        });
        Ok(())
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        self.record(Operation::Update);
        self.ensure_available()?;

        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };
        // the uuid cast is evaluated before any row is matched
        let customer_id = Uuid::parse_str(&changes.customer_id).map_err(|_| {
            DatabaseError::Constraint(format!("invalid uuid '{}'", changes.customer_id))
        })?;

        let mut tables = self.write();
        let Some(index) = tables.invoices.iter().position(|i| i.id == id) else {
            return Ok(0);
        };
        // the foreign key is only checked for a row being written
        if !tables.customers.iter().any(|c| c.id == customer_id) {
            return Err(DatabaseError::Constraint(format!(
                "invoices_customer_id_fkey: no customer '{}'",
                customer_id
            )));
        }

        let invoice = &mut tables.invoices[index];
        invoice.customer_id = customer_id;
        invoice.amount = changes.amount;
        invoice.status = changes.status.as_str().to_string();
        Ok(1)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, DatabaseError> {
        self.record(Operation::Delete);
        self.ensure_available()?;

        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };
        let mut tables = self.write();
        let before = tables.invoices.len();
        tables.invoices.retain(|i| i.id != id);
        Ok((before - tables.invoices.len()) as u64)
    }

    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<InvoiceForm>, DatabaseError> {
        self.ensure_available()?;

        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let invoice = self.read().invoices.iter().find(|i| i.id == id).cloned();
        invoice.map(InvoiceForm::try_from).transpose()
    }

    async fn fetch_customers(&self) -> Result<Vec<CustomerField>, DatabaseError> {
        self.ensure_available()?;

        let mut customers: Vec<CustomerField> =
            self.read().customers.iter().map(CustomerField::from).collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<InvoicesTable>, DatabaseError> {
        self.ensure_available()?;

        let offset = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
        Ok(Self::table_rows(&self.read(), query)
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect())
    }

    async fn fetch_invoices_pages(&self, query: &str, per_page: u32) -> Result<u32, DatabaseError> {
        self.ensure_available()?;

        let total = Self::table_rows(&self.read(), query).len();
        Ok(page_count(i64::try_from(total).unwrap_or(i64::MAX), per_page))
    }

    async fn fetch_latest_invoices(&self, limit: u32) -> Result<Vec<LatestInvoice>, DatabaseError> {
        self.ensure_available()?;

        Ok(Self::table_rows(&self.read(), "")
            .into_iter()
            .take(limit as usize)
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                email: row.email,
                amount: format_currency(row.amount),
            })
            .collect())
    }

    async fn fetch_card_data(&self) -> Result<CardData, DatabaseError> {
        self.ensure_available()?;

        let tables = self.read();
        let total_for = |status: InvoiceStatus| -> i64 {
            tables
                .invoices
                .iter()
                .filter(|i| i.status == status.as_str())
                .map(|i| i.amount)
                .sum()
        };

        Ok(CardData {
            number_of_customers: tables.customers.len() as i64,
            number_of_invoices: tables.invoices.len() as i64,
            total_paid_invoices: format_currency(total_for(InvoiceStatus::Paid)),
            total_pending_invoices: format_currency(total_for(InvoiceStatus::Pending)),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.ensure_available()?;
        Ok(self.read().users.iter().find(|u| u.email == email).cloned())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.ensure_available()
    }
}
