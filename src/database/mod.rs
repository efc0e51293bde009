pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryInvoiceStore;
pub use repository::PgInvoiceStore;
pub use store::InvoiceStore;
