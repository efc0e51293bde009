pub mod customer;
pub mod invoice;
pub mod user;

pub use customer::{Customer, CustomerField};
pub use invoice::{
    CardData, Invoice, InvoiceChanges, InvoiceForm, InvoiceStatus, InvoicesTable, LatestInvoice,
    NewInvoice,
};
pub use user::User;
