// handlers/protected/mod.rs - Dashboard handlers
//
// Everything here lives under /dashboard, so the session gate has already
// turned away anonymous requests by the time a handler runs.

pub mod dashboard;
pub mod invoices;
pub mod session;
