// handlers/mod.rs - Route handlers by access tier
//
// Public (no session needed) → Protected (dashboard, session required).
// The session gate decides who reaches which tier; handlers only read the
// session when they need it.
pub mod health;
pub mod protected;
pub mod public;
