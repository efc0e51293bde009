pub mod actions;
pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod money;
pub mod pages;
pub mod types;
pub mod validation;

pub use app::{app, AppState};
