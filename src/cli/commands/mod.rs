pub mod db;
pub mod policy;
pub mod user;
