pub mod cache;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod models;
pub mod worker;
