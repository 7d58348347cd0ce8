pub mod config;
pub mod errors;
pub mod retry;
pub mod initialization;
pub mod models;
pub mod table;
pub mod event;
pub mod predictions;
pub mod category;
pub mod ingest;
pub mod dashboard;
pub mod manager_storage;
pub mod manager_inference;
pub mod manager_mail;
