//! Core data models for the retail back-office storage gateways.
//!
//! These entities represent table records, blob/file listings, and queue
//! messages. Table-backed types map to SQLite rows via `sqlx::FromRow` and
//! serialize with the wire field names the JSON API exposes.

pub mod blob;
pub mod customer;
pub mod file;
pub mod message;
pub mod product;
