//! Persistence layer.
//!
//! # Responsibility
//! - Define the key-value store seam (`kv_store`).
//! - Map domain values onto stored entries (`app_repo`).
//!
//! # Invariants
//! - Services never touch SQL or raw JSON; they go through `AppRepository`.

pub mod app_repo;
pub mod kv_store;
