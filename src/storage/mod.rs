//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - service_categories(id, name, color, icon, description, active, created_at, updated_at)
//! - services(id, name, description, price, duration_minutes, category_id, active, created_at, updated_at)
//! - workshops, customers, mechanics, appointments (seeded, no operations here)
//!
//! Rows are never physically deleted; `active = 0` marks a soft delete.

pub mod schema;
pub mod sqlite;
mod categories;
mod services;

pub use sqlite::{ShopStore, TableCount, TableCounts};
