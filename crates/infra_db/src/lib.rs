//! Database Infrastructure Layer
//!
//! PostgreSQL persistence for the ledger using SQLx:
//! - Connection pool management
//! - Error mapping from PostgreSQL error codes to the domain taxonomy
//! - Repositories that execute each posting, void, and strategy as one
//!   database transaction with row-locked accounts and atomic
//!   `balance = balance + delta` increments
//!
//! The schema lives in `migrations/0001_schema.sql` at the workspace root
//! and is applied externally or via `sqlx migrate`.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{AccountRepository, LedgerRepository, PeriodRepository};
