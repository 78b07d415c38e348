//! `PostgreSQL` data layer for the SISOCC occurrence service.
//!
//! The database is the single source of truth: occurrences, their
//! append-only status history, the audit log, and user display records.
//! Requests access it through per-table stores borrowing one shared pool;
//! there is no client-side locking. Lost updates between concurrent
//! writers are prevented by the optimistic version counter on the
//! occurrence row.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, migrations
//! - [`occurrence_store`] -- occurrence CRUD, versioned update, stats
//! - [`history_store`] -- append-only status-transition trail
//! - [`audit_store`] -- who-did-what records written by the request layer
//! - [`user_store`] -- display records for response enrichment
//! - [`error`] -- shared error types

pub mod audit_store;
pub mod error;
pub mod history_store;
pub mod occurrence_store;
pub mod postgres;
pub mod user_store;

// Re-export primary types for convenience.
pub use audit_store::{AuditStore, NewAuditEntry};
pub use error::DbError;
pub use history_store::HistoryStore;
pub use occurrence_store::{OccurrenceRow, OccurrenceStore, OccurrenceUpdate};
pub use postgres::{Db, DbConfig};
pub use user_store::UserStore;
