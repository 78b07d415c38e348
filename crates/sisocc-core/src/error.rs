//! Error types for the lifecycle engine.

use sisocc_db::DbError;
use sisocc_geocode::GeocodeError;

/// Errors that can occur while creating or updating an occurrence.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// No occurrence exists for the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent update won the version race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Address resolution failed under the strict policy.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// A persistence operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}
