//! Audit log operations.
//!
//! The request layer records who performed each successful create, update,
//! or delete, with a JSON change summary and the request origin. The
//! lifecycle engine itself never writes audit entries.

use sisocc_types::{AuditAction, AuditEntryId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// One audit record to append.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    /// The acting user.
    pub user_id: UserId,
    /// What was done.
    pub action: AuditAction,
    /// Entity kind, e.g. `"occurrence"`.
    pub entity: String,
    /// Identifier of the affected entity.
    pub entity_id: Uuid,
    /// JSON change summary.
    pub details: serde_json::Value,
    /// Request origin IP, when known.
    pub ip: Option<String>,
    /// Request user agent, when known.
    pub user_agent: Option<String>,
}

/// Operations on the `audit_log` table.
pub struct AuditStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn append(&self, entry: &NewAuditEntry) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO audit_log (id, user_id, action, entity, entity_id, details, ip, user_agent)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(AuditEntryId::new().into_inner())
        .bind(entry.user_id.into_inner())
        .bind(action_to_db(entry.action))
        .bind(&entry.entity)
        .bind(entry.entity_id)
        .bind(&entry.details)
        .bind(entry.ip.as_deref())
        .bind(entry.user_agent.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

/// Convert an [`AuditAction`] to its stored string.
const fn action_to_db(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "CREATE",
        AuditAction::Update => "UPDATE",
        AuditAction::Delete => "DELETE",
    }
}
