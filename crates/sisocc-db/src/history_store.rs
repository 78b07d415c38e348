//! Status-transition history operations.
//!
//! History entries are append-only: nothing in this module (or anywhere
//! else in the service) updates or deletes them. The append itself runs on
//! the caller's transaction so a status change and its trail commit or
//! roll back together; see
//! [`OccurrenceStore::apply_update`](crate::OccurrenceStore::apply_update).

use chrono::{DateTime, Utc};
use sisocc_types::OccurrenceHistoryEntry;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DbError;
use crate::occurrence_store::{status_from_db, status_to_db};

/// Append one history entry on an existing connection or transaction.
pub(crate) async fn append(
    conn: &mut PgConnection,
    entry: &OccurrenceHistoryEntry,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO occurrence_history
              (id, occurrence_id, previous_status, new_status, note, changed_by, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id.into_inner())
    .bind(entry.occurrence_id.into_inner())
    .bind(status_to_db(entry.previous_status))
    .bind(status_to_db(entry.new_status))
    .bind(&entry.note)
    .bind(entry.changed_by.into_inner())
    .bind(entry.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Read operations on the `occurrence_history` table.
pub struct HistoryStore<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All history entries of one occurrence, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored status is unknown.
    pub async fn list_for_occurrence(
        &self,
        occurrence_id: Uuid,
    ) -> Result<Vec<OccurrenceHistoryEntry>, DbError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"SELECT id, occurrence_id, previous_status, new_status, note, changed_by, created_at
              FROM occurrence_history
              WHERE occurrence_id = $1
              ORDER BY created_at DESC",
        )
        .bind(occurrence_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_domain).collect()
    }
}

/// A row from the `occurrence_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    occurrence_id: Uuid,
    previous_status: String,
    new_status: String,
    note: String,
    changed_by: Uuid,
    created_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_domain(self) -> Result<OccurrenceHistoryEntry, DbError> {
        Ok(OccurrenceHistoryEntry {
            id: self.id.into(),
            occurrence_id: self.occurrence_id.into(),
            previous_status: status_from_db(&self.previous_status)?,
            new_status: status_from_db(&self.new_status)?,
            note: self.note,
            changed_by: self.changed_by.into(),
            created_at: self.created_at,
        })
    }
}
