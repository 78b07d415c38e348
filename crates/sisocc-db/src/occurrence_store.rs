//! Occurrence table operations.
//!
//! The occurrence row carries an optimistic `version` counter. Every
//! update goes through [`OccurrenceStore::apply_update`], which checks and
//! increments the counter in the same statement; a concurrent update that
//! lost the race matches zero rows instead of silently overwriting. When
//! the update includes a status change, the history entry is inserted in
//! the same transaction so the audit trail can never diverge from the
//! status column.

use chrono::{DateTime, Utc};
use sisocc_types::{
    BucketCount, Occurrence, OccurrenceFilter, OccurrenceHistoryEntry, OccurrenceStats,
    OccurrenceStatus, OccurrenceType, Priority, StatusCounts,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::history_store;

/// Column list shared by every SELECT/RETURNING on the occurrences table.
const COLUMNS: &str = "id, occurrence_type, place, address, latitude, longitude, status, \
     priority, description, photos, created_by, assignee, occurred_at, responded_at, \
     completed_at, response_minutes, version, created_at, updated_at";

/// Operations on the `occurrences` table.
pub struct OccurrenceStore<'a> {
    pool: &'a PgPool,
}

/// The merged column payload of one update call.
///
/// `None` leaves the column unchanged. Derived timing fields arrive here
/// already decided by the lifecycle engine; the store only writes them.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceUpdate {
    /// New lifecycle status.
    pub status: Option<OccurrenceStatus>,
    /// New dispatch priority.
    pub priority: Option<Priority>,
    /// Replacement description.
    pub description: Option<String>,
    /// Newly assigned user.
    pub assignee: Option<Uuid>,
    /// First-response timestamp, set at most once.
    pub responded_at: Option<DateTime<Utc>>,
    /// Whole minutes between report and first response.
    pub response_minutes: Option<i64>,
    /// Completion timestamp, set at most once.
    pub completed_at: Option<DateTime<Utc>>,
    /// New modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl<'a> OccurrenceStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly created occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, occurrence: &Occurrence) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO occurrences (id, occurrence_type, place, address, latitude, longitude,
                  status, priority, description, photos, created_by, assignee, occurred_at,
                  responded_at, completed_at, response_minutes, version, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(occurrence.id.into_inner())
        .bind(type_to_db(occurrence.occurrence_type))
        .bind(&occurrence.place)
        .bind(&occurrence.address)
        .bind(occurrence.latitude)
        .bind(occurrence.longitude)
        .bind(status_to_db(occurrence.status))
        .bind(priority_to_db(occurrence.priority))
        .bind(occurrence.description.as_deref())
        .bind(&occurrence.photos)
        .bind(occurrence.created_by.into_inner())
        .bind(occurrence.assignee.map(sisocc_types::UserId::into_inner))
        .bind(occurrence.occurred_at)
        .bind(occurrence.responded_at)
        .bind(occurrence.completed_at)
        .bind(occurrence.response_minutes)
        .bind(occurrence.version)
        .bind(occurrence.created_at)
        .bind(occurrence.updated_at)
        .execute(self.pool)
        .await?;

        tracing::debug!(id = %occurrence.id, "inserted occurrence");
        Ok(())
    }

    /// Fetch one occurrence by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored enum value is unknown.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<Occurrence>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM occurrences WHERE id = $1");
        let row = sqlx::query_as::<_, OccurrenceRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(OccurrenceRow::into_domain).transpose()
    }

    /// List occurrences matching the filter, newest first, plus the total
    /// match count for pagination.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either query fails.
    pub async fn list(
        &self,
        filter: &OccurrenceFilter,
    ) -> Result<(Vec<Occurrence>, i64), DbError> {
        let status = filter.status.map(status_to_db);
        let occurrence_type = filter.occurrence_type.map(type_to_db);
        let priority = filter.priority.map(priority_to_db);

        let predicate = r"($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR occurrence_type = $2)
              AND ($3::TEXT IS NULL OR priority = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR occurred_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR occurred_at <= $5)";

        let sql = format!(
            "SELECT {COLUMNS} FROM occurrences
             WHERE {predicate}
             ORDER BY occurred_at DESC
             LIMIT $6 OFFSET $7"
        );

        let rows = sqlx::query_as::<_, OccurrenceRow>(&sql)
            .bind(status)
            .bind(occurrence_type)
            .bind(priority)
            .bind(filter.from)
            .bind(filter.to)
            .bind(i64::from(filter.limit()))
            .bind(i64::from(filter.offset()))
            .fetch_all(self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM occurrences WHERE {predicate}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(status)
            .bind(occurrence_type)
            .bind(priority)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(self.pool)
            .await?;

        let occurrences = rows
            .into_iter()
            .map(OccurrenceRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((occurrences, total))
    }

    /// Apply an update guarded by the version counter, appending the
    /// history entry (when present) in the same transaction.
    ///
    /// Returns `None` when no row matched `id` + `expected_version`: the
    /// occurrence vanished or a concurrent update won the race. Nothing is
    /// committed in that case, including the history entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any statement fails; the
    /// transaction is rolled back.
    pub async fn apply_update(
        &self,
        id: Uuid,
        expected_version: i64,
        update: &OccurrenceUpdate,
        history: Option<&OccurrenceHistoryEntry>,
    ) -> Result<Option<Occurrence>, DbError> {
        let mut tx = self.pool.begin().await?;

        if let Some(entry) = history {
            history_store::append(&mut *tx, entry).await?;
        }

        let sql = format!(
            "UPDATE occurrences SET
                 status = COALESCE($3::TEXT, status),
                 priority = COALESCE($4::TEXT, priority),
                 description = COALESCE($5::TEXT, description),
                 assignee = COALESCE($6::UUID, assignee),
                 responded_at = COALESCE($7::TIMESTAMPTZ, responded_at),
                 response_minutes = COALESCE($8::BIGINT, response_minutes),
                 completed_at = COALESCE($9::TIMESTAMPTZ, completed_at),
                 updated_at = $10,
                 version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, OccurrenceRow>(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(update.status.map(status_to_db))
            .bind(update.priority.map(priority_to_db))
            .bind(update.description.as_deref())
            .bind(update.assignee)
            .bind(update.responded_at)
            .bind(update.response_minutes)
            .bind(update.completed_at)
            .bind(update.updated_at)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            // Version mismatch or vanished row: roll everything back so
            // the history entry does not outlive a rejected update.
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;
        row.into_domain().map(Some)
    }

    /// Delete one occurrence; history entries cascade.
    ///
    /// Returns whether a row was actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM occurrences WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts for the stats endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any aggregation query fails.
    pub async fn stats(&self) -> Result<OccurrenceStats, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM occurrences")
            .fetch_one(self.pool)
            .await?;

        let status_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM occurrences GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let mut by_status = StatusCounts::default();
        for (status, count) in status_rows {
            match status_from_db(&status)? {
                OccurrenceStatus::New => by_status.new = count,
                OccurrenceStatus::UnderReview => by_status.under_review = count,
                OccurrenceStatus::InProgress => by_status.in_progress = count,
                OccurrenceStatus::Completed => by_status.completed = count,
                OccurrenceStatus::Cancelled => by_status.cancelled = count,
            }
        }

        let by_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT occurrence_type, COUNT(*) FROM occurrences GROUP BY occurrence_type",
        )
        .fetch_all(self.pool)
        .await?;

        let by_priority: Vec<(String, i64)> =
            sqlx::query_as("SELECT priority, COUNT(*) FROM occurrences GROUP BY priority")
                .fetch_all(self.pool)
                .await?;

        Ok(OccurrenceStats {
            total,
            by_status,
            by_type: into_buckets(by_type),
            by_priority: into_buckets(by_priority),
        })
    }
}

/// Convert grouped rows into stats buckets.
fn into_buckets(rows: Vec<(String, i64)>) -> Vec<BucketCount> {
    rows.into_iter()
        .map(|(value, count)| BucketCount { value, count })
        .collect()
}

/// A row from the `occurrences` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OccurrenceRow {
    /// Occurrence id.
    pub id: Uuid,
    /// Incident category as stored text.
    pub occurrence_type: String,
    /// Place label.
    pub place: String,
    /// Full address text.
    pub address: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Lifecycle status as stored text.
    pub status: String,
    /// Priority as stored text.
    pub priority: String,
    /// Description.
    pub description: Option<String>,
    /// Stored photo filenames.
    pub photos: Vec<String>,
    /// Reporting user.
    pub created_by: Uuid,
    /// Assigned user.
    pub assignee: Option<Uuid>,
    /// Report timestamp.
    pub occurred_at: DateTime<Utc>,
    /// First-response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived response latency in whole minutes.
    pub response_minutes: Option<i64>,
    /// Optimistic concurrency counter.
    pub version: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl OccurrenceRow {
    /// Convert the raw row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] when a stored enum value is unknown.
    pub fn into_domain(self) -> Result<Occurrence, DbError> {
        Ok(Occurrence {
            id: self.id.into(),
            occurrence_type: type_from_db(&self.occurrence_type)?,
            place: self.place,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            status: status_from_db(&self.status)?,
            priority: priority_from_db(&self.priority)?,
            description: self.description,
            photos: self.photos,
            created_by: self.created_by.into(),
            assignee: self.assignee.map(Into::into),
            occurred_at: self.occurred_at,
            responded_at: self.responded_at,
            completed_at: self.completed_at,
            response_minutes: self.response_minutes,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Enum <-> stored text
// ---------------------------------------------------------------------------

/// Convert an [`OccurrenceStatus`] to its stored string.
pub(crate) const fn status_to_db(status: OccurrenceStatus) -> &'static str {
    match status {
        OccurrenceStatus::New => "NEW",
        OccurrenceStatus::UnderReview => "UNDER_REVIEW",
        OccurrenceStatus::InProgress => "IN_PROGRESS",
        OccurrenceStatus::Completed => "COMPLETED",
        OccurrenceStatus::Cancelled => "CANCELLED",
    }
}

/// Parse a stored status string.
pub(crate) fn status_from_db(value: &str) -> Result<OccurrenceStatus, DbError> {
    match value {
        "NEW" => Ok(OccurrenceStatus::New),
        "UNDER_REVIEW" => Ok(OccurrenceStatus::UnderReview),
        "IN_PROGRESS" => Ok(OccurrenceStatus::InProgress),
        "COMPLETED" => Ok(OccurrenceStatus::Completed),
        "CANCELLED" => Ok(OccurrenceStatus::Cancelled),
        other => Err(DbError::Decode(format!("unknown status {other:?}"))),
    }
}

/// Convert an [`OccurrenceType`] to its stored string.
const fn type_to_db(occurrence_type: OccurrenceType) -> &'static str {
    match occurrence_type {
        OccurrenceType::Risk => "RISK",
        OccurrenceType::Flooding => "FLOODING",
        OccurrenceType::Traffic => "TRAFFIC",
        OccurrenceType::Fire => "FIRE",
        OccurrenceType::FallenTree => "FALLEN_TREE",
        OccurrenceType::Accident => "ACCIDENT",
        OccurrenceType::Rescue => "RESCUE",
        OccurrenceType::Leak => "LEAK",
        OccurrenceType::Other => "OTHER",
    }
}

/// Parse a stored occurrence-type string.
fn type_from_db(value: &str) -> Result<OccurrenceType, DbError> {
    match value {
        "RISK" => Ok(OccurrenceType::Risk),
        "FLOODING" => Ok(OccurrenceType::Flooding),
        "TRAFFIC" => Ok(OccurrenceType::Traffic),
        "FIRE" => Ok(OccurrenceType::Fire),
        "FALLEN_TREE" => Ok(OccurrenceType::FallenTree),
        "ACCIDENT" => Ok(OccurrenceType::Accident),
        "RESCUE" => Ok(OccurrenceType::Rescue),
        "LEAK" => Ok(OccurrenceType::Leak),
        "OTHER" => Ok(OccurrenceType::Other),
        other => Err(DbError::Decode(format!(
            "unknown occurrence type {other:?}"
        ))),
    }
}

/// Convert a [`Priority`] to its stored string.
const fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "LOW",
        Priority::Medium => "MEDIUM",
        Priority::High => "HIGH",
        Priority::Critical => "CRITICAL",
    }
}

/// Parse a stored priority string.
fn priority_from_db(value: &str) -> Result<Priority, DbError> {
    match value {
        "LOW" => Ok(Priority::Low),
        "MEDIUM" => Ok(Priority::Medium),
        "HIGH" => Ok(Priority::High),
        "CRITICAL" => Ok(Priority::Critical),
        other => Err(DbError::Decode(format!("unknown priority {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            OccurrenceStatus::New,
            OccurrenceStatus::UnderReview,
            OccurrenceStatus::InProgress,
            OccurrenceStatus::Completed,
            OccurrenceStatus::Cancelled,
        ] {
            assert_eq!(status_from_db(status_to_db(status)).unwrap(), status);
        }
    }

    #[test]
    fn type_codes_round_trip() {
        for occurrence_type in [
            OccurrenceType::Risk,
            OccurrenceType::Flooding,
            OccurrenceType::Traffic,
            OccurrenceType::Fire,
            OccurrenceType::FallenTree,
            OccurrenceType::Accident,
            OccurrenceType::Rescue,
            OccurrenceType::Leak,
            OccurrenceType::Other,
        ] {
            assert_eq!(type_from_db(type_to_db(occurrence_type)).unwrap(), occurrence_type);
        }
    }

    #[test]
    fn unknown_stored_value_is_decode_error() {
        assert!(matches!(status_from_db("ARCHIVED"), Err(DbError::Decode(_))));
        assert!(matches!(priority_from_db("URGENT"), Err(DbError::Decode(_))));
    }

    #[test]
    fn stored_strings_match_wire_format() {
        // The dashboard sends the same SCREAMING_SNAKE_CASE values that the
        // database stores; keep them in lockstep with the serde renames.
        let json = serde_json::to_string(&OccurrenceType::FallenTree).unwrap();
        assert_eq!(json.trim_matches('"'), type_to_db(OccurrenceType::FallenTree));

        let json = serde_json::to_string(&OccurrenceStatus::UnderReview).unwrap();
        assert_eq!(
            json.trim_matches('"'),
            status_to_db(OccurrenceStatus::UnderReview)
        );
    }
}
