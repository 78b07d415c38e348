//! User display-record lookups.
//!
//! User accounts are owned by the authentication service; this table holds
//! only the display slice (name, email, role) for enriching occurrence
//! responses. Sync of that slice happens out of band.

use sisocc_types::{UserId, UserRef};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the display record of one user, when it exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_ref(&self, id: UserId) -> Result<Option<UserRef>, DbError> {
        let row: Option<(String, Option<String>, Option<String>)> =
            sqlx::query_as("SELECT name, email, role FROM users WHERE id = $1")
                .bind(id.into_inner())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(name, email, role)| UserRef {
            id,
            name,
            email,
            role,
        }))
    }

    /// Fetch the display records of several users in one query.
    ///
    /// Ids without a matching row are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_refs(&self, ids: &[UserId]) -> Result<Vec<UserRef>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<Uuid> = ids.iter().copied().map(UserId::into_inner).collect();
        let rows: Vec<(Uuid, String, Option<String>, Option<String>)> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = ANY($1)")
                .bind(&raw)
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, role)| UserRef {
                id: id.into(),
                name,
                email,
                role,
            })
            .collect())
    }

    /// Insert or refresh one display record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_ref(&self, user: &UserRef) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO users (id, name, email, role)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (id) DO UPDATE
              SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role",
        )
        .bind(user.id.into_inner())
        .bind(&user.name)
        .bind(user.email.as_deref())
        .bind(user.role.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
