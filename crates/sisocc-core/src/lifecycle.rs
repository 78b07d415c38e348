//! Occurrence lifecycle orchestration.
//!
//! [`OccurrenceLifecycle`] is the single entry point for every write to an
//! occurrence. Creation resolves coordinates, persists the row, and emits
//! a live event; updates derive the history entry and timing fields from
//! the pre-update snapshot, apply everything in one version-guarded
//! transaction, and emit a live event on success. The live feed is
//! best-effort and can never fail either path.

use std::collections::HashMap;

use chrono::Utc;
use sisocc_db::{OccurrenceStore, OccurrenceUpdate, UserStore};
use sisocc_geocode::Geocoder;
use sisocc_types::{
    NewOccurrence, Occurrence, OccurrenceChanges, OccurrenceDetail, OccurrenceEventKind,
    OccurrenceId, UserId, UserRef,
};
use sqlx::PgPool;

use crate::error::LifecycleError;
use crate::live::LiveFeed;
use crate::{history, timing};

/// Orchestrates occurrence creation and mutation.
#[derive(Debug, Clone)]
pub struct OccurrenceLifecycle {
    pool: PgPool,
    geocoder: Geocoder,
    feed: LiveFeed,
}

impl OccurrenceLifecycle {
    /// Build the lifecycle engine over a pool, a geocoder, and the feed.
    pub fn new(pool: PgPool, geocoder: Geocoder, feed: LiveFeed) -> Self {
        Self {
            pool,
            geocoder,
            feed,
        }
    }

    /// Handle to the live feed, for subscribing observers.
    pub const fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    /// Create a new occurrence.
    ///
    /// Reporter-supplied coordinates are trusted as-is; otherwise the
    /// address is resolved through the geocoder, whose configured policy
    /// decides whether a miss is an error or the reference point.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Geocode`] when resolution fails under the
    /// strict policy, or [`LifecycleError::Db`] on persistence failure.
    pub async fn create(
        &self,
        input: NewOccurrence,
    ) -> Result<OccurrenceDetail, LifecycleError> {
        let coordinates = match input.supplied_coordinates() {
            Some(coordinates) => coordinates,
            None => self.geocoder.resolve(&input.address).await?,
        };

        let now = Utc::now();
        let occurrence = Occurrence {
            id: OccurrenceId::new(),
            occurrence_type: input.occurrence_type,
            place: input.place,
            address: input.address,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            description: input.description,
            photos: input.photos,
            created_by: input.created_by,
            assignee: input.assignee,
            occurred_at: now,
            responded_at: None,
            completed_at: None,
            response_minutes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        OccurrenceStore::new(&self.pool).insert(&occurrence).await?;
        tracing::info!(id = %occurrence.id, status = ?occurrence.status, "occurrence created");

        self.feed
            .publish(OccurrenceEventKind::Created, &occurrence);
        self.enrich(occurrence).await
    }

    /// Apply a partial update on behalf of `acting_user`.
    ///
    /// When the change set includes a status differing from the current
    /// one, a history entry is recorded in the same transaction and the
    /// one-shot timing fields are derived from the pre-update snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when no occurrence exists for
    /// `id`, [`LifecycleError::Conflict`] when a concurrent update won the
    /// version race, or [`LifecycleError::Db`] on persistence failure.
    pub async fn update(
        &self,
        id: OccurrenceId,
        changes: OccurrenceChanges,
        acting_user: UserId,
    ) -> Result<OccurrenceDetail, LifecycleError> {
        let store = OccurrenceStore::new(&self.pool);

        let current = store
            .fetch(id.into_inner())
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("occurrence {id}")))?;

        let now = Utc::now();
        let entry = changes.status.and_then(|proposed| {
            history::transition_entry(
                id,
                current.status,
                proposed,
                changes.note.as_deref(),
                acting_user,
                now,
            )
        });

        // Timing only moves on an actual status transition.
        let derived = match &entry {
            Some(entry) => timing::derive(&current, entry.new_status, now),
            None => timing::DerivedTiming::default(),
        };

        let update = OccurrenceUpdate {
            status: changes.status,
            priority: changes.priority,
            description: changes.description,
            assignee: changes.assignee.map(UserId::into_inner),
            responded_at: derived.responded_at,
            response_minutes: derived.response_minutes,
            completed_at: derived.completed_at,
            updated_at: now,
        };

        let updated = store
            .apply_update(id.into_inner(), current.version, &update, entry.as_ref())
            .await?
            .ok_or_else(|| {
                LifecycleError::Conflict(format!(
                    "occurrence {id} was modified concurrently (expected version {})",
                    current.version
                ))
            })?;

        tracing::info!(
            %id,
            status = ?updated.status,
            version = updated.version,
            "occurrence updated"
        );

        self.feed.publish(OccurrenceEventKind::Updated, &updated);
        self.enrich(updated).await
    }

    /// Attach the display records of the reporter and the assignee.
    ///
    /// A user missing from the display table leaves the slot empty rather
    /// than failing the request.
    pub async fn enrich(
        &self,
        occurrence: Occurrence,
    ) -> Result<OccurrenceDetail, LifecycleError> {
        let users = UserStore::new(&self.pool);

        let created_by_user = users.fetch_ref(occurrence.created_by).await?;
        let assignee_user = match occurrence.assignee {
            Some(assignee) => users.fetch_ref(assignee).await?,
            None => None,
        };

        Ok(OccurrenceDetail {
            occurrence,
            created_by_user,
            assignee_user,
        })
    }

    /// Attach user display records to a whole page of occurrences.
    ///
    /// All distinct reporter and assignee ids are fetched in a single
    /// query, so listing cost does not grow with the page size.
    pub async fn enrich_all(
        &self,
        occurrences: Vec<Occurrence>,
    ) -> Result<Vec<OccurrenceDetail>, LifecycleError> {
        let mut ids: Vec<UserId> = Vec::new();
        for occurrence in &occurrences {
            if !ids.contains(&occurrence.created_by) {
                ids.push(occurrence.created_by);
            }
            if let Some(assignee) = occurrence.assignee {
                if !ids.contains(&assignee) {
                    ids.push(assignee);
                }
            }
        }

        let refs = UserStore::new(&self.pool).fetch_refs(&ids).await?;
        let by_id: HashMap<UserId, UserRef> =
            refs.into_iter().map(|user| (user.id, user)).collect();

        Ok(occurrences
            .into_iter()
            .map(|occurrence| OccurrenceDetail {
                created_by_user: by_id.get(&occurrence.created_by).cloned(),
                assignee_user: occurrence
                    .assignee
                    .and_then(|assignee| by_id.get(&assignee).cloned()),
                occurrence,
            })
            .collect())
    }
}
