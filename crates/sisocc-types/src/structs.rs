//! Core entity structs for the occurrence service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{OccurrenceStatus, OccurrenceType, Priority};
use crate::ids::{HistoryEntryId, OccurrenceId, UserId};

/// A latitude/longitude pair in decimal degrees (WGS 84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinates {
    /// Latitude in [-90, 90].
    pub latitude: f64,
    /// Longitude in [-180, 180].
    pub longitude: f64,
}

impl Coordinates {
    /// Whether both components are inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One reported incident record.
///
/// Coordinates are always present after creation: either supplied by the
/// reporter, resolved from the address, or defaulted to the municipal
/// reference point depending on the configured geocoding policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Occurrence {
    /// Unique identifier.
    pub id: OccurrenceId,
    /// Incident category.
    pub occurrence_type: OccurrenceType,
    /// Short place label ("Praca do Derby", "Ponte da Torre", ...).
    pub place: String,
    /// Full address text as reported.
    pub address: String,
    /// Resolved latitude in decimal degrees.
    pub latitude: f64,
    /// Resolved longitude in decimal degrees.
    pub longitude: f64,
    /// Current lifecycle status.
    pub status: OccurrenceStatus,
    /// Dispatch priority.
    pub priority: Priority,
    /// Free-text description.
    pub description: Option<String>,
    /// Stored filenames of accepted photo attachments.
    pub photos: Vec<String>,
    /// User that reported the occurrence.
    pub created_by: UserId,
    /// User currently assigned to handle it, if any.
    pub assignee: Option<UserId>,
    /// When the incident was reported.
    pub occurred_at: DateTime<Utc>,
    /// When a team first started responding (first transition into
    /// `IN_PROGRESS`); set at most once.
    pub responded_at: Option<DateTime<Utc>>,
    /// When the occurrence was completed (first transition into
    /// `COMPLETED`); set at most once.
    pub completed_at: Option<DateTime<Utc>>,
    /// Whole minutes between `occurred_at` and `responded_at`.
    pub response_minutes: Option<i64>,
    /// Optimistic concurrency counter, incremented on every update.
    pub version: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Occurrence {
    /// The coordinate pair of this occurrence.
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Immutable record of one status transition.
///
/// Never mutated or deleted after creation; displayed newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceHistoryEntry {
    /// Unique identifier.
    pub id: HistoryEntryId,
    /// The occurrence this entry belongs to.
    pub occurrence_id: OccurrenceId,
    /// Status before the transition.
    pub previous_status: OccurrenceStatus,
    /// Status after the transition.
    pub new_status: OccurrenceStatus,
    /// Free-text note; defaults to `"status update"` when none is given.
    pub note: String,
    /// User that performed the change.
    pub changed_by: UserId,
    /// When the transition happened.
    pub created_at: DateTime<Utc>,
}

/// Display projection of a user, used to enrich occurrence responses.
///
/// User accounts themselves (credentials, permissions) are owned by the
/// authentication service; this is the read-only slice the occurrence API
/// surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserRef {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, when known.
    pub email: Option<String>,
    /// Role or job title, when known.
    pub role: Option<String>,
}

/// An occurrence enriched with creator/assignee display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceDetail {
    /// The occurrence record.
    #[serde(flatten)]
    pub occurrence: Occurrence,
    /// Display fields of the reporting user, when the user still exists.
    pub created_by_user: Option<UserRef>,
    /// Display fields of the assigned user, when one is set.
    pub assignee_user: Option<UserRef>,
}

/// Per-status occurrence counts for the stats endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusCounts {
    /// Occurrences in `NEW`.
    pub new: i64,
    /// Occurrences in `UNDER_REVIEW`.
    pub under_review: i64,
    /// Occurrences in `IN_PROGRESS`.
    pub in_progress: i64,
    /// Occurrences in `COMPLETED`.
    pub completed: i64,
    /// Occurrences in `CANCELLED`.
    pub cancelled: i64,
}

/// A single group-by bucket of the stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BucketCount {
    /// The grouped value (an occurrence type or a priority).
    pub value: String,
    /// Number of occurrences in the bucket.
    pub count: i64,
}

/// Aggregated occurrence statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceStats {
    /// Total number of occurrences.
    pub total: i64,
    /// Counts per lifecycle status.
    pub by_status: StatusCounts,
    /// Counts per occurrence type.
    pub by_type: Vec<BucketCount>,
    /// Counts per priority.
    pub by_priority: Vec<BucketCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validation_bounds() {
        let ok = Coordinates {
            latitude: -8.05,
            longitude: -34.9,
        };
        assert!(ok.is_valid());

        let bad_lat = Coordinates {
            latitude: 90.5,
            longitude: 0.0,
        };
        assert!(!bad_lat.is_valid());

        let bad_lng = Coordinates {
            latitude: 0.0,
            longitude: -180.5,
        };
        assert!(!bad_lng.is_valid());
    }

    #[test]
    fn boundary_coordinates_are_valid() {
        let corner = Coordinates {
            latitude: -90.0,
            longitude: 180.0,
        };
        assert!(corner.is_valid());
    }
}
