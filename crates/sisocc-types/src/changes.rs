//! Inbound change descriptions: creation input, partial updates, list filters.
//!
//! The update payload is a closed set of typed fields rather than an open
//! key/value bag, so nothing outside the mutable surface of an occurrence
//! can reach persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{OccurrenceStatus, OccurrenceType, Priority};
use crate::ids::UserId;
use crate::structs::Coordinates;

/// Input for creating a new occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewOccurrence {
    /// Incident category.
    pub occurrence_type: OccurrenceType,
    /// Short place label.
    pub place: String,
    /// Full address text; used for geocoding when coordinates are missing.
    pub address: String,
    /// Reporter-supplied latitude, if any.
    pub latitude: Option<f64>,
    /// Reporter-supplied longitude, if any.
    pub longitude: Option<f64>,
    /// Initial status; defaults to `NEW` when unset.
    pub status: Option<OccurrenceStatus>,
    /// Dispatch priority; defaults to `MEDIUM` when unset.
    pub priority: Option<Priority>,
    /// Free-text description.
    pub description: Option<String>,
    /// The reporting user.
    pub created_by: UserId,
    /// Initially assigned user, if any.
    pub assignee: Option<UserId>,
    /// Stored filenames of accepted photo attachments.
    pub photos: Vec<String>,
}

impl NewOccurrence {
    /// The supplied coordinate pair, when complete.
    ///
    /// A pair with only one component is treated the same as no pair at
    /// all: the address goes through the geocoding resolver.
    pub fn supplied_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// A partial update to an occurrence.
///
/// Only the mutable fields are enumerated; `None` means "leave unchanged".
/// `note` is not a field of the occurrence itself: it becomes the free-text
/// note of the history entry when the update changes the status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceChanges {
    /// New lifecycle status.
    #[serde(default)]
    pub status: Option<OccurrenceStatus>,
    /// New dispatch priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Newly assigned user.
    #[serde(default)]
    pub assignee: Option<UserId>,
    /// Note attached to the history entry of a status change.
    #[serde(default)]
    pub note: Option<String>,
}

impl OccurrenceChanges {
    /// Whether the change set is empty.
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.note.is_none()
    }
}

/// Filter and pagination parameters for listing occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceFilter {
    /// Only occurrences in this status.
    #[serde(default)]
    pub status: Option<OccurrenceStatus>,
    /// Only occurrences of this type.
    #[serde(default)]
    pub occurrence_type: Option<OccurrenceType>,
    /// Only occurrences with this priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Only occurrences reported at or after this instant.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Only occurrences reported at or before this instant.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    /// 1-based page number; defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; defaults to 50.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl OccurrenceFilter {
    /// Default page size for listings.
    pub const DEFAULT_LIMIT: u32 = 50;

    /// The effective 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// The effective page size.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).max(1)
    }

    /// The row offset implied by page and limit.
    pub fn offset(&self) -> u32 {
        self.page().saturating_sub(1).saturating_mul(self.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::OccurrenceType;

    fn base_input() -> NewOccurrence {
        NewOccurrence {
            occurrence_type: OccurrenceType::Flooding,
            place: String::from("Rua X"),
            address: String::from("Rua X, Recife"),
            latitude: None,
            longitude: None,
            status: None,
            priority: None,
            description: None,
            created_by: UserId::new(),
            assignee: None,
            photos: Vec::new(),
        }
    }

    #[test]
    fn complete_pair_is_returned() {
        let mut input = base_input();
        input.latitude = Some(-8.05);
        input.longitude = Some(-34.9);
        let coords = input.supplied_coordinates();
        assert_eq!(
            coords,
            Some(Coordinates {
                latitude: -8.05,
                longitude: -34.9,
            })
        );
    }

    #[test]
    fn incomplete_pair_counts_as_missing() {
        let mut input = base_input();
        input.latitude = Some(-8.05);
        assert_eq!(input.supplied_coordinates(), None);

        input.latitude = None;
        input.longitude = Some(-34.9);
        assert_eq!(input.supplied_coordinates(), None);
    }

    #[test]
    fn empty_change_set() {
        assert!(OccurrenceChanges::default().is_empty());
        let changes = OccurrenceChanges {
            priority: Some(Priority::High),
            ..OccurrenceChanges::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn filter_pagination_defaults() {
        let filter = OccurrenceFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 50);
        assert_eq!(filter.offset(), 0);

        let filter = OccurrenceFilter {
            page: Some(3),
            limit: Some(20),
            ..OccurrenceFilter::default()
        };
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn zero_page_is_clamped() {
        let filter = OccurrenceFilter {
            page: Some(0),
            ..OccurrenceFilter::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.offset(), 0);
    }
}
