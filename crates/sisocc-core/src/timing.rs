//! Derived response/resolution timing rules.
//!
//! Both timestamps are one-shot: once `responded_at` or `completed_at` is
//! set on the occurrence, later transitions into the same status leave it
//! untouched. Derivation works purely on the pre-update snapshot so the
//! decision is made before any row is written.

use chrono::{DateTime, Utc};
use sisocc_types::{Occurrence, OccurrenceStatus};

/// Timing fields derived from one status change.
///
/// `None` means "leave the column unchanged"; the data layer merges these
/// into the update payload via `COALESCE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedTiming {
    /// First-response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Whole minutes between report and first response.
    pub response_minutes: Option<i64>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Compute timing fields for a transition of `previous` into `new_status`.
///
/// - Into `IN_PROGRESS` with no response timestamp yet: records `now` and
///   the response latency in whole minutes since the occurrence was
///   reported.
/// - Into `COMPLETED` with no completion timestamp yet: records `now`.
/// - Anything else: no changes.
pub fn derive(
    previous: &Occurrence,
    new_status: OccurrenceStatus,
    now: DateTime<Utc>,
) -> DerivedTiming {
    let mut timing = DerivedTiming::default();

    match new_status {
        OccurrenceStatus::InProgress if previous.responded_at.is_none() => {
            timing.responded_at = Some(now);
            timing.response_minutes = Some((now - previous.occurred_at).num_minutes());
        }
        OccurrenceStatus::Completed if previous.completed_at.is_none() => {
            timing.completed_at = Some(now);
        }
        _ => {}
    }

    timing
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sisocc_types::{OccurrenceId, OccurrenceType, Priority, UserId};

    use super::*;

    fn occurrence(status: OccurrenceStatus, occurred_at: DateTime<Utc>) -> Occurrence {
        Occurrence {
            id: OccurrenceId::new(),
            occurrence_type: OccurrenceType::Flooding,
            place: String::from("Rua X"),
            address: String::from("Rua X, Recife"),
            latitude: -8.05,
            longitude: -34.9,
            status,
            priority: Priority::Medium,
            description: None,
            photos: Vec::new(),
            created_by: UserId::new(),
            assignee: None,
            occurred_at,
            responded_at: None,
            completed_at: None,
            response_minutes: None,
            version: 0,
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }

    #[test]
    fn first_in_progress_sets_response_fields() {
        let occurred_at = Utc::now() - Duration::minutes(125);
        let previous = occurrence(OccurrenceStatus::New, occurred_at);
        let now = occurred_at + Duration::minutes(125);

        let timing = derive(&previous, OccurrenceStatus::InProgress, now);

        assert_eq!(timing.responded_at, Some(now));
        assert_eq!(timing.response_minutes, Some(125));
        assert_eq!(timing.completed_at, None);
    }

    #[test]
    fn latency_is_floored_to_whole_minutes() {
        let occurred_at = Utc::now();
        let previous = occurrence(OccurrenceStatus::New, occurred_at);
        let now = occurred_at + Duration::seconds(125 * 60 + 59);

        let timing = derive(&previous, OccurrenceStatus::InProgress, now);
        assert_eq!(timing.response_minutes, Some(125));
    }

    #[test]
    fn repeated_in_progress_never_recomputes() {
        let occurred_at = Utc::now() - Duration::hours(3);
        let mut previous = occurrence(OccurrenceStatus::UnderReview, occurred_at);
        previous.responded_at = Some(occurred_at + Duration::minutes(10));
        previous.response_minutes = Some(10);

        let timing = derive(&previous, OccurrenceStatus::InProgress, Utc::now());
        assert_eq!(timing, DerivedTiming::default());
    }

    #[test]
    fn first_completed_sets_completion_only() {
        let occurred_at = Utc::now() - Duration::hours(2);
        let mut previous = occurrence(OccurrenceStatus::InProgress, occurred_at);
        previous.responded_at = Some(occurred_at + Duration::minutes(30));
        previous.response_minutes = Some(30);

        let now = Utc::now();
        let timing = derive(&previous, OccurrenceStatus::Completed, now);

        assert_eq!(timing.completed_at, Some(now));
        assert_eq!(timing.responded_at, None);
        assert_eq!(timing.response_minutes, None);
    }

    #[test]
    fn completed_is_one_shot() {
        let occurred_at = Utc::now() - Duration::hours(4);
        let mut previous = occurrence(OccurrenceStatus::Cancelled, occurred_at);
        previous.completed_at = Some(occurred_at + Duration::hours(1));

        let timing = derive(&previous, OccurrenceStatus::Completed, Utc::now());
        assert_eq!(timing, DerivedTiming::default());
    }

    #[test]
    fn other_transitions_touch_nothing() {
        let previous = occurrence(OccurrenceStatus::New, Utc::now());
        for status in [
            OccurrenceStatus::New,
            OccurrenceStatus::UnderReview,
            OccurrenceStatus::Cancelled,
        ] {
            let timing = derive(&previous, status, Utc::now());
            assert_eq!(timing, DerivedTiming::default());
        }
    }
}
