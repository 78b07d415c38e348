//! Status-transition recording rules.
//!
//! A history entry is built exactly when the proposed status differs from
//! the current one; an unchanged status is a no-op, not an error. The
//! entry is persisted by the data layer inside the same transaction as
//! the status write itself.

use chrono::{DateTime, Utc};
use sisocc_types::{
    HistoryEntryId, OccurrenceHistoryEntry, OccurrenceId, OccurrenceStatus, UserId,
};

/// Note text used when the caller does not supply one.
pub const DEFAULT_NOTE: &str = "status update";

/// Build the history entry for a proposed status change.
///
/// Returns `None` when `proposed` equals `current`: nothing is recorded.
pub fn transition_entry(
    occurrence_id: OccurrenceId,
    current: OccurrenceStatus,
    proposed: OccurrenceStatus,
    note: Option<&str>,
    changed_by: UserId,
    now: DateTime<Utc>,
) -> Option<OccurrenceHistoryEntry> {
    if proposed == current {
        return None;
    }

    Some(OccurrenceHistoryEntry {
        id: HistoryEntryId::new(),
        occurrence_id,
        previous_status: current,
        new_status: proposed,
        note: note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_NOTE)
            .to_string(),
        changed_by,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn differing_status_builds_entry() {
        let occurrence_id = OccurrenceId::new();
        let actor = UserId::new();
        let now = Utc::now();

        let entry = transition_entry(
            occurrence_id,
            OccurrenceStatus::New,
            OccurrenceStatus::InProgress,
            Some("team dispatched"),
            actor,
            now,
        )
        .unwrap();

        assert_eq!(entry.occurrence_id, occurrence_id);
        assert_eq!(entry.previous_status, OccurrenceStatus::New);
        assert_eq!(entry.new_status, OccurrenceStatus::InProgress);
        assert_eq!(entry.note, "team dispatched");
        assert_eq!(entry.changed_by, actor);
        assert_eq!(entry.created_at, now);
    }

    #[test]
    fn unchanged_status_is_a_noop() {
        let entry = transition_entry(
            OccurrenceId::new(),
            OccurrenceStatus::InProgress,
            OccurrenceStatus::InProgress,
            Some("irrelevant"),
            UserId::new(),
            Utc::now(),
        );
        assert!(entry.is_none());
    }

    #[test]
    fn missing_note_gets_default_text() {
        let entry = transition_entry(
            OccurrenceId::new(),
            OccurrenceStatus::New,
            OccurrenceStatus::Cancelled,
            None,
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(entry.note, DEFAULT_NOTE);
    }

    #[test]
    fn blank_note_gets_default_text() {
        let entry = transition_entry(
            OccurrenceId::new(),
            OccurrenceStatus::New,
            OccurrenceStatus::UnderReview,
            Some("   "),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(entry.note, DEFAULT_NOTE);
    }
}
