//! Live event payloads pushed to monitoring clients.
//!
//! Every successful create or update publishes one [`OccurrenceEvent`] on
//! the process-wide broadcast channel. Delivery is best-effort: there is no
//! acknowledgement, no queue for disconnected observers, and no replay.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::Occurrence;

/// What happened to the occurrence carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OccurrenceEventKind {
    /// A new occurrence was persisted.
    #[serde(rename = "occurrence.created")]
    Created,
    /// An existing occurrence was modified.
    #[serde(rename = "occurrence.updated")]
    Updated,
}

/// A lifecycle event broadcast to all connected observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OccurrenceEvent {
    /// The event name.
    pub event: OccurrenceEventKind,
    /// Full occurrence payload after the write.
    pub occurrence: Occurrence,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn event_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&OccurrenceEventKind::Created).unwrap(),
            "\"occurrence.created\""
        );
        assert_eq!(
            serde_json::to_string(&OccurrenceEventKind::Updated).unwrap(),
            "\"occurrence.updated\""
        );
    }
}
