//! Enumeration types for the occurrence service.
//!
//! Wire values use `SCREAMING_SNAKE_CASE` to match what the dashboard and
//! the mobile reporting clients already send (`FALLEN_TREE`, `IN_PROGRESS`,
//! ...). Database storage uses the same strings; the mapping lives in
//! `sisocc-db`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The category of a reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum OccurrenceType {
    /// Generic hazard (structural risk, landslide risk, ...).
    Risk,
    /// Street or property flooding.
    Flooding,
    /// Traffic incident or blockage.
    Traffic,
    /// Fire.
    Fire,
    /// Fallen tree blocking a road or damaging property.
    FallenTree,
    /// Vehicle or workplace accident.
    Accident,
    /// Rescue operation (people or animals).
    Rescue,
    /// Water, gas, or sewage leak.
    Leak,
    /// Anything that does not fit the categories above.
    Other,
}

/// Lifecycle status of an occurrence.
///
/// Transitions between statuses are recorded as immutable history entries;
/// there is no restriction on which status may follow which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum OccurrenceStatus {
    /// Just reported, not yet triaged.
    New,
    /// Being triaged by the operations desk.
    UnderReview,
    /// A field team is responding.
    InProgress,
    /// Resolved.
    Completed,
    /// Closed without action.
    Cancelled,
}

impl Default for OccurrenceStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Dispatch priority of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Can wait for a regular work shift.
    Low,
    /// Default priority for new reports.
    Medium,
    /// Should be handled ahead of the queue.
    High,
    /// Immediate dispatch.
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// The action recorded by an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum AuditAction {
    /// An entity was created.
    Create,
    /// An entity was modified.
    Update,
    /// An entity was deleted.
    Delete,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn occurrence_type_wire_format() {
        let json = serde_json::to_string(&OccurrenceType::FallenTree).unwrap();
        assert_eq!(json, "\"FALLEN_TREE\"");
        let back: OccurrenceType = serde_json::from_str("\"FALLEN_TREE\"").unwrap();
        assert_eq!(back, OccurrenceType::FallenTree);
    }

    #[test]
    fn status_wire_format() {
        let json = serde_json::to_string(&OccurrenceStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: OccurrenceStatus = serde_json::from_str("\"UNDER_REVIEW\"").unwrap();
        assert_eq!(back, OccurrenceStatus::UnderReview);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result: Result<OccurrenceStatus, _> = serde_json::from_str("\"ARCHIVED\"");
        assert!(result.is_err());
    }

    #[test]
    fn defaults_match_creation_rules() {
        assert_eq!(OccurrenceStatus::default(), OccurrenceStatus::New);
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
