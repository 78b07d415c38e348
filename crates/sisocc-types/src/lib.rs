//! Shared type definitions for the SISOCC occurrence service.
//!
//! This crate is the single source of truth for all types used across the
//! workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the operations dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (occurrence type, status, priority)
//! - [`structs`] -- Core entity structs (occurrence, history entry, user ref)
//! - [`changes`] -- Creation input, partial-update, and list-filter types
//! - [`events`] -- Live event payloads for the broadcast feed

pub mod changes;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use changes::{NewOccurrence, OccurrenceChanges, OccurrenceFilter};
pub use enums::{AuditAction, OccurrenceStatus, OccurrenceType, Priority};
pub use events::{OccurrenceEvent, OccurrenceEventKind};
pub use ids::{AuditEntryId, HistoryEntryId, OccurrenceId, UserId};
pub use structs::{
    BucketCount, Coordinates, Occurrence, OccurrenceDetail, OccurrenceHistoryEntry,
    OccurrenceStats, StatusCounts, UserRef,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::OccurrenceId::export_all();
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::HistoryEntryId::export_all();
        let _ = crate::ids::AuditEntryId::export_all();

        // Enums
        let _ = crate::enums::OccurrenceType::export_all();
        let _ = crate::enums::OccurrenceStatus::export_all();
        let _ = crate::enums::Priority::export_all();
        let _ = crate::enums::AuditAction::export_all();

        // Structs
        let _ = crate::structs::Coordinates::export_all();
        let _ = crate::structs::Occurrence::export_all();
        let _ = crate::structs::OccurrenceHistoryEntry::export_all();
        let _ = crate::structs::UserRef::export_all();
        let _ = crate::structs::OccurrenceDetail::export_all();
        let _ = crate::structs::StatusCounts::export_all();
        let _ = crate::structs::BucketCount::export_all();
        let _ = crate::structs::OccurrenceStats::export_all();

        // Changes
        let _ = crate::changes::NewOccurrence::export_all();
        let _ = crate::changes::OccurrenceChanges::export_all();
        let _ = crate::changes::OccurrenceFilter::export_all();

        // Events
        let _ = crate::events::OccurrenceEventKind::export_all();
        let _ = crate::events::OccurrenceEvent::export_all();
    }
}
