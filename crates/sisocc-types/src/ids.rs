//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the service has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) for efficient database indexing.
//!
//! The `new()` constructors generate IDs app-side so an occurrence ID is
//! known before the row is inserted (needed for history entries and the
//! live feed payload).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a reported occurrence.
    OccurrenceId
}

define_id! {
    /// Unique identifier for an operations desk user.
    UserId
}

define_id! {
    /// Unique identifier for a status-transition history entry.
    HistoryEntryId
}

define_id! {
    /// Unique identifier for an audit log entry.
    AuditEntryId
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn ids_are_distinct() {
        let a = OccurrenceId::new();
        let b = OccurrenceId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_plain_uuid() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        let raw = serde_json::to_string(&id.into_inner()).unwrap();
        assert_eq!(json, raw);
    }

    #[test]
    fn id_round_trips_through_uuid() {
        let id = OccurrenceId::new();
        let uuid: Uuid = id.into();
        assert_eq!(OccurrenceId::from(uuid), id);
    }
}
