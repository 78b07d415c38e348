//! Process-wide live feed of occurrence events.
//!
//! One [`tokio::sync::broadcast`] channel is created at service startup
//! and cloned into every emitter (the lifecycle engine) and subscriber
//! (the `WebSocket` layer). Delivery is best-effort: publishing with zero
//! connected observers is normal, publishing never blocks, and nothing on
//! this path can fail the write that triggered it.

use sisocc_types::{Occurrence, OccurrenceEvent, OccurrenceEventKind};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel.
///
/// A subscriber that falls behind by more than this many events receives
/// a lag notice and resumes from the newest event.
const BROADCAST_CAPACITY: usize = 256;

/// Cloneable handle to the process-wide occurrence event channel.
#[derive(Debug, Clone)]
pub struct LiveFeed {
    tx: broadcast::Sender<OccurrenceEvent>,
}

impl LiveFeed {
    /// Create a feed with the default capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe to the feed.
    pub fn subscribe(&self) -> broadcast::Receiver<OccurrenceEvent> {
        self.tx.subscribe()
    }

    /// Publish one lifecycle event to all connected observers.
    ///
    /// Returns the number of observers that received it. Zero observers
    /// is not an error; `send` only fails when there are no receivers,
    /// which is the idle state of the feed.
    pub fn publish(&self, kind: OccurrenceEventKind, occurrence: &Occurrence) -> usize {
        let event = OccurrenceEvent {
            event: kind,
            occurrence: occurrence.clone(),
        };
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;
    use sisocc_types::{OccurrenceId, OccurrenceStatus, OccurrenceType, Priority, UserId};

    use super::*;

    fn sample_occurrence() -> Occurrence {
        let now = Utc::now();
        Occurrence {
            id: OccurrenceId::new(),
            occurrence_type: OccurrenceType::Fire,
            place: String::from("Mercado"),
            address: String::from("Av. Central, 10"),
            latitude: -8.05,
            longitude: -34.9,
            status: OccurrenceStatus::New,
            priority: Priority::High,
            description: None,
            photos: Vec::new(),
            created_by: UserId::new(),
            assignee: None,
            occurred_at: now,
            responded_at: None,
            completed_at: None,
            response_minutes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn publish_with_no_observers_is_not_an_error() {
        let feed = LiveFeed::new();
        let delivered = feed.publish(OccurrenceEventKind::Created, &sample_occurrence());
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn observers_receive_published_events() {
        let feed = LiveFeed::new();
        let mut rx = feed.subscribe();

        let occurrence = sample_occurrence();
        let delivered = feed.publish(OccurrenceEventKind::Updated, &occurrence);
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, OccurrenceEventKind::Updated);
        assert_eq!(event.occurrence.id, occurrence.id);
    }

    #[tokio::test]
    async fn clones_share_the_same_channel() {
        let feed = LiveFeed::new();
        let emitter = feed.clone();
        let mut rx = feed.subscribe();

        emitter.publish(OccurrenceEventKind::Created, &sample_occurrence());
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, OccurrenceEventKind::Created);
    }
}
