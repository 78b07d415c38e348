//! Shared application state for the occurrence API server.

use sisocc_core::{LiveFeed, OccurrenceLifecycle};
use sisocc_geocode::Geocoder;
use sqlx::PgPool;

use crate::config::UploadSection;

/// State shared by every handler.
///
/// Wrapped in an `Arc` by the router; everything inside is either a
/// cheap handle (pool, broadcast sender) or immutable configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool for direct store reads.
    pub pool: PgPool,
    /// The write-path orchestrator.
    pub lifecycle: OccurrenceLifecycle,
    /// Photo upload limits and destination.
    pub uploads: UploadSection,
}

impl AppState {
    /// Assemble the state from its parts.
    ///
    /// One [`LiveFeed`] is created here and shared between the lifecycle
    /// (publisher) and the `WebSocket` handlers (subscribers).
    pub fn new(pool: PgPool, geocoder: Geocoder, uploads: UploadSection) -> Self {
        let feed = LiveFeed::new();
        let lifecycle = OccurrenceLifecycle::new(pool.clone(), geocoder, feed);
        Self {
            pool,
            lifecycle,
            uploads,
        }
    }

    /// Subscribe to the live occurrence event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<sisocc_types::OccurrenceEvent> {
        self.lifecycle.feed().subscribe()
    }
}
