//! Occurrence lifecycle engine.
//!
//! Pure decision rules (status history, derived timing) live in their own
//! modules so they can be tested without a database; [`OccurrenceLifecycle`]
//! wires them to persistence, geocoding, and the live feed.

pub mod error;
pub mod history;
pub mod lifecycle;
pub mod live;
pub mod timing;

pub use error::LifecycleError;
pub use lifecycle::OccurrenceLifecycle;
pub use live::LiveFeed;
pub use timing::DerivedTiming;
