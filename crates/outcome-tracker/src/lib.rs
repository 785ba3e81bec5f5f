//! Post-discovery outcome tracking (C9, §4.9): periodically polls tracked
//! tokens' market data and classifies each into `{rug, pump, stable,
//! slow_decline, unknown}` once its monitoring window elapses.

mod classify;
mod tracker;

pub use classify::classify_outcome;
pub use tracker::{OutcomeTracker, OutcomeTrackerConfig, TrackError, TrackerStats};
