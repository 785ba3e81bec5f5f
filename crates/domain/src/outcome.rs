use crate::Address;
use chrono::{DateTime, Utc};

/// The terminal classification of a tracked token (§3, §4.9).
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Rug,
    Pump,
    Stable,
    SlowDecline,
    Unknown,
}

/// An immutable record of how a tracked token's price trajectory resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TokenOutcome {
    pub mint: Address,
    pub kind: OutcomeKind,
    pub confidence: f64,
    pub peak_multiplier: f64,
    pub time_to_peak_sec: i64,
    pub time_to_outcome_sec: i64,

    pub initial_price: f64,
    pub initial_liquidity: f64,
    pub peak_price: f64,
    pub peak_liquidity: f64,
    pub final_price: f64,
    pub final_liquidity: f64,

    pub classified_at: DateTime<Utc>,
}
