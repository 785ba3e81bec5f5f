//! Shared data model for the pool-discovery and risk-alerting pipeline.
//!
//! Types here cross component boundaries (C2 -> C4 -> C5 -> C6 -> C7 -> C8,
//! with C9/C10 feeding back through persistence). Anything that is exclusively
//! owned and mutated by a single component (cooldown entries, client stats,
//! queue internals) lives in that component's own crate instead.

mod address;
mod alert;
mod facts;
mod outcome;
mod pool;
mod risk;
mod tracked_token;
mod wallet;

pub mod error;

pub use address::{Address, AddressError};
pub use alert::{Alert, AlertCategory, AlertPriority};
pub use facts::{
    Contract, EnrichmentFacts, Holders, HoldersError, Liquidity, Percent, RugcheckScore, Social,
    WHALE_THRESHOLD_PERCENT,
};
pub use outcome::{OutcomeKind, TokenOutcome};
pub use pool::{PoolEvent, PoolEventError, PoolSource};
pub use risk::{RiskFactor, RiskLevel, RiskVerdict};
pub use tracked_token::TrackedToken;
pub use wallet::{WalletActivity, WalletActivityKind};
