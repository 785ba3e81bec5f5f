//! Concrete [`ports::AggregatorPort`] adapter against a Dexscreener-shaped
//! DEX-data REST API, built on the shared GET-only resilient client (§6).

mod client;
mod dexscreener;

pub use client::{default_client, AggregatorClient};
