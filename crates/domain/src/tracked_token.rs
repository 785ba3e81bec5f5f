use crate::Address;
use chrono::{DateTime, Utc};

/// A token under post-discovery observation by the outcome tracker (C9).
///
/// Created on first successful enrichment, mutated only by C9's poller, and
/// destroyed (by the owning tracker) once classified into a [`crate::TokenOutcome`]
/// or once its monitoring window expires (§3).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackedToken {
    pub mint: Address,
    pub symbol: String,

    pub initial_price: f64,
    pub initial_liquidity: f64,
    pub initial_holders: u64,
    pub initial_risk_score: u8,

    pub peak_price: f64,
    pub peak_liquidity: f64,
    pub peak_holders: u64,
    pub peak_at: DateTime<Utc>,

    pub current_price: f64,
    pub current_liquidity: f64,
    pub current_holders: u64,

    pub discovered_at: DateTime<Utc>,
    pub update_count: u64,
}

impl TrackedToken {
    pub fn new(
        mint: Address,
        symbol: String,
        initial_price: f64,
        initial_liquidity: f64,
        initial_holders: u64,
        initial_risk_score: u8,
        discovered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mint,
            symbol,
            initial_price,
            initial_liquidity,
            initial_holders,
            initial_risk_score,
            peak_price: initial_price,
            peak_liquidity: initial_liquidity,
            peak_holders: initial_holders,
            peak_at: discovered_at,
            current_price: initial_price,
            current_liquidity: initial_liquidity,
            current_holders: initial_holders,
            discovered_at,
            update_count: 0,
        }
    }

    /// Applies a fresh market observation, extending the peaks if exceeded.
    pub fn observe(
        &mut self,
        price: f64,
        liquidity: f64,
        holders: u64,
        observed_at: DateTime<Utc>,
    ) {
        self.current_price = price;
        self.current_liquidity = liquidity;
        self.current_holders = holders;
        self.update_count += 1;

        let mut peaked = false;
        if price > self.peak_price {
            self.peak_price = price;
            peaked = true;
        }
        if liquidity > self.peak_liquidity {
            self.peak_liquidity = liquidity;
            peaked = true;
        }
        if holders > self.peak_holders {
            self.peak_holders = holders;
        }
        if peaked {
            self.peak_at = observed_at;
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.discovered_at
    }

    pub fn peak_multiplier(&self) -> f64 {
        if self.initial_price <= 0.0 {
            0.0
        } else {
            self.peak_price / self.initial_price
        }
    }
}
