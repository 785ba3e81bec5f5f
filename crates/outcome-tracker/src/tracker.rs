use crate::classify::classify_outcome;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use domain::{Address, TrackedToken};
use ports::{AggregatorPort, MlSampleRecord, PersistencePort};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Aggregator batch-fetch cap per the §4.9 polling rule ("≤30 per call").
const BATCH_SIZE: usize = 30;

#[derive(Clone, Copy, Debug)]
pub struct OutcomeTrackerConfig {
    pub max_tracked_tokens: usize,
    pub monitoring_interval: Duration,
    pub monitoring_duration: ChronoDuration,
}

impl Default for OutcomeTrackerConfig {
    fn default() -> Self {
        Self {
            max_tracked_tokens: 500,
            monitoring_interval: Duration::from_secs(30 * 60),
            monitoring_duration: ChronoDuration::hours(48),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub tracked: usize,
    pub capacity: usize,
}

#[derive(Debug, Eq, PartialEq)]
pub enum TrackError {
    /// Capacity exceeded even after force-classifying every token past its
    /// monitoring window (§4.9 "Capacity").
    AtCapacity,
}

pub struct OutcomeTracker {
    tokens: Mutex<HashMap<Address, TrackedToken>>,
    config: OutcomeTrackerConfig,
    aggregator: Arc<dyn AggregatorPort>,
    persistence: Arc<dyn PersistencePort>,
}

impl OutcomeTracker {
    pub fn new(
        config: OutcomeTrackerConfig,
        aggregator: Arc<dyn AggregatorPort>,
        persistence: Arc<dyn PersistencePort>,
    ) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            config,
            aggregator,
            persistence,
        }
    }

    pub async fn stats(&self) -> TrackerStats {
        TrackerStats {
            tracked: self.tokens.lock().await.len(),
            capacity: self.config.max_tracked_tokens,
        }
    }

    /// Registers a newly enriched token for post-discovery observation
    /// (§4.9). If at capacity, force-classifies any token already past its
    /// monitoring window first; rejects with [`TrackError::AtCapacity`] if
    /// that still isn't enough room.
    pub async fn track_token(
        &self,
        mint: Address,
        symbol: String,
        initial_price: f64,
        initial_liquidity: f64,
        initial_risk_score: u8,
        initial_holders: u64,
        now: DateTime<Utc>,
    ) -> Result<(), TrackError> {
        {
            let tokens = self.tokens.lock().await;
            if tokens.len() >= self.config.max_tracked_tokens {
                drop(tokens);
                self.force_classify_expired(now).await;
            }
        }

        let mut tokens = self.tokens.lock().await;
        if tokens.len() >= self.config.max_tracked_tokens {
            tracing::warn!(%mint, "outcome tracker at capacity, rejecting new registration");
            return Err(TrackError::AtCapacity);
        }

        tokens.insert(
            mint,
            TrackedToken::new(
                mint,
                symbol,
                initial_price,
                initial_liquidity,
                initial_holders,
                initial_risk_score,
                now,
            ),
        );
        Ok(())
    }

    async fn force_classify_expired(&self, now: DateTime<Utc>) {
        let expired: Vec<Address> = {
            let tokens = self.tokens.lock().await;
            tokens
                .values()
                .filter(|t| t.age(now) >= self.config.monitoring_duration)
                .map(|t| t.mint)
                .collect()
        };
        for mint in expired {
            self.force_classify_inner(mint, now).await;
        }
    }

    /// Classifies and removes `mint` regardless of whether its monitoring
    /// window has elapsed.
    pub async fn force_classify(&self, mint: Address) -> Option<domain::TokenOutcome> {
        self.force_classify_inner(mint, Utc::now()).await
    }

    async fn force_classify_inner(&self, mint: Address, now: DateTime<Utc>) -> Option<domain::TokenOutcome> {
        let token = self.tokens.lock().await.remove(&mint)?;
        let outcome = classify_outcome(&token, true, now);
        self.persist_outcome(&token, &outcome).await;
        Some(outcome)
    }

    /// Persists the terminal outcome plus its paired ml_samples training row
    /// (§13, §1 "only the ML-sample persistence hook is in scope"). A
    /// failure on either side is logged, never propagated: outcome tracking
    /// must keep running even if the store is briefly unreachable.
    async fn persist_outcome(&self, token: &TrackedToken, outcome: &domain::TokenOutcome) {
        if let Err(e) = self.persistence.save_token_outcome_final(outcome).await {
            tracing::warn!(mint = %outcome.mint, error = %e, "failed to persist token outcome");
        }
        let sample = MlSampleRecord {
            token_mint: token.mint,
            initial_price: token.initial_price,
            initial_liquidity: token.initial_liquidity,
            initial_holders: token.initial_holders,
            initial_risk_score: token.initial_risk_score,
            peak_multiplier: outcome.peak_multiplier,
            outcome_kind: outcome.kind,
            confidence: outcome.confidence,
            recorded_at: outcome.classified_at,
        };
        if let Err(e) = self.persistence.save_ml_sample(&sample).await {
            tracing::warn!(mint = %outcome.mint, error = %e, "failed to persist ml sample");
        }
    }

    /// Runs the periodic poller until cancelled (§4.9 "Polling").
    pub async fn run(self: Arc<Self>) {
        loop {
            tokio::time::sleep(self.config.monitoring_interval).await;
            self.update_all(Utc::now()).await;
        }
    }

    /// One polling pass: batch-fetch market data for every tracked token
    /// (≤30 per call), update peaks, and terminate tokens whose monitoring
    /// window elapsed or that rugged early.
    pub async fn update_all(&self, now: DateTime<Utc>) {
        let mints: Vec<Address> = self.tokens.lock().await.keys().copied().collect();

        for chunk in mints.chunks(BATCH_SIZE) {
            let facts = match self.aggregator.get_tokens(chunk).await {
                Ok(facts) => facts.into_iter().collect::<HashMap<_, _>>(),
                Err(e) => {
                    tracing::warn!(error = %e, "batch market fetch failed for this chunk");
                    HashMap::new()
                }
            };

            let mut to_finalize = Vec::new();
            {
                let mut tokens = self.tokens.lock().await;
                for mint in chunk {
                    let Some(token) = tokens.get_mut(mint) else {
                        continue;
                    };
                    let has_data = match facts.get(mint) {
                        Some(market) => {
                            let price = market.price_usd.unwrap_or(token.current_price);
                            let liquidity = market.liquidity_usd.unwrap_or(token.current_liquidity);
                            token.observe(price, liquidity, token.current_holders, now);
                            true
                        }
                        None => false,
                    };

                    let liquidity_ratio = if token.initial_liquidity > 0.0 {
                        token.current_liquidity / token.initial_liquidity
                    } else {
                        0.0
                    };
                    let final_price_ratio = if token.initial_price > 0.0 {
                        token.current_price / token.initial_price
                    } else {
                        0.0
                    };
                    let rugged_early = liquidity_ratio < 0.20 || final_price_ratio < 0.10;
                    let expired = token.age(now) >= self.config.monitoring_duration;

                    if !has_data || rugged_early || expired {
                        to_finalize.push((*mint, has_data));
                    }
                }
            }

            for (mint, has_data) in to_finalize {
                let token = self.tokens.lock().await.remove(&mint);
                if let Some(token) = token {
                    let outcome = classify_outcome(&token, has_data, now);
                    self.persist_outcome(&token, &outcome).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ports::{MockAggregatorPort, MockPersistencePort};

    fn mint(b: u8) -> Address {
        Address([b; 32])
    }

    fn tracker(config: OutcomeTrackerConfig) -> OutcomeTracker {
        let mut aggregator = MockAggregatorPort::new();
        aggregator
            .expect_get_tokens()
            .returning(|_| Box::pin(async { Ok(vec![]) }));
        let mut persistence = MockPersistencePort::new();
        persistence
            .expect_save_token_outcome_final()
            .returning(|_| Box::pin(async { Ok(()) }));
        persistence
            .expect_save_ml_sample()
            .returning(|_| Box::pin(async { Ok(()) }));
        OutcomeTracker::new(config, Arc::new(aggregator), Arc::new(persistence))
    }

    #[tokio::test]
    async fn tracks_and_reports_stats() {
        let t = tracker(OutcomeTrackerConfig::default());
        t.track_token(mint(1), "TEST".into(), 1.0, 1000.0, 50, 100, Utc::now())
            .await
            .unwrap();
        assert_eq!(t.stats().await.tracked, 1);
    }

    #[tokio::test]
    async fn rejects_registration_when_at_capacity_with_nothing_expired() {
        let config = OutcomeTrackerConfig {
            max_tracked_tokens: 1,
            ..OutcomeTrackerConfig::default()
        };
        let t = tracker(config);
        t.track_token(mint(1), "A".into(), 1.0, 1000.0, 50, 100, Utc::now())
            .await
            .unwrap();
        let result = t
            .track_token(mint(2), "B".into(), 1.0, 1000.0, 50, 100, Utc::now())
            .await;
        assert_eq!(result, Err(TrackError::AtCapacity));
    }

    #[tokio::test]
    async fn force_classify_removes_token_and_returns_outcome() {
        let t = tracker(OutcomeTrackerConfig::default());
        t.track_token(mint(1), "TEST".into(), 1.0, 1000.0, 50, 100, Utc::now())
            .await
            .unwrap();
        let outcome = t.force_classify(mint(1)).await;
        assert!(outcome.is_some());
        assert_eq!(t.stats().await.tracked, 0);
    }

    #[tokio::test]
    async fn update_all_finalizes_tokens_missing_market_data_as_rug() {
        let mut aggregator = MockAggregatorPort::new();
        aggregator
            .expect_get_tokens()
            .returning(|_| Box::pin(async { Ok(vec![]) }));
        let mut persistence = MockPersistencePort::new();
        persistence
            .expect_save_token_outcome_final()
            .withf(|outcome| outcome.kind == domain::OutcomeKind::Rug)
            .returning(|_| Box::pin(async { Ok(()) }));
        persistence
            .expect_save_ml_sample()
            .returning(|_| Box::pin(async { Ok(()) }));

        let t = OutcomeTracker::new(
            OutcomeTrackerConfig::default(),
            Arc::new(aggregator),
            Arc::new(persistence),
        );
        t.track_token(mint(1), "TEST".into(), 1.0, 1000.0, 50, 100, Utc::now())
            .await
            .unwrap();
        t.update_all(Utc::now()).await;
        assert_eq!(t.stats().await.tracked, 0);
    }
}
