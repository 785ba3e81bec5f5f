use crate::{
    adapter::{Emit, PoolSourceAdapter},
    backoff::ReconnectBackoff,
    dedup::RecentEmitSet,
};
use async_trait::async_trait;
use chrono::Utc;
use domain::{Address, PoolEvent, PoolSource};
use ports::AggregatorPort;
use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Mutex;

const RECENT_EMIT_CAPACITY: usize = 10_000;

/// Polling-REST adapter (`PumpfunPolling` / `JupiterPolling`): polls the
/// aggregator's boosted/profile feed on an interval, applies a
/// minimum-liquidity prefilter when liquidity is known, and deduplicates at
/// the pool-address level within its own lifetime (§4.2).
pub struct PollingAdapter {
    source: PoolSource,
    aggregator: Arc<dyn AggregatorPort>,
    poll_interval: Duration,
    min_liquidity_usd: f64,
    /// Quote mint paired against every discovered token, since the boosted/
    /// profile feed only names the token itself.
    quote_mint: Address,
    running: AtomicBool,
    backoff: Mutex<ReconnectBackoff>,
    seen: Mutex<RecentEmitSet>,
}

impl PollingAdapter {
    pub fn new(
        source: PoolSource,
        aggregator: Arc<dyn AggregatorPort>,
        poll_interval: Duration,
        min_liquidity_usd: f64,
        quote_mint: Address,
    ) -> Self {
        Self {
            source,
            aggregator,
            poll_interval,
            min_liquidity_usd,
            quote_mint,
            running: AtomicBool::new(false),
            backoff: Mutex::new(ReconnectBackoff::new(
                Duration::from_secs(1),
                Duration::from_secs(60),
            )),
            seen: Mutex::new(RecentEmitSet::new(RECENT_EMIT_CAPACITY)),
        }
    }

    async fn poll_once(&self, emit: &Emit) -> Result<(), ports::PortError> {
        let boosts = self.aggregator.token_boosts_latest().await?;
        for boost in boosts {
            let Ok(mint) = Address::from_str(&boost.token_address) else {
                tracing::debug!(address = boost.token_address, "skipping unparseable token address");
                continue;
            };

            if let Ok(Some(market)) = self.aggregator.get_token(mint).await {
                if let Some(liquidity) = market.liquidity_usd {
                    if liquidity < self.min_liquidity_usd {
                        continue;
                    }
                }
            }

            let event = match PoolEvent::new(mint, mint, mint, self.quote_mint, self.source, Utc::now()) {
                Ok(event) => event,
                Err(_) => continue, // quote_mint misconfigured to equal the token itself
            };

            let mut seen = self.seen.lock().await;
            if seen.record_if_new(event.pool_address) {
                drop(seen);
                emit(event);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PoolSourceAdapter for PollingAdapter {
    fn source(&self) -> PoolSource {
        self.source
    }

    async fn start(&self, emit: Emit) {
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            match self.poll_once(&emit).await {
                Ok(()) => {
                    self.backoff.lock().await.reset();
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    let delay = self.backoff.lock().await.next_delay();
                    tracing::warn!(
                        source = ?self.source,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "poll failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ports::{MockAggregatorPort, TokenBoost, TokenMarketFacts};
    use std::sync::{atomic::AtomicUsize, Arc};

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    #[tokio::test]
    async fn emits_once_and_suppresses_repeat_within_lifetime() {
        let mut aggregator = MockAggregatorPort::new();
        aggregator.expect_token_boosts_latest().returning(|| {
            Box::pin(async {
                Ok(vec![TokenBoost {
                    token_address: bs58::encode(addr(7).0).into_string(),
                    amount: 1.0,
                }])
            })
        });
        aggregator.expect_get_token().returning(|_| {
            Box::pin(async {
                Ok(Some(TokenMarketFacts {
                    liquidity_usd: Some(5000.0),
                    ..Default::default()
                }))
            })
        });

        let adapter = PollingAdapter::new(
            PoolSource::PumpfunPolling,
            Arc::new(aggregator),
            Duration::from_millis(5),
            1000.0,
            addr(99),
        );

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let emit: Emit = Arc::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        adapter.poll_once(&emit).await.unwrap();
        adapter.poll_once(&emit).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn liquidity_below_threshold_is_prefiltered() {
        let mut aggregator = MockAggregatorPort::new();
        aggregator.expect_token_boosts_latest().returning(|| {
            Box::pin(async {
                Ok(vec![TokenBoost {
                    token_address: bs58::encode(addr(8).0).into_string(),
                    amount: 1.0,
                }])
            })
        });
        aggregator.expect_get_token().returning(|_| {
            Box::pin(async {
                Ok(Some(TokenMarketFacts {
                    liquidity_usd: Some(10.0),
                    ..Default::default()
                }))
            })
        });

        let adapter = PollingAdapter::new(
            PoolSource::JupiterPolling,
            Arc::new(aggregator),
            Duration::from_millis(5),
            1000.0,
            addr(99),
        );

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let emit: Emit = Arc::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        adapter.poll_once(&emit).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
