//! Fan-out enrichment of one token into [`EnrichmentFacts`] (C5, §4.5).
//!
//! Every sub-fetch has its own deadline and degrades to a documented
//! default rather than failing the whole enrichment — only an unobtainable
//! token itself (no chain response at all) is a hard failure.

use domain::{Address, Contract, EnrichmentFacts, Holders, Liquidity, Percent, Social, WHALE_THRESHOLD_PERCENT};
use ports::{AggregatorPort, ChainRpcPort};
use std::{sync::Arc, time::Duration};

#[derive(Clone, Copy, Debug)]
pub struct EnrichmentTimeouts {
    pub liquidity_and_holders: Duration,
    pub market: Duration,
    pub contract: Duration,
    pub social: Duration,
}

impl Default for EnrichmentTimeouts {
    fn default() -> Self {
        Self {
            liquidity_and_holders: Duration::from_secs(5),
            market: Duration::from_secs(5),
            contract: Duration::from_secs(5),
            social: Duration::from_secs(3),
        }
    }
}

pub struct Enricher {
    chain: Arc<dyn ChainRpcPort>,
    aggregator: Arc<dyn AggregatorPort>,
    timeouts: EnrichmentTimeouts,
}

impl Enricher {
    pub fn new(
        chain: Arc<dyn ChainRpcPort>,
        aggregator: Arc<dyn AggregatorPort>,
        timeouts: EnrichmentTimeouts,
    ) -> Self {
        Self {
            chain,
            aggregator,
            timeouts,
        }
    }

    /// Fetches liquidity, holder, market, contract and social facts in
    /// parallel and assembles [`EnrichmentFacts`] (§4.5).
    pub async fn enrich(&self, mint: Address) -> EnrichmentFacts {
        let (liquidity, holders) = tokio::join!(
            self.fetch_liquidity(mint),
            self.fetch_holders(mint),
        );
        let (market_liquidity_usd, contract, social) = tokio::join!(
            self.fetch_market_liquidity_usd(mint),
            self.fetch_contract(mint),
            self.fetch_social(mint),
        );

        let mut liquidity = liquidity;
        if liquidity.total_liquidity_usd == 0.0 {
            if let Some(usd) = market_liquidity_usd {
                liquidity.total_liquidity_usd = usd;
            }
        }

        EnrichmentFacts {
            liquidity,
            holders,
            contract,
            social,
            rugcheck_score: None,
        }
    }

    async fn fetch_liquidity(&self, mint: Address) -> Liquidity {
        let result = tokio::time::timeout(
            self.timeouts.liquidity_and_holders,
            self.chain.get_liquidity_info(mint),
        )
        .await;
        match result {
            Ok(Ok(Some(info))) => Liquidity {
                total_liquidity_usd: info.total_liquidity_usd,
                lp_burned_percent: Percent::new(info.lp_burned_percent),
                lp_locked_percent: Percent::new(info.lp_locked_percent),
                lp_lock_duration_sec: info.lp_lock_duration_sec,
            },
            Ok(Ok(None)) => Liquidity::default(),
            Ok(Err(e)) => {
                tracing::debug!(%mint, error = %e, "liquidity fetch failed, using defaults");
                Liquidity::default()
            }
            Err(_) => {
                tracing::debug!(%mint, "liquidity fetch timed out, using defaults");
                Liquidity::default()
            }
        }
    }

    async fn fetch_holders(&self, mint: Address) -> Holders {
        let result = tokio::time::timeout(
            self.timeouts.liquidity_and_holders,
            self.chain.get_token_holders(mint),
        )
        .await;
        let raw = match result {
            Ok(Ok(holders)) => holders,
            Ok(Err(e)) => {
                tracing::debug!(%mint, error = %e, "holders fetch failed, using defaults");
                return Holders::default();
            }
            Err(_) => {
                tracing::debug!(%mint, "holders fetch timed out, using defaults");
                return Holders::default();
            }
        };
        holders_from_raw(&raw)
    }

    async fn fetch_market_liquidity_usd(&self, mint: Address) -> Option<f64> {
        let result = tokio::time::timeout(self.timeouts.market, self.aggregator.get_token(mint)).await;
        match result {
            Ok(Ok(Some(facts))) => facts.liquidity_usd,
            Ok(Ok(None)) | Ok(Err(_)) | Err(_) => None,
        }
    }

    async fn fetch_contract(&self, mint: Address) -> Contract {
        let result = tokio::time::timeout(self.timeouts.contract, self.chain.get_contract_info(mint)).await;
        match result {
            Ok(Ok(Some(info))) => Contract {
                mint_authority_revoked: info.mint_authority_revoked,
                freeze_authority_revoked: info.freeze_authority_revoked,
                is_honeypot: info.is_honeypot,
                has_transfer_fee: info.has_transfer_fee,
                transfer_fee_percent: info.transfer_fee_percent.map(Percent::new),
            },
            Ok(Ok(None)) => Contract::default(),
            Ok(Err(e)) => {
                tracing::debug!(%mint, error = %e, "contract fetch failed, using defaults");
                Contract::default()
            }
            Err(_) => {
                tracing::debug!(%mint, "contract fetch timed out, using defaults");
                Contract::default()
            }
        }
    }

    async fn fetch_social(&self, mint: Address) -> Social {
        let result = tokio::time::timeout(self.timeouts.social, self.aggregator.get_social(mint)).await;
        match result {
            Ok(Ok(facts)) => Social {
                has_twitter: facts.has_twitter,
                has_telegram: facts.has_telegram,
                has_website: facts.has_website,
            },
            Ok(Err(_)) | Err(_) => Social::default(),
        }
    }
}

fn holders_from_raw(raw: &[ports::TokenHolder]) -> Holders {
    let total_holders = raw.len() as u64;
    if raw.is_empty() {
        return Holders::default();
    }

    let total_balance: f64 = raw.iter().map(|h| h.balance).sum();
    let mut sorted: Vec<&ports::TokenHolder> = raw.iter().collect();
    sorted.sort_by(|a, b| b.balance.partial_cmp(&a.balance).unwrap_or(std::cmp::Ordering::Equal));

    let percent_of = |balance: f64| -> f64 {
        if total_balance <= 0.0 {
            0.0
        } else {
            (balance / total_balance) * 100.0
        }
    };

    let top10: f64 = sorted.iter().take(10).map(|h| percent_of(h.balance)).sum();
    let top20: f64 = sorted.iter().take(20).map(|h| percent_of(h.balance)).sum();
    let largest = sorted.first().map(|h| percent_of(h.balance)).unwrap_or(0.0);

    let whale_addresses = sorted
        .iter()
        .filter(|h| percent_of(h.balance) >= WHALE_THRESHOLD_PERCENT)
        .map(|h| h.address)
        .collect();

    Holders {
        total_holders,
        top10_holders_percent: Some(Percent::new(top10)),
        top20_holders_percent: Some(Percent::new(top20)),
        largest_holder_percent: Some(Percent::new(largest)),
        whale_addresses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ports::{MockAggregatorPort, MockChainRpcPort, TokenHolder, TokenMarketFacts, TokenSocialFacts};

    fn mint() -> Address {
        Address([5u8; 32])
    }

    #[test]
    fn holders_from_raw_computes_concentration_and_whales() {
        let raw = vec![
            TokenHolder { address: Address([1; 32]), balance: 60.0 },
            TokenHolder { address: Address([2; 32]), balance: 30.0 },
            TokenHolder { address: Address([3; 32]), balance: 10.0 },
        ];
        let holders = holders_from_raw(&raw);
        assert_eq!(holders.total_holders, 3);
        assert_eq!(holders.largest_holder_percent.unwrap().value(), 60.0);
        assert!(holders.whale_addresses.contains(&Address([1; 32])));
        assert!(holders.whale_addresses.contains(&Address([2; 32])));
    }

    #[tokio::test]
    async fn enrich_degrades_to_defaults_when_every_subfetch_fails() {
        let mut chain = MockChainRpcPort::new();
        chain.expect_get_liquidity_info().returning(|_| Box::pin(async { Err(ports::PortError::transient("down")) }));
        chain.expect_get_token_holders().returning(|_| Box::pin(async { Err(ports::PortError::transient("down")) }));
        chain.expect_get_contract_info().returning(|_| Box::pin(async { Err(ports::PortError::transient("down")) }));

        let mut aggregator = MockAggregatorPort::new();
        aggregator
            .expect_get_token()
            .returning(|_| Box::pin(async { Err(ports::PortError::transient("down")) }));
        aggregator
            .expect_get_social()
            .returning(|_| Box::pin(async { Err(ports::PortError::transient("down")) }));

        let enricher = Enricher::new(Arc::new(chain), Arc::new(aggregator), EnrichmentTimeouts::default());
        let facts = enricher.enrich(mint()).await;
        assert_eq!(facts, EnrichmentFacts::default());
    }

    #[tokio::test]
    async fn enrich_falls_back_to_market_liquidity_when_chain_liquidity_is_zero() {
        let mut chain = MockChainRpcPort::new();
        chain.expect_get_liquidity_info().returning(|_| Box::pin(async { Ok(None) }));
        chain.expect_get_token_holders().returning(|_| Box::pin(async { Ok(vec![]) }));
        chain.expect_get_contract_info().returning(|_| Box::pin(async { Ok(None) }));

        let mut aggregator = MockAggregatorPort::new();
        aggregator.expect_get_token().returning(|_| {
            Box::pin(async {
                Ok(Some(TokenMarketFacts {
                    liquidity_usd: Some(42_000.0),
                    ..Default::default()
                }))
            })
        });
        aggregator
            .expect_get_social()
            .returning(|_| Box::pin(async { Ok(TokenSocialFacts::default()) }));

        let enricher = Enricher::new(Arc::new(chain), Arc::new(aggregator), EnrichmentTimeouts::default());
        let facts = enricher.enrich(mint()).await;
        assert_eq!(facts.liquidity.total_liquidity_usd, 42_000.0);
    }
}
