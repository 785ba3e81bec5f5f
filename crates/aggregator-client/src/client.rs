use crate::dexscreener::{self, BoostEntry, PairResponse, PairsResponse};
use async_trait::async_trait;
use domain::{error::ErrorKind, Address};
use http_client::{GetOptions, ResilientClient};
use ports::{AggregatorPort, PortError, TokenBoost, TokenMarketFacts, TokenSocialFacts};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default token-bucket and breaker tuning for the aggregator upstream.
/// Dexscreener's public API documents roughly 300 req/min on the free tier;
/// this stays well under that (§4.1, §6).
pub fn default_client(base_url: Url) -> ResilientClient {
    ResilientClient::new(
        "aggregator",
        base_url,
        60.0,
        1.0,
        5,
        Duration::from_secs(30),
        3,
        Duration::from_millis(250),
    )
}

/// Concrete [`AggregatorPort`] wired against a Dexscreener-shaped REST API,
/// via the shared GET-only [`ResilientClient`] (§6, C1).
pub struct AggregatorClient {
    client: ResilientClient,
}

impl AggregatorClient {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    fn plain_options<T>() -> GetOptions<T>
    where
        T: serde::de::DeserializeOwned,
    {
        GetOptions::default()
    }
}

fn request_failed(error: Option<String>) -> PortError {
    PortError::new(
        ErrorKind::Transient,
        error.unwrap_or_else(|| "aggregator request failed".to_string()),
    )
}

#[async_trait]
impl AggregatorPort for AggregatorClient {
    async fn get_token(&self, mint: Address) -> Result<Option<TokenMarketFacts>, PortError> {
        let path = format!("latest/dex/tokens/{mint}");
        let response: http_client::GetResponse<PairsResponse> =
            self.client.get(&path, Self::plain_options()).await;

        let Some(body) = response.data else {
            return Err(request_failed(response.error));
        };
        let pairs = body.pairs.unwrap_or_default();
        Ok(dexscreener::best_pair(pairs).map(|p| dexscreener::market_facts(&p)))
    }

    async fn get_tokens(
        &self,
        mints: &[Address],
    ) -> Result<Vec<(Address, TokenMarketFacts)>, PortError> {
        if mints.is_empty() {
            return Ok(Vec::new());
        }
        let joined = mints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("tokens/v1/solana/{joined}");
        let response: http_client::GetResponse<Vec<dexscreener::Pair>> =
            self.client.get(&path, Self::plain_options()).await;

        let Some(pairs) = response.data else {
            return Err(request_failed(response.error));
        };

        Ok(pairs
            .into_iter()
            .filter_map(|pair| {
                let address = Address::from_str(&pair.base_token.as_ref()?.address).ok()?;
                Some((address, dexscreener::market_facts(&pair)))
            })
            .collect())
    }

    async fn get_pair(
        &self,
        chain: &str,
        pair: &str,
    ) -> Result<Option<TokenMarketFacts>, PortError> {
        let path = format!("latest/dex/pairs/{chain}/{pair}");
        let response: http_client::GetResponse<PairResponse> =
            self.client.get(&path, Self::plain_options()).await;

        let Some(body) = response.data else {
            return Err(request_failed(response.error));
        };
        Ok(body.pair.as_ref().map(dexscreener::market_facts))
    }

    async fn get_social(&self, mint: Address) -> Result<TokenSocialFacts, PortError> {
        let path = format!("latest/dex/tokens/{mint}");
        let response: http_client::GetResponse<PairsResponse> =
            self.client.get(&path, Self::plain_options()).await;

        let Some(body) = response.data else {
            return Err(request_failed(response.error));
        };
        let pairs = body.pairs.unwrap_or_default();
        Ok(dexscreener::best_pair(pairs)
            .map(|p| dexscreener::social_facts(&p))
            .unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<TokenMarketFacts>, PortError> {
        let path = format!("latest/dex/search?q={query}");
        let response: http_client::GetResponse<PairsResponse> =
            self.client.get(&path, Self::plain_options()).await;

        let Some(body) = response.data else {
            return Err(request_failed(response.error));
        };
        Ok(body
            .pairs
            .unwrap_or_default()
            .iter()
            .map(dexscreener::market_facts)
            .collect())
    }

    async fn token_boosts_latest(&self) -> Result<Vec<TokenBoost>, PortError> {
        let response: http_client::GetResponse<Vec<BoostEntry>> = self
            .client
            .get("token-boosts/latest/v1", Self::plain_options())
            .await;

        let Some(entries) = response.data else {
            return Err(request_failed(response.error));
        };
        Ok(entries.into_iter().map(dexscreener::boost).collect())
    }

    async fn token_profiles_latest(&self) -> Result<Vec<TokenBoost>, PortError> {
        let response: http_client::GetResponse<Vec<BoostEntry>> = self
            .client
            .get("token-profiles/latest/v1", Self::plain_options())
            .await;

        let Some(entries) = response.data else {
            return Err(request_failed(response.error));
        };
        Ok(entries.into_iter().map(dexscreener::boost).collect())
    }
}
