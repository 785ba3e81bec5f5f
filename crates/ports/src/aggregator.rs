use crate::error::PortError;
use async_trait::async_trait;
use domain::Address;

/// Minimal projection of a DEX-aggregator token response, already validated
/// and transformed by the underlying HTTP client (C1) before it reaches this
/// port (§9: all aggregator responses are validated before entering the core).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TokenMarketFacts {
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub fdv_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub pair_address: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TokenSocialFacts {
    pub has_twitter: bool,
    pub has_telegram: bool,
    pub has_website: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TokenBoost {
    pub token_address: String,
    pub amount: f64,
}

/// Abstraction over the DEX-aggregator HTTP API (§6). Implementations wrap a
/// [`http-client`]-style resilient client, so every method already has
/// caching, rate limiting, circuit breaking and retry applied.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait AggregatorPort: Send + Sync {
    async fn get_token(&self, mint: Address) -> Result<Option<TokenMarketFacts>, PortError>;

    /// Batch variant; the chain, not this trait, enforces the 30-mint cap.
    async fn get_tokens(
        &self,
        mints: &[Address],
    ) -> Result<Vec<(Address, TokenMarketFacts)>, PortError>;

    async fn get_pair(&self, chain: &str, pair: &str) -> Result<Option<TokenMarketFacts>, PortError>;

    async fn get_social(&self, mint: Address) -> Result<TokenSocialFacts, PortError>;

    async fn search(&self, query: &str) -> Result<Vec<TokenMarketFacts>, PortError>;

    async fn token_boosts_latest(&self) -> Result<Vec<TokenBoost>, PortError>;

    async fn token_profiles_latest(&self) -> Result<Vec<TokenBoost>, PortError>;
}
