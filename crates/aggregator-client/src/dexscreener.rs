use ports::{TokenBoost, TokenMarketFacts, TokenSocialFacts};
use serde::Deserialize;

/// Wire shape of a single Dexscreener pair. Only the fields the domain
/// model needs are kept; everything else in the real response is ignored
/// by serde's default `deny_unknown_fields`-off behavior.
#[derive(Clone, Deserialize)]
pub struct Pair {
    #[serde(rename = "pairAddress")]
    pub pair_address: Option<String>,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<String>,
    pub liquidity: Option<Liquidity>,
    pub fdv: Option<f64>,
    pub volume: Option<Volume>,
    pub info: Option<Info>,
    #[serde(rename = "baseToken")]
    pub base_token: Option<BaseToken>,
}

#[derive(Clone, Deserialize)]
pub struct BaseToken {
    pub address: String,
}

#[derive(Clone, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
}

#[derive(Clone, Deserialize)]
pub struct Volume {
    pub h24: Option<f64>,
}

#[derive(Clone, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub websites: Vec<serde_json::Value>,
    #[serde(default)]
    pub socials: Vec<Social>,
}

#[derive(Clone, Deserialize)]
pub struct Social {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<Pair>>,
}

#[derive(Clone, Deserialize)]
pub struct PairResponse {
    pub pair: Option<Pair>,
}

#[derive(Clone, Deserialize)]
pub struct BoostEntry {
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
    #[serde(default)]
    pub amount: f64,
}

pub fn market_facts(pair: &Pair) -> TokenMarketFacts {
    TokenMarketFacts {
        price_usd: pair.price_usd.as_ref().and_then(|p| p.parse().ok()),
        liquidity_usd: pair.liquidity.as_ref().and_then(|l| l.usd),
        fdv_usd: pair.fdv,
        volume_24h_usd: pair.volume.as_ref().and_then(|v| v.h24),
        pair_address: pair.pair_address.clone(),
    }
}

pub fn social_facts(pair: &Pair) -> TokenSocialFacts {
    let Some(info) = &pair.info else {
        return TokenSocialFacts::default();
    };
    TokenSocialFacts {
        has_twitter: info.socials.iter().any(|s| s.kind == "twitter"),
        has_telegram: info.socials.iter().any(|s| s.kind == "telegram"),
        has_website: !info.websites.is_empty(),
    }
}

pub fn boost(entry: BoostEntry) -> TokenBoost {
    TokenBoost {
        token_address: entry.token_address,
        amount: entry.amount,
    }
}

/// Dexscreener returns the most-liquid pair first when multiple pools
/// exist for a token; take that one as the representative quote.
pub fn best_pair(pairs: Vec<Pair>) -> Option<Pair> {
    pairs
        .into_iter()
        .max_by(|a, b| {
            let a = a.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            let b = b.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            a.total_cmp(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn market_facts_reads_nested_fields() {
        let pair: Pair = serde_json::from_value(json!({
            "pairAddress": "abc",
            "priceUsd": "0.0042",
            "liquidity": {"usd": 12345.0},
            "fdv": 999.0,
            "volume": {"h24": 50.0}
        }))
        .unwrap();
        let facts = market_facts(&pair);
        assert_eq!(facts.price_usd, Some(0.0042));
        assert_eq!(facts.liquidity_usd, Some(12345.0));
        assert_eq!(facts.pair_address.as_deref(), Some("abc"));
    }

    #[test]
    fn social_facts_detect_known_platforms() {
        let pair: Pair = serde_json::from_value(json!({
            "info": {
                "websites": [{"url": "https://example.com"}],
                "socials": [{"type": "twitter"}]
            }
        }))
        .unwrap();
        let social = social_facts(&pair);
        assert!(social.has_twitter);
        assert!(social.has_website);
        assert!(!social.has_telegram);
    }

    #[test]
    fn best_pair_picks_highest_liquidity() {
        let low: Pair = serde_json::from_value(json!({"liquidity": {"usd": 10.0}})).unwrap();
        let high: Pair = serde_json::from_value(json!({"liquidity": {"usd": 500.0}})).unwrap();
        let picked = best_pair(vec![low, high]).unwrap();
        assert_eq!(picked.liquidity.unwrap().usd, Some(500.0));
    }
}
