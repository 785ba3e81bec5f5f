use crate::Address;
use chrono::{DateTime, Utc};

/// Where a [`PoolEvent`] was observed. One variant per adapter (§4.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    RaydiumSubscription,
    PumpfunPolling,
    JupiterPolling,
    WebsocketLogs,
}

/// A newly discovered liquidity pool, unique by `pool_address`.
///
/// Immutable after emission (§3). Constructed only through [`PoolEvent::new`]
/// so the `token_mint != quote_mint` invariant can't be bypassed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoolEvent {
    pub pool_address: Address,
    pub token_mint: Address,
    pub base_mint: Address,
    pub quote_mint: Address,
    pub source: PoolSource,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum PoolEventError {
    #[error("token_mint must differ from quote_mint")]
    TokenIsQuote,
}

impl PoolEvent {
    pub fn new(
        pool_address: Address,
        token_mint: Address,
        base_mint: Address,
        quote_mint: Address,
        source: PoolSource,
        discovered_at: DateTime<Utc>,
    ) -> Result<Self, PoolEventError> {
        if token_mint == quote_mint {
            return Err(PoolEventError::TokenIsQuote);
        }
        Ok(Self {
            pool_address,
            token_mint,
            base_mint,
            quote_mint,
            source,
            discovered_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[test]
    fn rejects_token_equal_to_quote() {
        let err = PoolEvent::new(
            addr(1),
            addr(2),
            addr(3),
            addr(2),
            PoolSource::RaydiumSubscription,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PoolEventError::TokenIsQuote);
    }

    #[test]
    fn accepts_distinct_mints() {
        assert!(PoolEvent::new(
            addr(1),
            addr(2),
            addr(3),
            addr(4),
            PoolSource::PumpfunPolling,
            Utc::now(),
        )
        .is_ok());
    }
}
