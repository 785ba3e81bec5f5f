use crate::Address;
use std::collections::BTreeSet;

/// A percentage clamped to `[0, 100]` at construction time so every consumer
/// downstream of enrichment can rely on the invariant without re-checking it.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self(0.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Liquidity {
    pub total_liquidity_usd: f64,
    pub lp_burned_percent: Percent,
    pub lp_locked_percent: Percent,
    pub lp_lock_duration_sec: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Holders {
    pub total_holders: u64,
    pub top10_holders_percent: Option<Percent>,
    pub top20_holders_percent: Option<Percent>,
    pub largest_holder_percent: Option<Percent>,
    pub whale_addresses: BTreeSet<Address>,
}

/// A holder owning at least this share of supply counts as a whale (§3).
pub const WHALE_THRESHOLD_PERCENT: f64 = 5.0;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum HoldersError {
    #[error("top10HoldersPercent ({top10}) must be <= top20HoldersPercent ({top20})")]
    Top10ExceedsTop20 { top10: f64, top20: f64 },
    #[error("largestHolderPercent ({largest}) must be <= top10HoldersPercent ({top10})")]
    LargestExceedsTop10 { largest: f64, top10: f64 },
}

impl Holders {
    /// Validates the `top10 <= top20` and `largest <= top10` invariants.
    ///
    /// A field that is `None` ("no data", per the open question in §9) never
    /// participates in these comparisons.
    pub fn validate(&self) -> Result<(), HoldersError> {
        if let (Some(top10), Some(top20)) = (self.top10_holders_percent, self.top20_holders_percent)
        {
            if top10.value() > top20.value() {
                return Err(HoldersError::Top10ExceedsTop20 {
                    top10: top10.value(),
                    top20: top20.value(),
                });
            }
        }
        if let (Some(largest), Some(top10)) =
            (self.largest_holder_percent, self.top10_holders_percent)
        {
            if largest.value() > top10.value() {
                return Err(HoldersError::LargestExceedsTop10 {
                    largest: largest.value(),
                    top10: top10.value(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Contract {
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
    pub is_honeypot: bool,
    pub has_transfer_fee: bool,
    pub transfer_fee_percent: Option<Percent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Social {
    pub has_twitter: bool,
    pub has_telegram: bool,
    pub has_website: bool,
}

impl Social {
    pub fn any(&self) -> bool {
        self.has_twitter || self.has_telegram || self.has_website
    }
}

/// Optional external risk signal (e.g. a rugcheck-style score), scaled
/// `[0, 100]`. `None` means the source was unavailable (§4.5 degrades
/// gracefully rather than failing the whole enrichment).
pub type RugcheckScore = Option<u8>;

/// Facts attached to one `token_mint`, produced once per analysis and
/// read-only thereafter (§3).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnrichmentFacts {
    pub liquidity: Liquidity,
    pub holders: Holders,
    pub contract: Contract,
    pub social: Social,
    pub rugcheck_score: RugcheckScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_clamps_out_of_range_values() {
        assert_eq!(Percent::new(150.0).value(), 100.0);
        assert_eq!(Percent::new(-5.0).value(), 0.0);
    }

    #[test]
    fn holders_rejects_top10_over_top20() {
        let holders = Holders {
            top10_holders_percent: Some(Percent::new(50.0)),
            top20_holders_percent: Some(Percent::new(40.0)),
            ..Default::default()
        };
        assert!(matches!(
            holders.validate(),
            Err(HoldersError::Top10ExceedsTop20 { .. })
        ));
    }

    #[test]
    fn holders_treats_missing_top10_as_no_data_not_zero() {
        // top20 present, top10 undefined: must not be treated as 0 and compared.
        let holders = Holders {
            top10_holders_percent: None,
            top20_holders_percent: Some(Percent::new(10.0)),
            ..Default::default()
        };
        assert!(holders.validate().is_ok());
    }

    #[test]
    fn holders_accepts_consistent_percentages() {
        let holders = Holders {
            top10_holders_percent: Some(Percent::new(30.0)),
            top20_holders_percent: Some(Percent::new(40.0)),
            largest_holder_percent: Some(Percent::new(8.0)),
            ..Default::default()
        };
        assert!(holders.validate().is_ok());
    }
}
