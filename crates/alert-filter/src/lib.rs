//! Pure alert-worthiness predicate (C7, §4.7).
//!
//! [`should_alert`] takes an already-computed [`RiskVerdict`], the
//! [`EnrichmentFacts`] it was derived from, the category/priority of the
//! candidate alert, and a recipient's config, and decides pass/fail with no
//! I/O and no hidden state (L2: deterministic for fixed inputs).

use chrono::{DateTime, Timelike, Utc};
use domain::{Address, AlertCategory, AlertPriority, EnrichmentFacts, RiskVerdict};
use std::collections::HashSet;

/// Per-recipient thresholds and toggles (§4.7, §6 config table).
#[derive(Clone, Debug)]
pub struct AlertFilterConfig {
    pub alerts_enabled: bool,
    /// `(start_hour, end_hour)` in UTC, wrapping past midnight if `start > end`.
    pub quiet_hours_utc: Option<(u32, u32)>,
    pub blacklist: HashSet<Address>,
    pub min_liquidity_usd: f64,
    pub max_holder_concentration_percent: f64,
    pub min_holder_count: u64,
    pub min_risk_score: u8,
    pub category_enabled: CategoryToggles,
    pub require_mint_authority_revoked: bool,
    pub require_freeze_authority_revoked: bool,
    pub require_lp_burned: bool,
    pub require_socials: bool,
    pub min_priority: AlertPriority,
}

#[derive(Clone, Copy, Debug)]
pub struct CategoryToggles {
    pub new_token: bool,
    pub volume_spike: bool,
    pub whale_movement: bool,
    pub liquidity_drain: bool,
    pub authority_change: bool,
    pub wallet_activity: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            new_token: true,
            volume_spike: true,
            whale_movement: true,
            liquidity_drain: true,
            authority_change: true,
            wallet_activity: true,
        }
    }
}

impl CategoryToggles {
    fn is_enabled(&self, category: AlertCategory) -> bool {
        match category {
            AlertCategory::NewToken => self.new_token,
            AlertCategory::VolumeSpike => self.volume_spike,
            AlertCategory::WhaleMovement => self.whale_movement,
            AlertCategory::LiquidityDrain => self.liquidity_drain,
            AlertCategory::AuthorityChange => self.authority_change,
            AlertCategory::WalletActivity => self.wallet_activity,
        }
    }
}

impl Default for AlertFilterConfig {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            quiet_hours_utc: None,
            blacklist: HashSet::new(),
            min_liquidity_usd: 1000.0,
            max_holder_concentration_percent: 95.0,
            min_holder_count: 0,
            min_risk_score: 0,
            category_enabled: CategoryToggles::default(),
            require_mint_authority_revoked: false,
            require_freeze_authority_revoked: false,
            require_lp_burned: false,
            require_socials: false,
            min_priority: AlertPriority::Low,
        }
    }
}

fn in_quiet_hours(window: (u32, u32), now: DateTime<Utc>) -> bool {
    let (start, end) = window;
    let hour = now.hour();
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Decides whether an alert candidate should be dispatched (§4.7).
///
/// Returns `false` for any single disqualifying condition; all conditions
/// are checked so the result is deterministic regardless of evaluation
/// order, but the scan below follows the spec's listed order for
/// readability.
pub fn should_alert(
    verdict: &RiskVerdict,
    facts: &EnrichmentFacts,
    token_mint: Address,
    category: AlertCategory,
    priority: AlertPriority,
    cfg: &AlertFilterConfig,
    now: DateTime<Utc>,
) -> bool {
    if !cfg.alerts_enabled {
        return false;
    }
    if let Some(window) = cfg.quiet_hours_utc {
        if in_quiet_hours(window, now) {
            return false;
        }
    }
    if cfg.blacklist.contains(&token_mint) {
        return false;
    }
    if facts.liquidity.total_liquidity_usd < cfg.min_liquidity_usd {
        return false;
    }
    let concentration = facts
        .holders
        .top10_holders_percent
        .map(|p| p.value())
        .unwrap_or(0.0);
    if concentration > cfg.max_holder_concentration_percent {
        return false;
    }
    if facts.holders.total_holders < cfg.min_holder_count {
        return false;
    }
    if verdict.score < cfg.min_risk_score {
        return false;
    }
    if !cfg.category_enabled.is_enabled(category) {
        return false;
    }
    if cfg.require_mint_authority_revoked && !facts.contract.mint_authority_revoked {
        return false;
    }
    if cfg.require_freeze_authority_revoked && !facts.contract.freeze_authority_revoked {
        return false;
    }
    if cfg.require_lp_burned && facts.liquidity.lp_burned_percent.value() < 90.0 {
        return false;
    }
    if cfg.require_socials && !facts.social.any() {
        return false;
    }
    if priority < cfg.min_priority {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Contract, Holders, Liquidity, Percent, Social};

    fn mint() -> Address {
        Address([9u8; 32])
    }

    fn facts() -> EnrichmentFacts {
        EnrichmentFacts {
            liquidity: Liquidity {
                total_liquidity_usd: 50_000.0,
                lp_burned_percent: Percent::new(100.0),
                lp_locked_percent: Percent::new(0.0),
                lp_lock_duration_sec: None,
            },
            holders: Holders {
                total_holders: 500,
                top10_holders_percent: Some(Percent::new(30.0)),
                top20_holders_percent: Some(Percent::new(40.0)),
                largest_holder_percent: Some(Percent::new(8.0)),
                whale_addresses: Default::default(),
            },
            contract: Contract {
                mint_authority_revoked: true,
                freeze_authority_revoked: true,
                is_honeypot: false,
                has_transfer_fee: false,
                transfer_fee_percent: None,
            },
            social: Social {
                has_twitter: true,
                has_telegram: true,
                has_website: true,
            },
            rugcheck_score: None,
        }
    }

    fn verdict(score: u8) -> RiskVerdict {
        RiskVerdict {
            score,
            level: domain::RiskLevel::from_score(score),
            factors: vec![],
        }
    }

    #[test]
    fn passes_under_default_config() {
        assert!(should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &AlertFilterConfig::default(),
            Utc::now(),
        ));
    }

    #[test]
    fn globally_disabled_suppresses_everything() {
        let cfg = AlertFilterConfig {
            alerts_enabled: false,
            ..AlertFilterConfig::default()
        };
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            Utc::now(),
        ));
    }

    #[test]
    fn blacklisted_token_is_suppressed() {
        let mut cfg = AlertFilterConfig::default();
        cfg.blacklist.insert(mint());
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            Utc::now(),
        ));
    }

    #[test]
    fn below_min_risk_score_is_suppressed() {
        let cfg = AlertFilterConfig {
            min_risk_score: 90,
            ..AlertFilterConfig::default()
        };
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            Utc::now(),
        ));
    }

    #[test]
    fn disabled_category_is_suppressed() {
        let cfg = AlertFilterConfig {
            category_enabled: CategoryToggles {
                new_token: false,
                ..CategoryToggles::default()
            },
            ..AlertFilterConfig::default()
        };
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            Utc::now(),
        ));
    }

    #[test]
    fn quiet_hours_window_wrapping_midnight_is_honoured() {
        let cfg = AlertFilterConfig {
            quiet_hours_utc: Some((22, 6)),
            ..AlertFilterConfig::default()
        };
        let during = "2026-01-01T23:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let outside = "2026-01-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            during,
        ));
        assert!(should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            outside,
        ));
    }

    #[test]
    fn priority_below_minimum_is_suppressed() {
        let cfg = AlertFilterConfig {
            min_priority: AlertPriority::High,
            ..AlertFilterConfig::default()
        };
        assert!(!should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            Utc::now(),
        ));
    }

    #[test]
    fn should_alert_is_deterministic_for_fixed_inputs() {
        let cfg = AlertFilterConfig::default();
        let now = Utc::now();
        let a = should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            now,
        );
        let b = should_alert(
            &verdict(85),
            &facts(),
            mint(),
            AlertCategory::NewToken,
            AlertPriority::Normal,
            &cfg,
            now,
        );
        assert_eq!(a, b);
    }
}
