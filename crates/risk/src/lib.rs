//! Deterministic, pure risk scoring (C6, §4.6).
//!
//! [`classify`] takes no clock, no I/O and no RNG: given the same
//! [`EnrichmentFacts`] it always returns the same [`RiskVerdict`] (L1-style
//! purity, though L1 itself names `classifyOutcome` in the outcome tracker).

use domain::{EnrichmentFacts, RiskFactor, RiskLevel, RiskVerdict, WHALE_THRESHOLD_PERCENT};

/// Starting point before additive contributions are applied.
const BASE_SCORE: i32 = 50;

/// LP-lock contribution saturates at this duration (§4.6: "scaled by
/// duration"); a lock for at least a year earns the full +10.
const FULL_LOCK_DURATION_SEC: f64 = 365.0 * 24.0 * 3600.0;

/// More than this many whale holders (each >5% of supply) is penalized.
const WHALE_COUNT_PENALTY_THRESHOLD: usize = 5;

/// Computes a [`RiskVerdict`] from enrichment facts (§4.6).
///
/// The honeypot override short-circuits every other contribution: a
/// honeypot is always `score = 0, level = EXTREME` regardless of any other
/// signal (L3).
pub fn classify(facts: &EnrichmentFacts) -> RiskVerdict {
    if facts.contract.is_honeypot {
        return RiskVerdict {
            score: 0,
            level: RiskLevel::Extreme,
            factors: vec![RiskFactor {
                name: "honeypot".to_string(),
                impact: -100,
                passed: false,
                description: "contract is a honeypot: blocks sell transactions".to_string(),
            }],
        };
    }

    let mut factors = Vec::new();
    let mut score = BASE_SCORE;

    apply_lp_burned(facts, &mut score, &mut factors);
    apply_lp_locked(facts, &mut score, &mut factors);
    apply_mint_authority(facts, &mut score, &mut factors);
    apply_freeze_authority(facts, &mut score, &mut factors);
    apply_holder_concentration(facts, &mut score, &mut factors);
    apply_holder_count(facts, &mut score, &mut factors);
    apply_whales(facts, &mut score, &mut factors);
    apply_socials(facts, &mut score, &mut factors);
    apply_rugcheck(facts, &mut score, &mut factors);

    let clamped = score.clamp(0, 100) as u8;
    RiskVerdict {
        score: clamped,
        level: RiskLevel::from_score(clamped),
        factors,
    }
}

fn push(factors: &mut Vec<RiskFactor>, name: &str, impact: i32, passed: bool, description: String) {
    factors.push(RiskFactor {
        name: name.to_string(),
        impact,
        passed,
        description,
    });
}

fn apply_lp_burned(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let burned = facts.liquidity.lp_burned_percent.value();
    if burned >= 90.0 {
        *score += 15;
        push(
            factors,
            "lp_burned",
            15,
            true,
            format!("{burned:.1}% of LP tokens burned"),
        );
    } else {
        push(
            factors,
            "lp_burned",
            0,
            false,
            format!("only {burned:.1}% of LP tokens burned"),
        );
    }
}

fn apply_lp_locked(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let locked = facts.liquidity.lp_locked_percent.value();
    if locked >= 90.0 {
        let duration_scale = facts
            .liquidity
            .lp_lock_duration_sec
            .map(|secs| (secs as f64 / FULL_LOCK_DURATION_SEC).min(1.0))
            .unwrap_or(0.0);
        let impact = (10.0 * duration_scale).round() as i32;
        *score += impact;
        push(
            factors,
            "lp_locked",
            impact,
            true,
            format!("{locked:.1}% of LP tokens locked"),
        );
    } else {
        push(
            factors,
            "lp_locked",
            0,
            false,
            format!("only {locked:.1}% of LP tokens locked"),
        );
    }
}

fn apply_mint_authority(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let revoked = facts.contract.mint_authority_revoked;
    let impact = if revoked { 10 } else { -15 };
    *score += impact;
    push(
        factors,
        "mint_authority_revoked",
        impact,
        revoked,
        if revoked {
            "mint authority revoked".to_string()
        } else {
            "mint authority still active: supply can be inflated".to_string()
        },
    );
}

fn apply_freeze_authority(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let revoked = facts.contract.freeze_authority_revoked;
    let impact = if revoked { 10 } else { -15 };
    *score += impact;
    push(
        factors,
        "freeze_authority_revoked",
        impact,
        revoked,
        if revoked {
            "freeze authority revoked".to_string()
        } else {
            "freeze authority still active: accounts can be frozen".to_string()
        },
    );
}

fn apply_holder_concentration(
    facts: &EnrichmentFacts,
    score: &mut i32,
    factors: &mut Vec<RiskFactor>,
) {
    if let Some(top10) = facts.holders.top10_holders_percent {
        let top10 = top10.value();
        let impact = if top10 >= 95.0 {
            -30
        } else if top10 >= 80.0 {
            -15
        } else {
            0
        };
        if impact != 0 {
            *score += impact;
            push(
                factors,
                "top10_concentration",
                impact,
                false,
                format!("top 10 holders control {top10:.1}%"),
            );
        }
    }

    if let Some(largest) = facts.holders.largest_holder_percent {
        let largest = largest.value();
        let impact = if largest >= 50.0 {
            -20
        } else if largest >= 20.0 {
            -10
        } else {
            0
        };
        if impact != 0 {
            *score += impact;
            push(
                factors,
                "largest_holder",
                impact,
                false,
                format!("largest holder controls {largest:.1}%"),
            );
        }
    }
}

fn apply_holder_count(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let total = facts.holders.total_holders;
    if total < 10 {
        *score -= 10;
        push(
            factors,
            "holder_count",
            -10,
            false,
            format!("only {total} holders"),
        );
    } else if total >= 500 {
        *score += 5;
        push(
            factors,
            "holder_count",
            5,
            true,
            format!("{total} holders"),
        );
    }
}

fn apply_whales(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let count = facts.holders.whale_addresses.len();
    if count > WHALE_COUNT_PENALTY_THRESHOLD {
        *score -= 10;
        push(
            factors,
            "whale_count",
            -10,
            false,
            format!("{count} wallets each hold >{WHALE_THRESHOLD_PERCENT}% of supply"),
        );
    }
}

fn apply_socials(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    let count =
        facts.social.has_twitter as u8 + facts.social.has_telegram as u8 + facts.social.has_website as u8;
    let impact = match count {
        0 => 0,
        1 | 2 => 5,
        _ => 10,
    };
    if impact != 0 {
        *score += impact;
        push(
            factors,
            "socials",
            impact,
            true,
            format!("{count} social channel(s) present"),
        );
    }
}

fn apply_rugcheck(facts: &EnrichmentFacts, score: &mut i32, factors: &mut Vec<RiskFactor>) {
    if let Some(rc) = facts.rugcheck_score {
        let impact = (((rc as f64) - 50.0) / 50.0 * 15.0).round() as i32;
        *score += impact;
        push(
            factors,
            "rugcheck_score",
            impact,
            rc >= 50,
            format!("external rugcheck score {rc}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Contract, Holders, Liquidity, Percent, Social};

    fn base_facts() -> EnrichmentFacts {
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

    #[test]
    fn honeypot_always_overrides_to_zero_extreme() {
        let mut facts = base_facts();
        facts.contract.is_honeypot = true;
        let verdict = classify(&facts);
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.level, RiskLevel::Extreme);
        assert!(verdict.is_honeypot_override());
    }

    #[test]
    fn happy_path_scores_low_or_medium_and_alert_worthy() {
        let facts = base_facts();
        let verdict = classify(&facts);
        assert!(verdict.score >= 75, "score was {}", verdict.score);
        assert!(matches!(verdict.level, RiskLevel::Low | RiskLevel::Medium));
    }

    #[test]
    fn extreme_concentration_scores_low_without_honeypot() {
        let facts = EnrichmentFacts {
            liquidity: Liquidity {
                total_liquidity_usd: 100.0,
                lp_burned_percent: Percent::new(0.0),
                lp_locked_percent: Percent::new(0.0),
                lp_lock_duration_sec: None,
            },
            holders: Holders {
                total_holders: 5,
                top10_holders_percent: Some(Percent::new(96.0)),
                top20_holders_percent: Some(Percent::new(96.0)),
                largest_holder_percent: Some(Percent::new(80.0)),
                whale_addresses: Default::default(),
            },
            contract: Contract {
                mint_authority_revoked: false,
                freeze_authority_revoked: false,
                is_honeypot: false,
                has_transfer_fee: false,
                transfer_fee_percent: None,
            },
            social: Social::default(),
            rugcheck_score: None,
        };
        let verdict = classify(&facts);
        assert!(verdict.score < 20, "score was {}", verdict.score);
        assert_eq!(verdict.level, RiskLevel::Extreme);
        assert!(!verdict.is_honeypot_override());
    }

    #[test]
    fn top10_at_80_exercises_the_medium_high_boundary() {
        let mut facts = base_facts();
        facts.holders.top10_holders_percent = Some(Percent::new(80.0));
        facts.holders.top20_holders_percent = Some(Percent::new(80.0));
        let verdict = classify(&facts);
        assert!(verdict.score >= 60, "score was {}", verdict.score);
        assert_eq!(verdict.level, RiskLevel::Medium);
    }

    #[test]
    fn score_is_always_clamped_into_range() {
        let mut facts = base_facts();
        facts.contract.mint_authority_revoked = false;
        facts.contract.freeze_authority_revoked = false;
        facts.holders.total_holders = 2;
        facts.holders.top10_holders_percent = Some(Percent::new(99.0));
        facts.holders.top20_holders_percent = Some(Percent::new(99.0));
        facts.holders.largest_holder_percent = Some(Percent::new(99.0));
        facts.rugcheck_score = Some(0);
        let verdict = classify(&facts);
        assert!(verdict.score <= 100);
    }

    #[test]
    fn classify_is_a_pure_function_of_its_input() {
        let facts = base_facts();
        assert_eq!(classify(&facts), classify(&facts));
    }
}
