use chrono::{DateTime, Utc};
use domain::{OutcomeKind, TokenOutcome, TrackedToken};

/// Confidence assigned when a token's final market data could never be
/// refetched (§4.9: "When missing market data, the token is treated as rug").
const MISSING_MARKET_DATA_CONFIDENCE: f64 = 0.8;

const PUMP_MULTIPLIER_THRESHOLD: f64 = 2.0;
const STABLE_BAND: f64 = 0.30;

/// Pure classification of a [`TrackedToken`]'s price trajectory into a
/// [`TokenOutcome`] (§4.9, L1: reproducible given the same snapshot).
///
/// `has_market_data` is `false` only when the final attempt to refresh this
/// token's price/liquidity failed outright (not merely a missing sub-fact).
pub fn classify_outcome(
    token: &TrackedToken,
    has_market_data: bool,
    now: DateTime<Utc>,
) -> TokenOutcome {
    let time_to_peak_sec = (token.peak_at - token.discovered_at).num_seconds();
    let time_to_outcome_sec = (now - token.discovered_at).num_seconds();
    let peak_multiplier = token.peak_multiplier();

    let (kind, confidence) = if !has_market_data {
        (OutcomeKind::Rug, MISSING_MARKET_DATA_CONFIDENCE)
    } else {
        let liquidity_ratio = ratio(token.current_liquidity, token.initial_liquidity);
        let final_price_ratio = ratio(token.current_price, token.initial_price);

        if liquidity_ratio < 0.20 || final_price_ratio < 0.10 {
            let confidence = ((1.0 - liquidity_ratio) + (1.0 - final_price_ratio)) / 2.0;
            (OutcomeKind::Rug, confidence.min(1.0))
        } else if peak_multiplier >= PUMP_MULTIPLIER_THRESHOLD {
            let confidence = (peak_multiplier - 1.0) / 5.0;
            (OutcomeKind::Pump, confidence.min(1.0))
        } else if (1.0 - final_price_ratio).abs() <= STABLE_BAND {
            let confidence = 1.0 - (1.0 - final_price_ratio).abs() / STABLE_BAND;
            (OutcomeKind::Stable, confidence)
        } else if final_price_ratio < 1.0 {
            (OutcomeKind::SlowDecline, 1.0 - final_price_ratio)
        } else {
            (OutcomeKind::Unknown, 0.5)
        }
    };

    TokenOutcome {
        mint: token.mint,
        kind,
        confidence,
        peak_multiplier,
        time_to_peak_sec,
        time_to_outcome_sec,
        initial_price: token.initial_price,
        initial_liquidity: token.initial_liquidity,
        peak_price: token.peak_price,
        peak_liquidity: token.peak_liquidity,
        final_price: token.current_price,
        final_liquidity: token.current_liquidity,
        classified_at: now,
    }
}

fn ratio(current: f64, initial: f64) -> f64 {
    if initial <= 0.0 {
        0.0
    } else {
        current / initial
    }
}
