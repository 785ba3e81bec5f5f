use crate::byte_array::ByteArray;
use domain::TokenOutcome;
use ports::PendingOutcomeRow;
use sqlx::{PgConnection, Row};

pub async fn insert_initial(
    ex: &mut PgConnection,
    row: &PendingOutcomeRow,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO token_outcomes
    (token_mint, symbol, initial_price, initial_liquidity, initial_holders,
     initial_risk_score, discovered_at, kind, confidence, peak_multiplier,
     time_to_peak_sec, time_to_outcome_sec, peak_price, peak_liquidity,
     final_price, final_liquidity, classified_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL)
ON CONFLICT (token_mint) DO NOTHING
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(row.token_mint))
        .bind(&row.symbol)
        .bind(row.initial_price)
        .bind(row.initial_liquidity)
        .bind(row.initial_holders as i64)
        .bind(row.initial_risk_score as i16)
        .bind(row.discovered_at)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn finalize(ex: &mut PgConnection, outcome: &TokenOutcome) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
UPDATE token_outcomes SET
    kind = $2, confidence = $3, peak_multiplier = $4,
    time_to_peak_sec = $5, time_to_outcome_sec = $6,
    peak_price = $7, peak_liquidity = $8,
    final_price = $9, final_liquidity = $10, classified_at = $11
WHERE token_mint = $1
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(outcome.mint))
        .bind(outcome_kind_str(outcome.kind))
        .bind(outcome.confidence)
        .bind(outcome.peak_multiplier)
        .bind(outcome.time_to_peak_sec)
        .bind(outcome.time_to_outcome_sec)
        .bind(outcome.peak_price)
        .bind(outcome.peak_liquidity)
        .bind(outcome.final_price)
        .bind(outcome.final_liquidity)
        .bind(outcome.classified_at)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn pending(ex: &mut PgConnection) -> Result<Vec<PendingOutcomeRow>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT token_mint, symbol, initial_price, initial_liquidity, initial_holders,
       initial_risk_score, discovered_at
FROM token_outcomes
WHERE classified_at IS NULL
    ;"#;
    let rows = sqlx::query(QUERY).fetch_all(ex).await?;
    rows.into_iter()
        .map(|row| {
            let mint: ByteArray<32> = row.try_get("token_mint")?;
            let holders: i64 = row.try_get("initial_holders")?;
            let risk_score: i16 = row.try_get("initial_risk_score")?;
            Ok(PendingOutcomeRow {
                token_mint: mint.into_address(),
                symbol: row.try_get("symbol")?,
                initial_price: row.try_get("initial_price")?,
                initial_liquidity: row.try_get("initial_liquidity")?,
                initial_holders: holders as u64,
                initial_risk_score: risk_score as u8,
                discovered_at: row.try_get("discovered_at")?,
            })
        })
        .collect()
}

fn outcome_kind_str(kind: domain::OutcomeKind) -> &'static str {
    match kind {
        domain::OutcomeKind::Rug => "rug",
        domain::OutcomeKind::Pump => "pump",
        domain::OutcomeKind::Stable => "stable",
        domain::OutcomeKind::SlowDecline => "slow_decline",
        domain::OutcomeKind::Unknown => "unknown",
    }
}
