use crate::byte_array::ByteArray;
use ports::MlSampleRecord;
use sqlx::PgConnection;

pub async fn insert(ex: &mut PgConnection, record: &MlSampleRecord) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO ml_samples
    (token_mint, initial_price, initial_liquidity, initial_holders,
     initial_risk_score, peak_multiplier, outcome_kind, confidence, recorded_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(record.token_mint))
        .bind(record.initial_price)
        .bind(record.initial_liquidity)
        .bind(record.initial_holders as i64)
        .bind(record.initial_risk_score as i16)
        .bind(record.peak_multiplier)
        .bind(outcome_kind_str(record.outcome_kind))
        .bind(record.confidence)
        .bind(record.recorded_at)
        .execute(ex)
        .await?;
    Ok(())
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
