use crate::byte_array::ByteArray;
use ports::{AnalysisRecord, RecentAnalysisRow};
use sqlx::{types::Json, PgConnection, Row};

pub async fn insert(ex: &mut PgConnection, record: &AnalysisRecord) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO analyses (pool_address, token_mint, facts, verdict, analyzed_at)
VALUES ($1, $2, $3, $4, $5)
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(record.pool_address))
        .bind(ByteArray::from_address(record.token_mint))
        .bind(Json(&record.facts))
        .bind(Json(&record.verdict))
        .bind(record.analyzed_at)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn recent(
    ex: &mut PgConnection,
    since: chrono::DateTime<chrono::Utc>,
    limit: i64,
) -> Result<Vec<RecentAnalysisRow>, sqlx::Error> {
    const QUERY: &str = r#"
SELECT token_mint, (verdict->>'score')::int AS score, analyzed_at
FROM analyses
WHERE analyzed_at >= $1
ORDER BY analyzed_at DESC
LIMIT $2
    ;"#;
    let rows = sqlx::query(QUERY)
        .bind(since)
        .bind(limit)
        .fetch_all(ex)
        .await?;
    rows.into_iter()
        .map(|row| {
            let mint: ByteArray<32> = row.try_get("token_mint")?;
            let score: i32 = row.try_get("score")?;
            Ok(RecentAnalysisRow {
                token_mint: mint.into_address(),
                score: score as u8,
                analyzed_at: row.try_get("analyzed_at")?,
            })
        })
        .collect()
}
