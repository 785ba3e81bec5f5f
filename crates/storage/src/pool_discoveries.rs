use crate::byte_array::ByteArray;
use ports::PoolDiscoveryRecord;
use sqlx::PgConnection;

/// Every pool C2 ever saw, regardless of whether the queue went on to
/// analyze it. Purely a write-through audit trail (§13); nothing in this
/// crate reads it back.
pub async fn insert(
    ex: &mut PgConnection,
    record: &PoolDiscoveryRecord,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO pool_discoveries (pool_address, token_mint, source, discovered_at)
VALUES ($1, $2, $3, $4)
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(record.pool_address))
        .bind(ByteArray::from_address(record.token_mint))
        .bind(&record.source)
        .bind(record.discovered_at)
        .execute(ex)
        .await?;
    Ok(())
}
