use crate::byte_array::ByteArray;
use chrono::{DateTime, Utc};
use ports::AlertRecord;
use sqlx::PgConnection;

pub async fn insert(ex: &mut PgConnection, record: &AlertRecord) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO alerts (token_mint, chat_id, alert_type, sent_at)
VALUES ($1, $2, $3, $4)
    ;"#;
    sqlx::query(QUERY)
        .bind(ByteArray::from_address(record.token_mint))
        .bind(&record.chat_id)
        .bind(&record.alert_type)
        .bind(record.sent_at)
        .execute(ex)
        .await?;
    Ok(())
}

/// Backs `was_alert_sent`: true iff an alert for `(mint, chat_id, alert_type)`
/// was recorded within the last `within` seconds of `now` (§6).
pub async fn was_sent_within(
    ex: &mut PgConnection,
    mint: domain::Address,
    chat_id: &str,
    alert_type: &str,
    since: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    const QUERY: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM alerts
    WHERE token_mint = $1 AND chat_id = $2 AND alert_type = $3 AND sent_at >= $4
)
    ;"#;
    let (exists,): (bool,) = sqlx::query_as(QUERY)
        .bind(ByteArray::from_address(mint))
        .bind(chat_id)
        .bind(alert_type)
        .bind(since)
        .fetch_one(ex)
        .await?;
    Ok(exists)
}
