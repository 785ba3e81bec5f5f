//! Postgres-backed implementation of [`ports::PersistencePort`] (§13).
//!
//! Follows the teacher's `database` crate conventions: one module per
//! table, queries take `&mut PgConnection` so callers decide whether to
//! run inside a transaction, and a fixed-size [`byte_array::ByteArray`]
//! wrapper bridges `domain::Address` to Postgres `bytea` columns.

mod alerts;
mod analyses;
mod byte_array;
mod ml_samples;
mod pool_discoveries;
mod token_outcomes;

use async_trait::async_trait;
use domain::error::ErrorKind;
use domain::{Address, TokenOutcome};
use ports::{
    AlertRecord, AnalysisRecord, MlSampleRecord, PendingOutcomeRow, PersistencePort,
    PoolDiscoveryRecord, PortError,
};
use sqlx::PgPool;

/// Every table this crate owns, in dependency order. Mirrors the
/// teacher's `database::ALL_TABLES`; used by tests to truncate between
/// runs.
pub const ALL_TABLES: &[&str] = &[
    "alerts",
    "analyses",
    "token_outcomes",
    "pool_discoveries",
    "ml_samples",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS analyses (
    id BIGSERIAL PRIMARY KEY,
    pool_address bytea NOT NULL,
    token_mint bytea NOT NULL,
    facts jsonb NOT NULL,
    verdict jsonb NOT NULL,
    analyzed_at timestamptz NOT NULL
);
CREATE INDEX IF NOT EXISTS analyses_analyzed_at_idx ON analyses (analyzed_at);

CREATE TABLE IF NOT EXISTS alerts (
    id BIGSERIAL PRIMARY KEY,
    token_mint bytea NOT NULL,
    chat_id text NOT NULL,
    alert_type text NOT NULL,
    sent_at timestamptz NOT NULL
);
CREATE INDEX IF NOT EXISTS alerts_dedup_idx ON alerts (token_mint, chat_id, alert_type, sent_at);

CREATE TABLE IF NOT EXISTS token_outcomes (
    token_mint bytea PRIMARY KEY,
    symbol text NOT NULL,
    initial_price double precision NOT NULL,
    initial_liquidity double precision NOT NULL,
    initial_holders bigint NOT NULL,
    initial_risk_score smallint NOT NULL,
    discovered_at timestamptz NOT NULL,
    kind text,
    confidence double precision,
    peak_multiplier double precision,
    time_to_peak_sec bigint,
    time_to_outcome_sec bigint,
    peak_price double precision,
    peak_liquidity double precision,
    final_price double precision,
    final_liquidity double precision,
    classified_at timestamptz
);

CREATE TABLE IF NOT EXISTS pool_discoveries (
    id BIGSERIAL PRIMARY KEY,
    pool_address bytea NOT NULL,
    token_mint bytea NOT NULL,
    source text NOT NULL,
    discovered_at timestamptz NOT NULL
);
CREATE INDEX IF NOT EXISTS pool_discoveries_discovered_at_idx ON pool_discoveries (discovered_at);

CREATE TABLE IF NOT EXISTS ml_samples (
    id BIGSERIAL PRIMARY KEY,
    token_mint bytea NOT NULL,
    initial_price double precision NOT NULL,
    initial_liquidity double precision NOT NULL,
    initial_holders bigint NOT NULL,
    initial_risk_score smallint NOT NULL,
    peak_multiplier double precision NOT NULL,
    outcome_kind text NOT NULL,
    confidence double precision NOT NULL,
    recorded_at timestamptz NOT NULL
);
"#;

/// Connection pool handle implementing [`PersistencePort`] against a
/// Postgres database.
#[derive(Clone)]
pub struct PgPersistence {
    pool: PgPool,
}

impl PgPersistence {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Deletes all rows from every table. Test-only: named after the
    /// teacher's `clear_DANGER_` helper to make misuse in non-test code
    /// obvious at a glance.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn clear_DANGER_(&self) -> Result<(), sqlx::Error> {
        for table in ALL_TABLES {
            sqlx::query(&format!("TRUNCATE TABLE {table};"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

fn map_err(err: sqlx::Error) -> PortError {
    PortError::new(ErrorKind::Transient, err.to_string())
}

#[async_trait]
impl PersistencePort for PgPersistence {
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        analyses::insert(&mut *conn, record).await.map_err(map_err)
    }

    async fn save_alert(&self, record: &AlertRecord) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        alerts::insert(&mut *conn, record).await.map_err(map_err)
    }

    async fn was_alert_sent(
        &self,
        mint: Address,
        chat_id: &str,
        alert_type: &str,
        within: chrono::Duration,
    ) -> Result<bool, PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        let since = chrono::Utc::now() - within;
        alerts::was_sent_within(&mut *conn, mint, chat_id, alert_type, since)
            .await
            .map_err(map_err)
    }

    async fn get_recent_analyses(
        &self,
        since: chrono::DateTime<chrono::Utc>,
        limit: usize,
    ) -> Result<Vec<ports::RecentAnalysisRow>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        analyses::recent(&mut *conn, since, limit as i64)
            .await
            .map_err(map_err)
    }

    async fn save_token_outcome_initial(&self, row: &PendingOutcomeRow) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        token_outcomes::insert_initial(&mut *conn, row)
            .await
            .map_err(map_err)
    }

    async fn save_token_outcome_final(&self, outcome: &TokenOutcome) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        token_outcomes::finalize(&mut *conn, outcome)
            .await
            .map_err(map_err)
    }

    async fn get_pending_outcomes(&self) -> Result<Vec<PendingOutcomeRow>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        token_outcomes::pending(&mut *conn).await.map_err(map_err)
    }

    async fn save_pool_discovery(&self, record: &PoolDiscoveryRecord) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        pool_discoveries::insert(&mut *conn, record)
            .await
            .map_err(map_err)
    }

    async fn save_ml_sample(&self, record: &MlSampleRecord) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(map_err)?;
        ml_samples::insert(&mut *conn, record).await.map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{EnrichmentFacts, OutcomeKind, RiskVerdict};
    use std::env;

    async fn test_db() -> PgPersistence {
        let url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://postgres@localhost/pool_sniper_test".to_string());
        let db = PgPersistence::connect(&url).await.expect("connect");
        db.migrate().await.expect("migrate");
        db.clear_DANGER_().await.expect("clear");
        db
    }

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres instance"]
    async fn analysis_round_trip() {
        let db = test_db().await;
        let record = AnalysisRecord {
            pool_address: addr(1),
            token_mint: addr(2),
            facts: EnrichmentFacts::default(),
            verdict: RiskVerdict {
                score: 42,
                level: domain::RiskLevel::High,
                factors: vec![],
            },
            analyzed_at: chrono::Utc::now(),
        };
        db.save_analysis(&record).await.expect("save");

        let recent = db
            .get_recent_analyses(record.analyzed_at - chrono::Duration::seconds(1), 10)
            .await
            .expect("recent");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].token_mint, addr(2));
        assert_eq!(recent[0].score, 42);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres instance"]
    async fn alert_dedup_round_trip() {
        let db = test_db().await;
        let record = AlertRecord {
            token_mint: addr(3),
            chat_id: "chat-1".to_string(),
            alert_type: "new_pool".to_string(),
            sent_at: chrono::Utc::now(),
        };
        db.save_alert(&record).await.expect("save");

        let sent = db
            .was_alert_sent(
                addr(3),
                "chat-1",
                "new_pool",
                chrono::Duration::seconds(60),
            )
            .await
            .expect("lookup");
        assert!(sent);

        let not_sent = db
            .was_alert_sent(
                addr(3),
                "chat-1",
                "rug_warning",
                chrono::Duration::seconds(60),
            )
            .await
            .expect("lookup");
        assert!(!not_sent);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres instance"]
    async fn token_outcome_round_trip() {
        let db = test_db().await;
        let pending = PendingOutcomeRow {
            token_mint: addr(4),
            symbol: "FOO".to_string(),
            initial_price: 0.001,
            initial_liquidity: 5_000.0,
            initial_holders: 12,
            initial_risk_score: 55,
            discovered_at: chrono::Utc::now(),
        };
        db.save_token_outcome_initial(&pending).await.expect("save");

        let pending_rows = db.get_pending_outcomes().await.expect("pending");
        assert_eq!(pending_rows.len(), 1);
        assert_eq!(pending_rows[0].token_mint, addr(4));

        let outcome = TokenOutcome {
            mint: addr(4),
            kind: OutcomeKind::Rug,
            confidence: 0.8,
            peak_multiplier: 1.1,
            time_to_peak_sec: 120,
            time_to_outcome_sec: 3600,
            initial_price: pending.initial_price,
            initial_liquidity: pending.initial_liquidity,
            peak_price: 0.0011,
            peak_liquidity: 5_200.0,
            final_price: 0.0001,
            final_liquidity: 400.0,
            classified_at: chrono::Utc::now(),
        };
        db.save_token_outcome_final(&outcome).await.expect("finalize");

        let pending_rows = db.get_pending_outcomes().await.expect("pending");
        assert!(pending_rows.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres instance"]
    async fn pool_discovery_insert_does_not_error() {
        let db = test_db().await;
        let record = ports::PoolDiscoveryRecord {
            pool_address: addr(5),
            token_mint: addr(6),
            source: "RaydiumSubscription".to_string(),
            discovered_at: chrono::Utc::now(),
        };
        db.save_pool_discovery(&record).await.expect("save");
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres instance"]
    async fn ml_sample_insert_does_not_error() {
        let db = test_db().await;
        let record = ports::MlSampleRecord {
            token_mint: addr(7),
            initial_price: 0.001,
            initial_liquidity: 5_000.0,
            initial_holders: 10,
            initial_risk_score: 40,
            peak_multiplier: 2.5,
            outcome_kind: OutcomeKind::Pump,
            confidence: 0.6,
            recorded_at: chrono::Utc::now(),
        };
        db.save_ml_sample(&record).await.expect("save");
    }
}
