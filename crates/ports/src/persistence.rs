use crate::error::PortError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Address, EnrichmentFacts, OutcomeKind, PoolEvent, RiskVerdict, TokenOutcome};

/// A stored record of one pool discovery event, independent of whether it
/// was ever analyzed (§13: `pool_discoveries` table). Kept mostly for
/// after-the-fact coverage auditing — "did C2 see this pool at all" — since
/// the analysis queue may dedup, evict, or skip it before C5 ever runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoolDiscoveryRecord {
    pub pool_address: Address,
    pub token_mint: Address,
    pub source: String,
    pub discovered_at: DateTime<Utc>,
}

impl From<&PoolEvent> for PoolDiscoveryRecord {
    fn from(event: &PoolEvent) -> Self {
        Self {
            pool_address: event.pool_address,
            token_mint: event.token_mint,
            source: format!("{:?}", event.source),
            discovered_at: event.discovered_at,
        }
    }
}

/// One labeled training row for the (out-of-scope) model-training pipeline:
/// a tracked token's starting conditions paired with how it actually
/// resolved (§13 "ml_samples", §1 "only the ML-sample persistence hook is
/// in scope"). This crate only ever writes these; nothing here reads them
/// back or trains on them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MlSampleRecord {
    pub token_mint: Address,
    pub initial_price: f64,
    pub initial_liquidity: f64,
    pub initial_holders: u64,
    pub initial_risk_score: u8,
    pub peak_multiplier: f64,
    pub outcome_kind: OutcomeKind,
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A stored record of one completed analysis (enrich + classify) of a pool.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRecord {
    pub pool_address: Address,
    pub token_mint: Address,
    pub facts: EnrichmentFacts,
    pub verdict: RiskVerdict,
    pub analyzed_at: DateTime<Utc>,
}

/// A stored record of one dispatched alert, keyed for `was_alert_sent`
/// dedup lookups (§6).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlertRecord {
    pub token_mint: Address,
    pub chat_id: String,
    pub alert_type: String,
    pub sent_at: DateTime<Utc>,
}

/// A row of `get_recent_analyses`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecentAnalysisRow {
    pub token_mint: Address,
    pub score: u8,
    pub analyzed_at: DateTime<Utc>,
}

/// A row of `get_pending_outcomes`: a tracked token still awaiting
/// classification, persisted so C9 survives a restart.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PendingOutcomeRow {
    pub token_mint: Address,
    pub symbol: String,
    pub initial_price: f64,
    pub initial_liquidity: f64,
    pub initial_holders: u64,
    pub initial_risk_score: u8,
    pub discovered_at: DateTime<Utc>,
}

/// Abstraction over the embedded relational store (§6). The on-disk schema
/// is an implementation detail; callers only rely on the round-trip
/// behaviour documented per method.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait PersistencePort: Send + Sync {
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), PortError>;

    async fn save_alert(&self, record: &AlertRecord) -> Result<(), PortError>;

    async fn was_alert_sent(
        &self,
        mint: Address,
        chat_id: &str,
        alert_type: &str,
        within: chrono::Duration,
    ) -> Result<bool, PortError>;

    async fn get_recent_analyses(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RecentAnalysisRow>, PortError>;

    async fn save_token_outcome_initial(&self, row: &PendingOutcomeRow) -> Result<(), PortError>;

    async fn save_token_outcome_final(&self, outcome: &TokenOutcome) -> Result<(), PortError>;

    async fn get_pending_outcomes(&self) -> Result<Vec<PendingOutcomeRow>, PortError>;

    async fn save_pool_discovery(&self, record: &PoolDiscoveryRecord) -> Result<(), PortError>;

    async fn save_ml_sample(&self, record: &MlSampleRecord) -> Result<(), PortError>;
}
