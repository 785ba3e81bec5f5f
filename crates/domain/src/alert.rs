use crate::{Address, RiskVerdict};
use chrono::{DateTime, Utc};

/// The category a dispatched alert belongs to (§4.7); user config can enable
/// or disable each independently.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    NewToken,
    VolumeSpike,
    WhaleMovement,
    LiquidityDrain,
    AuthorityChange,
    WalletActivity,
}

/// Coarse urgency used by C7's minimum-priority filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum AlertPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// A fully composed alert ready for fan-out through C8.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Alert {
    pub token_mint: Address,
    pub chat_id: String,
    pub category: AlertCategory,
    pub priority: AlertPriority,
    pub verdict: RiskVerdict,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
