use crate::Address;
use chrono::{DateTime, Utc};

/// The inferred intent of a parsed transaction touching a tracked wallet
/// (§4.10).
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletActivityKind {
    Buy,
    Sell,
    Transfer,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WalletActivity {
    pub wallet: Address,
    pub signature: String,
    pub kind: WalletActivityKind,
    pub token_mint: Address,
    pub amount: f64,
    pub sol_amount: f64,
    pub timestamp: DateTime<Utc>,
}
