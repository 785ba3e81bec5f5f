use crate::error::PortError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::Address;

/// A single historical transaction signature as returned by the chain.
pub type Signature = String;

#[derive(Clone, Debug, PartialEq)]
pub struct TokenHolder {
    pub address: Address,
    pub balance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub supply: f64,
    pub decimals: u8,
}

/// On-chain LP-token state feeding [`domain::Liquidity`] (§4.5).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiquidityInfo {
    pub total_liquidity_usd: f64,
    pub lp_burned_percent: f64,
    pub lp_locked_percent: f64,
    pub lp_lock_duration_sec: Option<u64>,
}

/// On-chain contract flags feeding [`domain::Contract`] (§4.5).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContractInfo {
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
    pub is_honeypot: bool,
    pub has_transfer_fee: bool,
    pub transfer_fee_percent: Option<f64>,
}

/// One instruction-level record inside a parsed transaction, enough for C10
/// to decide whether a DEX program was invoked and what balances moved.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedTransaction {
    pub signature: Signature,
    pub slot: u64,
    pub block_time: Option<DateTime<Utc>>,
    pub program_ids: Vec<Address>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub sol_balance_change: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenBalance {
    pub owner: Address,
    pub mint: Address,
    pub amount: f64,
}

/// A subscription handle so a caller can later call
/// [`ChainRpcPort::remove_on_logs_listener`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(pub u64);

/// Abstraction over the blockchain's JSON-RPC surface (§6).
///
/// Every method returns a [`PortError`] with an [`domain::error::ErrorKind`]
/// so callers can apply retry/drop/fail-fast policy without knowing the
/// concrete RPC client.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait ChainRpcPort: Send + Sync {
    async fn get_slot(&self) -> Result<u64, PortError>;

    async fn get_signatures_for_address(
        &self,
        address: Address,
        limit: usize,
    ) -> Result<Vec<Signature>, PortError>;

    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, PortError>;

    /// Registers a log subscription for `address`; `on_log` callers are
    /// pushed new signatures as they arrive. Implementations own the
    /// websocket lifecycle and reconnect with backoff on drop (§4.2).
    async fn on_logs(
        &self,
        address: Address,
        on_log: Box<dyn Fn(Signature) + Send + Sync>,
    ) -> Result<SubscriptionId, PortError>;

    async fn remove_on_logs_listener(&self, id: SubscriptionId) -> Result<(), PortError>;

    async fn get_token_holders(&self, mint: Address) -> Result<Vec<TokenHolder>, PortError>;

    async fn get_liquidity_info(&self, mint: Address) -> Result<Option<LiquidityInfo>, PortError>;

    async fn get_token_info(&self, mint: Address) -> Result<Option<TokenInfo>, PortError>;

    async fn get_contract_info(&self, mint: Address) -> Result<Option<ContractInfo>, PortError>;
}
