//! Trait boundaries between the core pipeline and its external collaborators
//! (§6): chain RPC, the DEX-aggregator HTTP API, the persistence store, and
//! outbound alert sinks. Concrete adapters live in other crates or in the
//! binary; tests substitute `mockall` fakes behind the `test-util` feature.

mod aggregator;
mod chain_rpc;
mod error;
mod persistence;
mod sink;

pub use aggregator::{AggregatorPort, TokenBoost, TokenMarketFacts, TokenSocialFacts};
pub use chain_rpc::{
    ChainRpcPort, ContractInfo, LiquidityInfo, ParsedTransaction, Signature, SubscriptionId,
    TokenBalance, TokenHolder, TokenInfo,
};
pub use error::PortError;
pub use persistence::{
    AlertRecord, AnalysisRecord, MlSampleRecord, PendingOutcomeRow, PersistencePort,
    PoolDiscoveryRecord, RecentAnalysisRow,
};
pub use sink::{SendResult, Sink};

#[cfg(any(test, feature = "test-util"))]
pub use aggregator::MockAggregatorPort;
#[cfg(any(test, feature = "test-util"))]
pub use chain_rpc::MockChainRpcPort;
#[cfg(any(test, feature = "test-util"))]
pub use persistence::MockPersistencePort;
#[cfg(any(test, feature = "test-util"))]
pub use sink::MockSink;
