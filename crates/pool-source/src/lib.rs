//! Pool-discovery adapters (C2, §4.2): subscription-stream, polling-REST,
//! and WebSocket-logs, all producing [`domain::PoolEvent`] through the
//! uniform [`PoolSourceAdapter`] capability set.

mod adapter;
mod backoff;
mod dedup;
mod polling;
mod subscription;

pub use adapter::{Emit, PoolSourceAdapter};
pub use polling::PollingAdapter;
pub use subscription::{SubscriptionAdapter, TxParser};
