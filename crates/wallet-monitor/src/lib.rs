//! Wallet-activity monitoring (C10, §4.10): subscribes to a tracked wallet's
//! on-chain logs, falls back to polling its signature history as a backstop,
//! and classifies each new transaction touching the wallet's token balances
//! as a buy, sell, or transfer.

mod classify;
mod monitor;
mod processing;

pub use classify::classify_activity;
pub use monitor::{ActivityEmit, WalletMonitor, WalletMonitorConfig};
