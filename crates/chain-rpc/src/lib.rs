//! Concrete [`ports::ChainRpcPort`] adapter against a Solana-style JSON-RPC
//! node (§6).

mod client;
mod parse;

pub use client::RpcClient;
