use crate::parse;
use async_trait::async_trait;
use domain::error::ErrorKind;
use domain::Address;
use ports::{
    ChainRpcPort, ContractInfo, LiquidityInfo, ParsedTransaction, PortError, Signature,
    SubscriptionId, TokenHolder, TokenInfo,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// How often the polling-based log-subscription fallback checks for new
/// signatures. Real websocket push would notice within a slot or two; this
/// is a coarser approximation (§4.2, REDESIGN FLAGS).
const LOG_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// JSON-RPC 2.0 client against a Solana-style node. Unlike
/// [`http_client::ResilientClient`] (GET-only, built for REST
/// aggregators), chain RPC calls are POST requests carrying a method name
/// and positional params, so this crate talks to `reqwest` directly rather
/// than routing through the shared HTTP client.
pub struct RpcClient {
    http: Client,
    endpoint: Url,
    next_id: AtomicU64,
    subscriptions: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl RpcClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            next_id: AtomicU64::new(1),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| PortError::new(ErrorKind::Transient, err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PortError::new(
                ErrorKind::Transient,
                format!("rpc node returned {status}"),
            ));
        }

        let mut envelope: Value = response
            .json()
            .await
            .map_err(|err| PortError::new(ErrorKind::Validation, err.to_string()))?;

        if let Some(error) = envelope.get("error") {
            return Err(PortError::new(ErrorKind::Validation, error.to_string()));
        }

        Ok(envelope["result"].take())
    }
}

#[async_trait]
impl ChainRpcPort for RpcClient {
    async fn get_slot(&self) -> Result<u64, PortError> {
        let result = self.call("getSlot", json!([])).await?;
        result
            .as_u64()
            .ok_or_else(|| PortError::new(ErrorKind::Validation, "getSlot: non-numeric result"))
    }

    async fn get_signatures_for_address(
        &self,
        address: Address,
        limit: usize,
    ) -> Result<Vec<Signature>, PortError> {
        let result = self
            .call(
                "getSignaturesForAddress",
                json!([address.to_string(), {"limit": limit}]),
            )
            .await?;

        let entries = result.as_array().cloned().unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.get("signature")?.as_str().map(str::to_string))
            .collect())
    }

    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, PortError> {
        let result = self
            .call(
                "getTransaction",
                json!([
                    signature,
                    {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(parse::parsed_transaction(signature, &result)))
    }

    /// Approximates a websocket `logsSubscribe` with an internally-spawned
    /// polling task: no push stream is available over a plain HTTP JSON-RPC
    /// endpoint without also standing up a websocket client, so this polls
    /// `getSignaturesForAddress` on an interval and dedups against what it
    /// has already delivered (§4.2, REDESIGN FLAGS).
    async fn on_logs(
        &self,
        address: Address,
        on_log: Box<dyn Fn(Signature) + Send + Sync>,
    ) -> Result<SubscriptionId, PortError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();

        let handle = tokio::spawn(async move {
            let poller = RpcClient {
                http,
                endpoint,
                next_id: AtomicU64::new(1),
                subscriptions: Mutex::new(HashMap::new()),
            };
            let mut seen = std::collections::HashSet::new();
            let mut ticker = tokio::time::interval(LOG_POLL_INTERVAL);
            loop {
                ticker.tick().await;
                let Ok(signatures) = poller.get_signatures_for_address(address, 20).await else {
                    continue;
                };
                for signature in signatures.into_iter().rev() {
                    if seen.insert(signature.clone()) {
                        on_log(signature);
                    }
                }
            }
        });

        self.subscriptions.lock().unwrap().insert(id, handle);
        Ok(SubscriptionId(id))
    }

    async fn remove_on_logs_listener(&self, id: SubscriptionId) -> Result<(), PortError> {
        if let Some(handle) = self.subscriptions.lock().unwrap().remove(&id.0) {
            handle.abort();
        }
        Ok(())
    }

    async fn get_token_holders(&self, mint: Address) -> Result<Vec<TokenHolder>, PortError> {
        let result = self
            .call("getTokenLargestAccounts", json!([mint.to_string()]))
            .await?;

        let entries = result
            .pointer("/value")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let address = entry.get("address")?.as_str()?.parse().ok()?;
                let balance = entry.pointer("/uiAmount").and_then(Value::as_f64)?;
                Some(TokenHolder { address, balance })
            })
            .collect())
    }

    /// Raydium/pump.fun AMM pool account layouts aren't in scope here (no
    /// grounded reference for decoding them); liquidity facts instead come
    /// from the aggregator adapter and this always degrades to `None`
    /// (§4.5).
    async fn get_liquidity_info(&self, _mint: Address) -> Result<Option<LiquidityInfo>, PortError> {
        Ok(None)
    }

    /// `getTokenSupply` only carries supply and decimals; symbol/name require
    /// either off-chain metadata (Metaplex) or the aggregator adapter, so
    /// both are left blank rather than guessed.
    async fn get_token_info(&self, mint: Address) -> Result<Option<TokenInfo>, PortError> {
        let result = self
            .call("getTokenSupply", json!([mint.to_string()]))
            .await?;

        let Some(amount) = result.pointer("/value") else {
            return Ok(None);
        };
        let Some(supply) = amount.get("uiAmount").and_then(Value::as_f64) else {
            return Ok(None);
        };
        let decimals = amount.get("decimals").and_then(Value::as_u64).unwrap_or(0) as u8;

        Ok(Some(TokenInfo {
            symbol: String::new(),
            name: String::new(),
            supply,
            decimals,
        }))
    }

    async fn get_contract_info(&self, mint: Address) -> Result<Option<ContractInfo>, PortError> {
        let result = self
            .call(
                "getAccountInfo",
                json!([mint.to_string(), {"encoding": "jsonParsed"}]),
            )
            .await?;

        if result.pointer("/value").map(Value::is_null).unwrap_or(true) {
            return Ok(None);
        }

        Ok(Some(parse::contract_info(&result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_client_builds_against_a_url() {
        let client = RpcClient::new(Url::parse("https://api.mainnet-beta.solana.com").unwrap());
        assert_eq!(client.next_id.load(Ordering::Relaxed), 1);
    }
}
