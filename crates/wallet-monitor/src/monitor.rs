use crate::{classify::classify_activity, processing::ProcessingSet};
use domain::{Address, WalletActivity};
use ports::ChainRpcPort;
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{mpsc, Mutex};

const PROCESSING_SET_CAPACITY: usize = 10_000;

/// Callback invoked once per classified [`WalletActivity`].
pub type ActivityEmit = Arc<dyn Fn(WalletActivity) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct WalletMonitorConfig {
    /// Program IDs recognized as DEX swap programs (§4.10).
    pub dex_program_ids: HashSet<Address>,
    /// Fallback poll cadence, run alongside the subscription as a backstop
    /// against missed log events (§4.10: "subscription-first, polling-fallback").
    pub poll_interval: Duration,
    /// Signature-history depth fetched per poll.
    pub poll_signature_limit: usize,
}

impl Default for WalletMonitorConfig {
    fn default() -> Self {
        Self {
            dex_program_ids: HashSet::new(),
            poll_interval: Duration::from_secs(30),
            poll_signature_limit: 20,
        }
    }
}

/// One reconnecting doubling backoff, local to this crate so it doesn't need
/// to depend on `pool-source` for a handful of lines (§4.2's reconnect policy
/// applies here too, per §4.10).
struct Backoff {
    current: Duration,
    base: Duration,
    max: Duration,
}

impl Backoff {
    fn new(base: Duration, max: Duration) -> Self {
        Self { current: base, base, max }
    }

    fn reset(&mut self) {
        self.current = self.base;
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }
}

/// Monitors one wallet address for DEX buy/sell/transfer activity (C10,
/// §4.10): subscribes to its logs and, concurrently, polls its signature
/// history as a backstop, routing every signature through a shared
/// [`ProcessingSet`] so either path observing the same signature handles it
/// exactly once.
pub struct WalletMonitor {
    wallet: Address,
    chain: Arc<dyn ChainRpcPort>,
    config: WalletMonitorConfig,
    processing: Mutex<ProcessingSet>,
    running: AtomicBool,
}

impl WalletMonitor {
    pub fn new(wallet: Address, chain: Arc<dyn ChainRpcPort>, config: WalletMonitorConfig) -> Self {
        Self {
            wallet,
            chain,
            config,
            processing: Mutex::new(ProcessingSet::new(PROCESSING_SET_CAPACITY)),
            running: AtomicBool::new(false),
        }
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    /// Runs the subscription loop and the polling-fallback loop concurrently
    /// until [`Self::stop`] is called. Either loop's failure is isolated:
    /// the other keeps the wallet observed (§4.2 "a single adapter failure
    /// is isolated").
    pub async fn start(self: &Arc<Self>, emit: ActivityEmit) {
        self.running.store(true, Ordering::SeqCst);
        let subscription = self.clone().run_subscription(emit.clone());
        let polling = self.clone().run_polling(emit);
        tokio::join!(subscription, polling);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn handle_signature(&self, signature: String, emit: &ActivityEmit) {
        {
            let mut processing = self.processing.lock().await;
            if !processing.try_claim(&signature) {
                return;
            }
        }

        let tx = match self.chain.get_parsed_transaction(&signature).await {
            Ok(Some(tx)) => tx,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(signature, error = %e, "failed to fetch parsed transaction for wallet activity");
                return;
            }
        };

        if let Some(activity) = classify_activity(self.wallet, &tx, &self.config.dex_program_ids) {
            emit(activity);
        }
    }

    async fn run_subscription(self: Arc<Self>, emit: ActivityEmit) {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));

        while self.is_running() {
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            let callback: Box<dyn Fn(String) + Send + Sync> = Box::new(move |sig| {
                let _ = tx.send(sig);
            });

            let subscription = self.chain.on_logs(self.wallet, callback).await;
            let subscription_id = match subscription {
                Ok(id) => id,
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        wallet = %self.wallet,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "wallet log subscription failed, relying on poll fallback while reconnecting"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };
            backoff.reset();

            while self.is_running() {
                match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                    Ok(Some(signature)) => self.handle_signature(signature, &emit).await,
                    Ok(None) => break,
                    Err(_) => continue,
                }
            }

            if let Err(e) = self.chain.remove_on_logs_listener(subscription_id).await {
                tracing::debug!(error = %e, "failed to remove wallet log listener during shutdown/reconnect");
            }
        }
    }

    async fn run_polling(self: Arc<Self>, emit: ActivityEmit) {
        while self.is_running() {
            tokio::time::sleep(self.config.poll_interval).await;
            if !self.is_running() {
                break;
            }
            match self
                .chain
                .get_signatures_for_address(self.wallet, self.config.poll_signature_limit)
                .await
            {
                Ok(signatures) => {
                    for signature in signatures {
                        self.handle_signature(signature, &emit).await;
                    }
                }
                Err(e) => {
                    tracing::debug!(wallet = %self.wallet, error = %e, "wallet poll fallback failed");
                }
            }
        }
    }
}

impl WalletMonitor {
    /// Whether either loop is still running, surfaced for the binary's
    /// liveness registry (§10).
    pub fn is_alive(&self) -> bool {
        self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ports::{MockChainRpcPort, ParsedTransaction, TokenBalance};
    use std::sync::atomic::AtomicUsize;

    fn wallet() -> Address {
        Address([5; 32])
    }

    #[tokio::test]
    async fn same_signature_from_both_paths_is_handled_once() {
        let mut chain = MockChainRpcPort::new();
        chain.expect_get_parsed_transaction().times(1).returning(|sig| {
            let sig = sig.to_string();
            Box::pin(async move {
                Ok(Some(ParsedTransaction {
                    signature: sig,
                    slot: 1,
                    block_time: Some(Utc::now()),
                    program_ids: vec![],
                    pre_token_balances: vec![TokenBalance {
                        owner: Address([5; 32]),
                        mint: Address([6; 32]),
                        amount: 0.0,
                    }],
                    post_token_balances: vec![TokenBalance {
                        owner: Address([5; 32]),
                        mint: Address([6; 32]),
                        amount: 10.0,
                    }],
                    sol_balance_change: -1.0,
                }))
            })
        });

        let monitor = Arc::new(WalletMonitor::new(
            wallet(),
            Arc::new(chain),
            WalletMonitorConfig::default(),
        ));

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let emit: ActivityEmit = Arc::new(move |_activity| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        monitor.handle_signature("sig-shared".to_string(), &emit).await;
        monitor.handle_signature("sig-shared".to_string(), &emit).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
