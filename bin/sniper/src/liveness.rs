use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use telemetry::metrics::LivenessChecking;
use wallet_monitor::WalletMonitor;

/// Aggregates every long-running component's liveness into the single
/// registry the `/metrics` endpoint and the `health` subcommand both read
/// from (§10: "health and /metrics never disagree").
pub struct Liveness {
    pool_sources_alive: Arc<AtomicBool>,
    wallet_monitors: Vec<Arc<WalletMonitor>>,
}

impl Liveness {
    pub fn new(pool_sources_alive: Arc<AtomicBool>, wallet_monitors: Vec<Arc<WalletMonitor>>) -> Self {
        Self {
            pool_sources_alive,
            wallet_monitors,
        }
    }
}

impl LivenessChecking for Liveness {
    fn name(&self) -> &str {
        "sniper"
    }

    /// Alive iff pool discovery is still running and every registered
    /// wallet monitor is still running. The queue's own depth/backpressure
    /// state is exposed through metrics rather than folded into a single
    /// boolean here.
    fn is_alive(&self) -> bool {
        self.pool_sources_alive.load(Ordering::SeqCst)
            && self.wallet_monitors.iter().all(|m| m.is_alive())
    }
}
