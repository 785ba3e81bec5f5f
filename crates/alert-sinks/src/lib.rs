//! Outbound alert fan-out across pluggable sinks (C8, §4.8).
//!
//! Every sink in the set receives the alert; one sink's failure is isolated
//! and never blocks its peers. Only the designated primary sink's success
//! triggers `mark_alert_sent` on the caller's behalf (the dedup/rate-limit
//! service itself is injected, not owned, by this crate).

use domain::Alert;
use ports::Sink;
use std::sync::Arc;

/// Per-sink outcome of one fan-out dispatch, in registration order.
pub struct DispatchResult {
    pub sink_name: String,
    pub delivered: bool,
    pub error: Option<String>,
}

pub struct AlertDispatcher {
    /// First sink in the list is the primary: its success gates
    /// `mark_alert_sent` (§4.8).
    sinks: Vec<Arc<dyn Sink>>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Dispatches `alert` to every sink concurrently. Returns `true` iff the
    /// primary sink (the first one registered) delivered successfully.
    pub async fn dispatch(&self, alert: &Alert) -> (bool, Vec<DispatchResult>) {
        let futures = self.sinks.iter().map(|sink| async move {
            let result = sink.send(alert).await;
            if !result.delivered {
                tracing::warn!(
                    sink = sink.name(),
                    token_mint = %alert.token_mint,
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "alert sink failed, isolated from peers"
                );
            }
            DispatchResult {
                sink_name: sink.name().to_string(),
                delivered: result.delivered,
                error: result.error,
            }
        });
        let results = futures::future::join_all(futures).await;
        let primary_delivered = results.first().is_some_and(|r| r.delivered);
        (primary_delivered, results)
    }
}
