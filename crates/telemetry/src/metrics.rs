use axum::{extract::State, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use std::{net::SocketAddr, sync::Arc, sync::OnceLock};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Returns the process-global Prometheus registry, creating it on first use.
///
/// Every component registers its own metrics here at construction time; the
/// registry is otherwise a read-only projection of in-process state (§10) —
/// components must never read back their own metrics to drive behaviour.
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// A component that can report whether it is still making progress.
///
/// The `health` CLI subcommand and the `/metrics` endpoint both read through
/// this trait so they can never disagree (§10, §15).
pub trait LivenessChecking: Send + Sync {
    fn name(&self) -> &str;
    fn is_alive(&self) -> bool;
}

async fn serve_metrics() -> String {
    let metric_families = get_registry().gather();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metric_families, &mut buffer)
        .expect("prometheus text encoding never fails for well-formed metrics");
    String::from_utf8(buffer).expect("prometheus text encoder emits valid utf8")
}

/// Spawns the `/metrics` HTTP endpoint on `port`, following the sibling
/// `alerter` binary's convention of a dedicated metrics port (default 9588).
pub async fn serve(port: u16) -> std::io::Result<()> {
    let app = Router::new().route("/metrics", get(serve_metrics));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn serve_health(State(liveness): State<Arc<dyn LivenessChecking>>) -> StatusCode {
    if liveness.is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Like [`serve`], but also exposes `/health`, backed by `liveness`, so the
/// `health` CLI subcommand and an external load balancer can both observe
/// the same in-process liveness state the `/metrics` endpoint reports on
/// (§10, §15).
pub async fn serve_with_liveness(
    port: u16,
    liveness: Arc<dyn LivenessChecking>,
) -> std::io::Result<()> {
    let app = Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/health", get(serve_health))
        .with_state(liveness);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    #[test]
    fn registered_counters_are_gathered() {
        let counter = IntCounter::new("sniper_test_total", "test counter").unwrap();
        get_registry().register(Box::new(counter.clone())).ok();
        counter.inc();
        let families = get_registry().gather();
        assert!(families.iter().any(|f| f.get_name() == "sniper_test_total"));
    }
}
