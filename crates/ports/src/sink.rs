use async_trait::async_trait;
use domain::Alert;

/// Outcome of a single sink dispatch attempt (§6). Never an `Err`: a sink
/// failure is data the dispatcher inspects, not a Rust error, so one
/// misbehaving sink can't unwind the whole fan-out.
#[derive(Clone, Debug, PartialEq)]
pub struct SendResult {
    pub delivered: bool,
    pub error: Option<String>,
}

impl SendResult {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            error: Some(error.into()),
        }
    }
}

/// A destination an [`Alert`] can be dispatched to (§4.8). Implementations:
/// chat, dashboard-append, persistence-write. Retries, if any, are the
/// sink's own concern — the dispatcher never retries on a sink's behalf.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, alert: &Alert) -> SendResult;
}
