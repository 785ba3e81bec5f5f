//! The error-kind taxonomy shared across components (§7).
//!
//! Each component crate defines its own `thiserror` error enum for its own
//! operations, but every variant maps onto one of these kinds so that
//! cross-cutting policy (retry, drop, fail-fast, shutdown) can be decided
//! generically by callers such as the analysis queue's worker loop.

/// Classifies *how* a failure should be handled, independent of which
/// component raised it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Network error or HTTP 5xx/429: safe to retry with backoff.
    Transient,
    /// Caller should wait and retry; distinct from `Transient` in that a
    /// wait duration is usually already known (e.g. token-bucket).
    RateLimited,
    /// Response failed validation; retrying won't help, drop the data.
    Validation,
    /// Circuit breaker is open; fail fast without attempting I/O.
    CircuitOpen,
    /// Configuration is invalid; fatal at startup.
    ConfigError,
    /// The requested entity does not exist; treat as an absent fact.
    NotFound,
    /// Unrecoverable; the process should shut down.
    Fatal,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimited)
    }
}
