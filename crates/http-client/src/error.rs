/// Error kinds surfaced by [`crate::ResilientClient::get`] (§4.1, §7).
///
/// `get` never propagates these as a Rust `Err` to its caller — per the
/// component contract it always returns a [`crate::GetResponse`] whose
/// `error` field carries this rendered as a string. The type still exists so
/// internal retry/breaker logic can match on it structurally.
#[derive(Debug, thiserror::Error, Clone)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http {status}")]
    Http { status: u16 },
    #[error("validation-failed:{0}")]
    Validation(String),
    #[error("circuit-open")]
    CircuitOpen,
    #[error("rate-limit-timeout")]
    RateLimitTimeout,
}

impl ClientError {
    /// Transient per §4.1: network errors or HTTP 5xx/429 are retried;
    /// every other 4xx is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status } => *status == 429 || (500..600).contains(status),
            Self::Validation(_) | Self::CircuitOpen | Self::RateLimitTimeout => false,
        }
    }
}
