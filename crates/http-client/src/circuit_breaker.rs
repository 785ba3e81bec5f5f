use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Closed,
    Open { tripped_at: Instant },
    HalfOpen,
}

/// Three-state circuit breaker (§4.1).
///
/// `closed -> open` after `threshold` consecutive failures. `open` rejects
/// every call with [`crate::ClientError::CircuitOpen`] and performs zero
/// network I/O until `reset_time` has elapsed, then allows exactly one probe
/// (`half-open`). The probe's outcome decides whether the breaker resets to
/// `closed` or trips again with a fresh `tripped_at`.
pub struct CircuitBreaker {
    threshold: u32,
    reset_time: Duration,
    state: Mutex<State>,
    consecutive_failures: Mutex<u32>,
}

/// What the caller is permitted to do right now.
#[derive(Debug, Eq, PartialEq)]
pub enum Admission {
    /// Proceed with the call normally.
    Allowed,
    /// Proceed, but this is the single half-open probe: a failure must trip
    /// the breaker again immediately.
    Probe,
    /// Fail fast without performing any I/O.
    Rejected,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, reset_time: Duration) -> Self {
        Self {
            threshold,
            reset_time,
            state: Mutex::new(State::Closed),
            consecutive_failures: Mutex::new(0),
        }
    }

    pub async fn admit(&self) -> Admission {
        let mut state = self.state.lock().await;
        match *state {
            State::Closed => Admission::Allowed,
            State::HalfOpen => Admission::Rejected, // probe already in flight
            State::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.reset_time {
                    *state = State::HalfOpen;
                    Admission::Probe
                } else {
                    Admission::Rejected
                }
            }
        }
    }

    pub async fn on_success(&self) {
        *self.state.lock().await = State::Closed;
        *self.consecutive_failures.lock().await = 0;
    }

    pub async fn on_failure(&self) {
        let mut state = self.state.lock().await;
        match *state {
            State::HalfOpen => {
                *state = State::Open {
                    tripped_at: Instant::now(),
                };
                *self.consecutive_failures.lock().await = 0;
            }
            State::Open { .. } => {}
            State::Closed => {
                let mut failures = self.consecutive_failures.lock().await;
                *failures += 1;
                if *failures >= self.threshold {
                    *state = State::Open {
                        tripped_at: Instant::now(),
                    };
                    *failures = 0;
                }
            }
        }
    }

    pub async fn reset(&self) {
        *self.state.lock().await = State::Closed;
        *self.consecutive_failures.lock().await = 0;
    }

    pub async fn is_healthy(&self) -> bool {
        matches!(*self.state.lock().await, State::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        for _ in 0..4 {
            assert_eq!(breaker.admit().await, Admission::Allowed);
            breaker.on_failure().await;
        }
        assert_eq!(breaker.admit().await, Admission::Allowed);
        breaker.on_failure().await; // 5th consecutive failure trips it

        assert_eq!(breaker.admit().await, Admission::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn half_opens_after_reset_time_and_closes_on_probe_success() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(10));
        breaker.on_failure().await;
        assert_eq!(breaker.admit().await, Admission::Rejected);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(breaker.admit().await, Admission::Probe);
        breaker.on_success().await;
        assert!(breaker.is_healthy().await);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_probe_reopens_with_a_fresh_trip_time() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(10));
        breaker.on_failure().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(breaker.admit().await, Admission::Probe);
        breaker.on_failure().await;

        assert_eq!(breaker.admit().await, Admission::Rejected);
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(breaker.admit().await, Admission::Probe);
    }
}
