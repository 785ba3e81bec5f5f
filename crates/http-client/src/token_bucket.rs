use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct State {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter with continuous (linear interpolation) refill,
/// not periodic ticking (§4.1).
pub struct TokenBucket {
    max_tokens: f64,
    refill_rate_per_second: f64,
    state: Mutex<State>,
}

impl TokenBucket {
    pub fn new(max_tokens: f64, refill_rate_per_second: f64) -> Self {
        Self {
            max_tokens,
            refill_rate_per_second,
            state: Mutex::new(State {
                tokens: max_tokens,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut State, now: Instant) {
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate_per_second).min(self.max_tokens);
        state.last_refill = now;
    }

    /// Acquires a single token, waiting out the refill deadline (and
    /// recomputing, since another caller may have drained the bucket in the
    /// meantime) if none is immediately available.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                self.refill(&mut state, now);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_rate_per_second)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn drains_and_waits_for_refill() {
        let bucket = TokenBucket::new(2.0, 1.0);
        bucket.acquire().await;
        bucket.acquire().await;

        let start = Instant::now();
        bucket.acquire().await;
        assert!(Instant::now().duration_since(start) >= Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn refill_is_capped_at_max_tokens() {
        let bucket = TokenBucket::new(3.0, 100.0);
        tokio::time::advance(Duration::from_secs(10)).await;
        let mut state = bucket.state.lock().await;
        bucket.refill(&mut state, Instant::now());
        assert_eq!(state.tokens, 3.0);
    }
}
