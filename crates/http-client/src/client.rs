use crate::{
    cache::TtlCache,
    circuit_breaker::{Admission, CircuitBreaker},
    error::ClientError,
    stats::{ClientStats, StatsSnapshot},
    token_bucket::TokenBucket,
    validators::Validator,
};
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Per-call knobs for [`ResilientClient::get`] (§4.1).
pub struct GetOptions<T> {
    pub cache: bool,
    pub cache_key: Option<String>,
    pub cache_ttl: Duration,
    pub validator: Option<Validator>,
    pub transform: Box<dyn Fn(Value) -> Result<T, ClientError> + Send + Sync>,
}

impl<T> Default for GetOptions<T>
where
    T: serde::de::DeserializeOwned,
{
    fn default() -> Self {
        Self {
            cache: false,
            cache_key: None,
            cache_ttl: Duration::from_secs(60),
            validator: None,
            transform: Box::new(|value| {
                serde_json::from_value(value).map_err(|e| ClientError::Validation(e.to_string()))
            }),
        }
    }
}

/// Outcome of a [`ResilientClient::get`] call. Mirrors the component
/// contract literally: failure is data, never a Rust `Err`, so callers never
/// need to pattern-match on an internal error enum.
pub struct GetResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub cached: bool,
}

impl<T> GetResponse<T> {
    fn ok(data: T, cached: bool) -> Self {
        Self {
            data: Some(data),
            error: None,
            cached,
        }
    }

    fn err(error: ClientError) -> Self {
        Self {
            data: None,
            error: Some(error.to_string()),
            cached: false,
        }
    }
}

/// Retry ceiling applied after exponential backoff + jitter (§4.1).
const BACKOFF_CEILING: Duration = Duration::from_secs(30);

/// A single named outbound client: rate-limited, breaker-guarded, cached,
/// retried (§4.1, C1). One instance per upstream (chain RPC, aggregator).
pub struct ResilientClient {
    name: String,
    base_url: Url,
    http: reqwest::Client,
    bucket: TokenBucket,
    breaker: CircuitBreaker,
    cache: TtlCache,
    stats: ClientStats,
    max_retries: u32,
    backoff_base: Duration,
}

impl ResilientClient {
    pub fn new(
        name: impl Into<String>,
        base_url: Url,
        max_tokens: f64,
        refill_rate_per_second: f64,
        breaker_threshold: u32,
        breaker_reset: Duration,
        max_retries: u32,
        backoff_base: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            base_url,
            http: reqwest::Client::new(),
            bucket: TokenBucket::new(max_tokens, refill_rate_per_second),
            breaker: CircuitBreaker::new(breaker_threshold, breaker_reset),
            cache: TtlCache::new(),
            stats: ClientStats::default(),
            max_retries,
            backoff_base,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Issues a GET against `path`, applying cache, rate limiting, circuit
    /// breaking, retry-with-jitter, response validation and transform, in
    /// that order, per §4.1.
    pub async fn get<T>(&self, path: &str, opts: GetOptions<T>) -> GetResponse<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let cache_key = opts
            .cache_key
            .clone()
            .unwrap_or_else(|| path.to_string());

        if opts.cache {
            if let Some(cached) = self.cache.get::<T>(&cache_key).await {
                self.stats.record_cache_hit();
                return GetResponse::ok(cached, true);
            }
        }

        let url = match self.base_url.join(path) {
            Ok(url) => url,
            Err(e) => return GetResponse::err(ClientError::Validation(e.to_string())),
        };

        let mut attempt: u32 = 0;
        loop {
            self.stats.record_request();

            let admission = self.breaker.admit().await;
            if admission == Admission::Rejected {
                self.stats.record_circuit_open();
                self.stats.record_failure();
                tracing::warn!(client = %self.name, path, "circuit open, rejecting");
                return GetResponse::err(ClientError::CircuitOpen);
            }

            self.bucket.acquire().await;

            let result = self.fetch_once(&url).await;
            match result {
                Ok(raw) => {
                    let validated = match &opts.validator {
                        Some(v) if !v.check(&raw) => {
                            Err(ClientError::Validation(v.name().to_string()))
                        }
                        _ => Ok(()),
                    };
                    match validated.and_then(|_| (opts.transform)(raw)) {
                        Ok(value) => {
                            self.breaker.on_success().await;
                            self.stats.record_success();
                            if opts.cache {
                                self.cache
                                    .insert(cache_key.clone(), value.clone(), opts.cache_ttl)
                                    .await;
                            }
                            return GetResponse::ok(value, false);
                        }
                        Err(e) => {
                            // Validation/transform failures are never retried
                            // and never trip the breaker: the upstream
                            // answered, it answered wrong.
                            self.stats.record_failure();
                            return GetResponse::err(e);
                        }
                    }
                }
                Err(e) if admission == Admission::Probe => {
                    self.breaker.on_failure().await;
                    self.stats.record_failure();
                    return GetResponse::err(e);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    self.breaker.on_failure().await;
                    self.stats.record_retry();
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(client = %self.name, path, attempt, ?delay, error = %e, "retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => {
                    self.breaker.on_failure().await;
                    self.stats.record_failure();
                    tracing::warn!(client = %self.name, path, error = %e, "request failed");
                    return GetResponse::err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    /// `base · 2^attempt` plus up to ±20% jitter, capped at [`BACKOFF_CEILING`].
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.backoff_base.as_secs_f64() * 2f64.powi(attempt as i32);
        let jitter = rand::thread_rng().gen_range(-0.2..=0.2);
        let with_jitter = (exp * (1.0 + jitter)).max(0.0);
        Duration::from_secs_f64(with_jitter).min(BACKOFF_CEILING)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn reset_circuit(&self) {
        self.breaker.reset().await;
    }

    pub async fn is_healthy(&self) -> bool {
        self.breaker.is_healthy().await
    }

    pub fn get_stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::has_fields;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
    struct Echo {
        ok: bool,
    }

    fn client(base_url: Url) -> ResilientClient {
        ResilientClient::new(
            "test",
            base_url,
            100.0,
            100.0,
            5,
            Duration::from_secs(30),
            3,
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn unreachable_host_surfaces_as_network_error_string() {
        let url = Url::parse("http://127.0.0.1:1").unwrap();
        let c = client(url);
        let resp: GetResponse<Echo> = c.get("/x", GetOptions::default()).await;
        assert!(resp.data.is_none());
        assert!(resp.error.is_some());
    }

    #[test]
    fn validator_failure_message_matches_spec_format() {
        let validator = has_fields(&["ok"]);
        let err = ClientError::Validation(validator.name().to_string());
        assert!(err.to_string().starts_with("validation-failed:"));
    }

    #[test]
    fn backoff_is_capped_at_ceiling() {
        let c = client(Url::parse("http://localhost").unwrap());
        let delay = c.backoff_delay(20);
        assert!(delay <= BACKOFF_CEILING);
    }
}
