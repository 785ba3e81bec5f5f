mod cache;
mod circuit_breaker;
mod client;
mod error;
mod stats;
mod token_bucket;
mod validators;

pub use circuit_breaker::{Admission, CircuitBreaker};
pub use client::{GetOptions, GetResponse, ResilientClient};
pub use error::ClientError;
pub use stats::{ClientStats, StatsSnapshot};
pub use token_bucket::TokenBucket;
pub use validators::{all, has_fields, is_array, Validator};
