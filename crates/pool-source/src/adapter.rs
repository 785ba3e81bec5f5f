use async_trait::async_trait;
use domain::{PoolEvent, PoolSource};
use std::sync::Arc;

/// Callback invoked once per newly discovered, deduplicated [`PoolEvent`].
pub type Emit = Arc<dyn Fn(PoolEvent) + Send + Sync>;

/// Uniform capability set over every pool-discovery source (§4.2).
///
/// `start` runs until `stop` is called or the adapter gives up permanently;
/// a single adapter's failure never affects its peers (§4.2 "Failure
/// semantics").
#[async_trait]
pub trait PoolSourceAdapter: Send + Sync {
    fn source(&self) -> PoolSource;

    async fn start(&self, emit: Emit);

    async fn stop(&self);
}
