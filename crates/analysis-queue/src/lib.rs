//! Bounded FIFO analysis queue with O(1) dedup and bounded-parallel workers
//! (C4, §4.4).
//!
//! This crate owns the queue and its dedup set exclusively (§3 ownership
//! rule); it knows nothing about enrichment, classification or alerting —
//! those are injected as a single opaque job closure so the queue stays a
//! generic piece of infrastructure rather than depending on every
//! downstream component.

use domain::{Address, PoolEvent};
use futures::future::BoxFuture;
use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{Mutex, Semaphore};

#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    pub max_queue_size: usize,
    pub overflow_eviction_count: usize,
    pub warning_threshold: usize,
    pub concurrency: usize,
    pub rate_limit_wait: Duration,
    pub empty_queue_check_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 1000,
            overflow_eviction_count: 100,
            warning_threshold: 800,
            concurrency: 5,
            rate_limit_wait: Duration::from_secs(5),
            empty_queue_check_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum EnqueueOutcome {
    Enqueued,
    /// `token_mint` already has a pending or in-flight job (§3 P2).
    DuplicateSkipped,
}

struct Inner {
    items: VecDeque<PoolEvent>,
    dedup: HashSet<Address>,
    /// Set once length crosses `warning_threshold`, cleared once it falls
    /// below half that (§8 boundary behaviour: warn exactly once per crossing).
    warned_high: bool,
}

/// The async job run for one dequeued [`PoolEvent`]: enrich, classify,
/// persist, alert, register with the outcome tracker. Any error inside it
/// must be caught by the closure itself — the dispatcher only needs to know
/// when the job is finished so it can free the dedup entry and the
/// semaphore slot (§4.4, §7).
pub type Job = Arc<dyn Fn(PoolEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Hooks into C3's dedup/rate-limit service, resolved by the caller so this
/// crate never depends on chat identity or cooldown storage directly.
#[derive(Clone)]
pub struct QueueHooks {
    pub can_send_alert: Arc<dyn Fn(Address) -> BoxFuture<'static, bool> + Send + Sync>,
    pub can_send_any_alert: Arc<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>,
    pub process: Job,
}

pub struct AnalysisQueue {
    inner: Mutex<Inner>,
    config: QueueConfig,
    semaphore: Arc<Semaphore>,
    shutdown: AtomicBool,
}

impl AnalysisQueue {
    pub fn new(config: QueueConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                dedup: HashSet::new(),
                warned_high: false,
            }),
            config,
            semaphore,
            shutdown: AtomicBool::new(false),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Enqueues `event` unless its `token_mint` is already pending or
    /// in-flight. On overflow, evicts the oldest `overflow_eviction_count`
    /// entries and removes their mints from the dedup set (§4.4 P1).
    pub async fn enqueue(&self, event: PoolEvent) -> EnqueueOutcome {
        let mut inner = self.inner.lock().await;
        if inner.dedup.contains(&event.token_mint) {
            return EnqueueOutcome::DuplicateSkipped;
        }
        inner.dedup.insert(event.token_mint);
        inner.items.push_back(event);

        if inner.items.len() > self.config.max_queue_size {
            for _ in 0..self.config.overflow_eviction_count {
                if let Some(evicted) = inner.items.pop_front() {
                    inner.dedup.remove(&evicted.token_mint);
                } else {
                    break;
                }
            }
            tracing::warn!(
                evicted = self.config.overflow_eviction_count,
                "analysis queue overflowed, evicted oldest entries"
            );
        }

        let len = inner.items.len();
        if len >= self.config.warning_threshold && !inner.warned_high {
            inner.warned_high = true;
            tracing::warn!(len, threshold = self.config.warning_threshold, "analysis queue depth crossed warning threshold");
        } else if len < self.config.warning_threshold / 2 {
            inner.warned_high = false;
        }

        EnqueueOutcome::Enqueued
    }

    /// Signals the dispatcher loop to stop accepting new batches. In-flight
    /// jobs still run to completion; their semaphore slots are released
    /// normally (§5 cancellation policy).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Runs the single dispatcher loop until [`Self::shutdown`] is called
    /// (§4.4 worker loop).
    pub async fn run(self: Arc<Self>, hooks: QueueHooks) {
        while !self.is_shutting_down() {
            if !(hooks.can_send_any_alert)().await {
                tokio::time::sleep(self.config.rate_limit_wait).await;
                continue;
            }

            let batch = self.pull_batch(&hooks).await;
            if batch.is_empty() {
                tokio::time::sleep(self.config.empty_queue_check_interval).await;
                continue;
            }

            for event in batch {
                let permit = self
                    .semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                let process = hooks.process.clone();
                let this = self.clone();
                let mint = event.token_mint;
                tokio::spawn(async move {
                    let _permit = permit;
                    process(event).await;
                    this.inner.lock().await.dedup.remove(&mint);
                });
            }
        }
    }

    /// Dequeues up to `concurrency` items, filtering out ones that fail
    /// `can_send_alert` at pull time. Filtered-out items are requeued at the
    /// tail rather than dropped, so they stay eligible on a later pass
    /// without losing their dedup-set membership (§4.4).
    async fn pull_batch(&self, hooks: &QueueHooks) -> Vec<PoolEvent> {
        let candidates: Vec<PoolEvent> = {
            let mut inner = self.inner.lock().await;
            let mut taken = Vec::new();
            while taken.len() < self.config.concurrency {
                match inner.items.pop_front() {
                    Some(event) => taken.push(event),
                    None => break,
                }
            }
            taken
        };

        let mut batch = Vec::with_capacity(candidates.len());
        for event in candidates {
            if (hooks.can_send_alert)(event.token_mint).await {
                batch.push(event);
            } else {
                self.inner.lock().await.items.push_back(event);
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::PoolSource;
    use std::sync::atomic::AtomicUsize;

    fn event(byte: u8) -> PoolEvent {
        PoolEvent::new(
            Address([byte; 32]),
            Address([byte.wrapping_add(1); 32]),
            Address([byte.wrapping_add(2); 32]),
            Address([byte.wrapping_add(3); 32]),
            PoolSource::RaydiumSubscription,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_token_mint_is_rejected_while_pending() {
        let queue = AnalysisQueue::new(QueueConfig::default());
        assert_eq!(queue.enqueue(event(1)).await, EnqueueOutcome::Enqueued);
        assert_eq!(
            queue.enqueue(event(1)).await,
            EnqueueOutcome::DuplicateSkipped
        );
    }

    #[tokio::test]
    async fn overflow_evicts_oldest_entries_and_frees_their_dedup_slot() {
        let queue = AnalysisQueue::new(QueueConfig {
            max_queue_size: 3,
            overflow_eviction_count: 2,
            warning_threshold: 100,
            ..QueueConfig::default()
        });
        for i in 0..4 {
            queue.enqueue(event(i)).await;
        }
        assert_eq!(queue.len().await, 2);
        // the evicted mints' dedup slots are free again
        assert_eq!(queue.enqueue(event(0)).await, EnqueueOutcome::Enqueued);
    }

    #[tokio::test]
    async fn dispatcher_processes_items_and_frees_dedup_on_completion() {
        let queue = Arc::new(AnalysisQueue::new(QueueConfig {
            concurrency: 2,
            empty_queue_check_interval: Duration::from_millis(5),
            rate_limit_wait: Duration::from_millis(5),
            ..QueueConfig::default()
        }));
        queue.enqueue(event(10)).await;

        let processed = Arc::new(AtomicUsize::new(0));
        let processed_clone = processed.clone();
        let hooks = QueueHooks {
            can_send_alert: Arc::new(|_| Box::pin(async { true })),
            can_send_any_alert: Arc::new(|| Box::pin(async { true })),
            process: Arc::new(move |_event| {
                let processed = processed_clone.clone();
                Box::pin(async move {
                    processed.fetch_add(1, Ordering::SeqCst);
                })
            }),
        };

        let queue_clone = queue.clone();
        let handle = tokio::spawn(async move { queue_clone.run(hooks).await });

        for _ in 0..50 {
            if processed.load(Ordering::SeqCst) == 1 && queue.len().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        queue.shutdown();
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;

        assert_eq!(processed.load(Ordering::SeqCst), 1);
        assert_eq!(queue.enqueue(event(10)).await, EnqueueOutcome::Enqueued);
    }

    #[tokio::test]
    async fn items_failing_can_send_alert_are_requeued_not_dropped() {
        let queue = Arc::new(AnalysisQueue::new(QueueConfig {
            concurrency: 1,
            ..QueueConfig::default()
        }));
        queue.enqueue(event(20)).await;

        let hooks = QueueHooks {
            can_send_alert: Arc::new(|_| Box::pin(async { false })),
            can_send_any_alert: Arc::new(|| Box::pin(async { true })),
            process: Arc::new(|_event| Box::pin(async {})),
        };
        let batch = queue.pull_batch(&hooks).await;
        assert!(batch.is_empty());
        assert_eq!(queue.len().await, 1, "item must be requeued, not lost");
    }
}
