//! Per-chat cooldown and sliding-window alert budget (C3, §4.3).
//!
//! Every operation on one chat goes through that chat's own
//! [`tokio::sync::Mutex`], guarding the read-modify-write triple
//! `(check, update, append)` without holding a lock across any
//! suspension longer than strictly necessary (§4.3, §5).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use domain::Address;
use std::{collections::VecDeque, time::Duration};
use tokio::sync::Mutex;

/// Cooldown + sliding-window bookkeeping for one chat.
#[derive(Default)]
struct ChatState {
    last_alert_time: std::collections::HashMap<Address, DateTime<Utc>>,
    /// Ascending timestamps within the last 3600s (§3 Cooldown entry).
    alert_timestamps: VecDeque<DateTime<Utc>>,
}

const SLIDING_WINDOW: ChronoDuration = ChronoDuration::seconds(3600);
const COOLDOWN_PRUNE_AGE: ChronoDuration = ChronoDuration::hours(24);

pub struct AlertGuard {
    chats: DashMap<String, Mutex<ChatState>>,
    token_cooldown: ChronoDuration,
    max_alerts_per_hour: u32,
}

impl AlertGuard {
    pub fn new(token_cooldown: Duration, max_alerts_per_hour: u32) -> Self {
        Self {
            chats: DashMap::new(),
            token_cooldown: ChronoDuration::from_std(token_cooldown)
                .unwrap_or(ChronoDuration::zero()),
            max_alerts_per_hour,
        }
    }

    fn entry(&self, chat_id: &str) -> dashmap::mapref::one::Ref<'_, String, Mutex<ChatState>> {
        self.chats
            .entry(chat_id.to_string())
            .or_insert_with(|| Mutex::new(ChatState::default()));
        self.chats.get(chat_id).expect("just inserted")
    }

    /// True iff there is no cooldown entry, or `token_cooldown` has elapsed
    /// since the last alert for this `(chat_id, mint)` pair.
    pub async fn can_send_alert(&self, chat_id: &str, mint: Address, now: DateTime<Utc>) -> bool {
        let entry = self.entry(chat_id);
        let state = entry.lock().await;
        match state.last_alert_time.get(&mint) {
            Some(last) => now - *last >= self.token_cooldown,
            None => true,
        }
    }

    /// True iff fewer than `max_alerts_per_hour` timestamps remain in the
    /// sliding window after pruning entries older than 3600s.
    pub async fn can_send_any_alert(&self, chat_id: &str, now: DateTime<Utc>) -> bool {
        let entry = self.entry(chat_id);
        let mut state = entry.lock().await;
        prune_window(&mut state.alert_timestamps, now);
        (state.alert_timestamps.len() as u32) < self.max_alerts_per_hour
    }

    /// Atomically records an alert: sets the cooldown entry and appends to
    /// the sliding window (§4.3, P3/P4).
    pub async fn mark_alert_sent(&self, chat_id: &str, mint: Address, now: DateTime<Utc>) {
        let entry = self.entry(chat_id);
        let mut state = entry.lock().await;
        state.last_alert_time.insert(mint, now);
        prune_window(&mut state.alert_timestamps, now);
        state.alert_timestamps.push_back(now);
    }

    pub async fn cooldown_remaining(
        &self,
        chat_id: &str,
        mint: Address,
        now: DateTime<Utc>,
    ) -> Option<ChronoDuration> {
        let entry = self.entry(chat_id);
        let state = entry.lock().await;
        state.last_alert_time.get(&mint).map(|last| {
            let remaining = self.token_cooldown - (now - *last);
            remaining.max(ChronoDuration::zero())
        })
    }

    pub async fn alerts_remaining_this_hour(&self, chat_id: &str, now: DateTime<Utc>) -> u32 {
        let entry = self.entry(chat_id);
        let mut state = entry.lock().await;
        prune_window(&mut state.alert_timestamps, now);
        self.max_alerts_per_hour
            .saturating_sub(state.alert_timestamps.len() as u32)
    }

    /// Prunes cooldown entries older than 24h and sliding-window entries
    /// older than 3600s across every chat (§4.3 "Cleanup").
    pub async fn cleanup(&self, now: DateTime<Utc>) {
        for chat in self.chats.iter() {
            let mut state = chat.value().lock().await;
            state
                .last_alert_time
                .retain(|_, last| now - *last < COOLDOWN_PRUNE_AGE);
            prune_window(&mut state.alert_timestamps, now);
        }
    }
}

fn prune_window(timestamps: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    while let Some(front) = timestamps.front() {
        if now - *front >= SLIDING_WINDOW {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}
