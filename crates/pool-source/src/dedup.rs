use domain::Address;
use std::collections::{HashSet, VecDeque};

/// Recent-emit set bounding an adapter's own reconnect/retry lifetime
/// (§4.2): a reconnect replays recent on-chain activity, so without this an
/// adapter would re-emit a pool it already reported.
pub struct RecentEmitSet {
    order: VecDeque<Address>,
    members: HashSet<Address>,
    capacity: usize,
}

impl RecentEmitSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `true` if `address` was not seen before and is now recorded.
    pub fn record_if_new(&mut self, address: Address) -> bool {
        if !self.members.insert(address) {
            return false;
        }
        self.order.push_back(address);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        true
    }
}
