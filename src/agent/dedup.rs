//! Bounded record of message ids already answered.
//!
//! FIFO eviction: ids are only ever looked up by exact value, so recency of
//! access carries no information. Once an id ages out of the ledger a
//! redelivered copy of that message would be answered again.

use std::collections::{HashSet, VecDeque};

pub const DEFAULT_LEDGER_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupLedger {
    order: VecDeque<String>,
    index: HashSet<String>,
    capacity: usize,
}

impl DedupLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            index: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from persisted ids (oldest first), keeping the newest `capacity`.
    pub fn from_ids<I>(ids: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut ledger = Self::new(capacity);
        for id in ids {
            ledger.record(id);
        }
        ledger
    }

    pub fn has(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Append `id`, evicting the oldest entries beyond capacity.
    pub fn record(&mut self, id: impl Into<String>) {
        let id = id.into();
        if id.is_empty() || self.index.contains(&id) {
            return;
        }
        self.index.insert(id.clone());
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
    }

    /// Ids oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}
