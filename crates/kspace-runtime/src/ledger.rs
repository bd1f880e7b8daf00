#![forbid(unsafe_code)]

//! Bounded FIFO ledger for transform audit trails.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bounded FIFO buffer of audit entries.
///
/// Capacity is enforced via `capacity.max(1)`, so at least one entry is kept.
/// When full, the oldest entry (front of the `VecDeque`) is evicted before a
/// new entry is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLedger<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> EvidenceLedger<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Append an entry, evicting the oldest if at capacity.
    pub fn record(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Remove and return every retained entry, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.entries.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EvidenceLedger;

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut ledger = EvidenceLedger::new(0);
        ledger.record(1);
        ledger.record(2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.drain(), vec![2]);
    }

    #[test]
    fn ledger_evicts_oldest_first() {
        let mut ledger = EvidenceLedger::new(3);
        for i in 0..5 {
            ledger.record(i);
        }
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.drain(), vec![2, 3, 4]);
        assert!(ledger.is_empty());
    }
}
