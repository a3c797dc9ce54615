//! Append-only log with a fixed capacity and oldest-first eviction.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// A FIFO-evicting append-only log.
///
/// Eviction happens on the write path: pushing onto a full log drops the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Creates an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Appends an entry, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Returns the newest `limit` entries in chronological order.
    #[must_use]
    pub fn tail(&self, limit: usize) -> Vec<T> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Returns every entry in chronological order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedLog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let mut log = BoundedLog::with_capacity(3);
        for i in 0..3 {
            assert_eq!(log.push(i), None);
        }

        let evicted = log.push(3);

        assert_eq!(evicted, Some(0));
        assert_eq!(log.len(), 3);
        assert_eq!(log.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_tail_returns_newest_in_chronological_order() {
        let mut log = BoundedLog::with_capacity(10);
        for i in 0..6 {
            log.push(i);
        }

        assert_eq!(log.tail(2), vec![4, 5]);
        assert_eq!(log.tail(100), vec![0, 1, 2, 3, 4, 5]);
        assert!(log.tail(0).is_empty());
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut log = BoundedLog::with_capacity(100);
        for i in 0..1_000 {
            log.push(i);
            assert!(log.len() <= 100);
        }
        assert_eq!(log.iter().next(), Some(&900));
        assert_eq!(log.last(), Some(&999));
    }

    #[test]
    fn test_serializes_as_plain_sequence() {
        let mut log = BoundedLog::with_capacity(2);
        for i in 0..3 {
            log.push(i);
        }

        assert_eq!(serde_json::to_value(&log).unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn test_zero_capacity_keeps_latest_entry() {
        let mut log = BoundedLog::with_capacity(0);
        log.push("a");
        log.push("b");

        assert_eq!(log.capacity(), 1);
        assert_eq!(log.to_vec(), vec!["b"]);
    }
}
