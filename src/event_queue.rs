// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Lazy-Deletion Event Queue
//
// A binary min-heap of (time, key) entries plus a side table holding the one
// valid time per key. Updates and removals only touch the side table; stale
// heap entries are discarded when they surface at pop time.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use tracing::debug;

/// Heap size below which compaction is never attempted.
pub const COMPACTION_MIN_HEAP: usize = 1024;

/// Compaction triggers once the heap holds this many entries per live key.
pub const COMPACTION_RATIO: usize = 4;

// ─── Heap Entry ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    time: f64,
    key: K,
}

impl<K: Ord> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties on time fall back to key order.
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<K: Ord> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Entry<K> {}

// ─── EventQueue ──────────────────────────────────────────────────────────────

/// Min-priority queue keyed by `K` with O(1) soft update and removal.
///
/// For every key in the live table exactly one heap entry carries that key
/// with that exact time; every other entry for the key is stale.
#[derive(Debug, Clone)]
pub struct EventQueue<K> {
    heap: BinaryHeap<Reverse<Entry<K>>>,
    live: HashMap<K, f64>,
    compactions: u64,
}

impl<K> Default for EventQueue<K>
where
    K: Copy + Eq + Hash + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EventQueue<K>
where
    K: Copy + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            compactions: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            live: HashMap::with_capacity(capacity),
            compactions: 0,
        }
    }

    /// Set `key -> time`, superseding any earlier time for `key`.
    pub fn add_or_update(&mut self, key: K, time: f64) {
        debug_assert!(!time.is_nan(), "event time must not be NaN");
        self.live.insert(key, time);
        self.heap.push(Reverse(Entry { time, key }));
        self.maybe_compact();
    }

    /// Drop `key` from the live table. The heap is left untouched.
    pub fn remove_key(&mut self, key: K) {
        self.live.remove(&key);
    }

    /// Remove and return the earliest live `(key, time)`.
    ///
    /// This is the single point where an event is decided to happen: the
    /// returned key leaves the live table.
    pub fn pop_min(&mut self) -> Option<(K, f64)> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            if self.is_live(&entry) {
                self.live.remove(&entry.key);
                return Some((entry.key, entry.time));
            }
        }
        None
    }

    /// Earliest live `(key, time)` without consuming it. Stale entries found
    /// at the head are discarded on the way.
    pub fn peek_min(&mut self) -> Option<(K, f64)> {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.is_live(entry) {
                return Some((entry.key, entry.time));
            }
            self.heap.pop();
        }
        None
    }

    pub fn contains(&self, key: K) -> bool {
        self.live.contains_key(&key)
    }

    /// Valid firing time for `key`, if any.
    pub fn time_of(&self, key: K) -> Option<f64> {
        self.live.get(&key).copied()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of heap entries, stale ones included.
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.live.keys().copied()
    }

    /// Rebuild the heap from the live table, dropping every stale entry.
    pub fn compact(&mut self) {
        let before = self.heap.len();
        let entries: Vec<_> = self
            .live
            .iter()
            .map(|(&key, &time)| Reverse(Entry { time, key }))
            .collect();
        self.heap = BinaryHeap::from(entries);
        self.compactions += 1;
        debug!(before, after = self.heap.len(), "event heap compacted");
    }

    fn is_live(&self, entry: &Entry<K>) -> bool {
        self.live.get(&entry.key) == Some(&entry.time)
    }

    fn maybe_compact(&mut self) {
        let threshold = COMPACTION_MIN_HEAP.max(COMPACTION_RATIO * self.live.len());
        if self.heap.len() > threshold {
            self.compact();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order_with_update() {
        let mut q = EventQueue::new();
        q.add_or_update(1, 100.0);
        q.add_or_update(2, 50.0);
        q.add_or_update(3, 75.0);

        assert_eq!(q.pop_min(), Some((2, 50.0)));
        assert_eq!(q.pop_min(), Some((3, 75.0)));

        q.add_or_update(1, 30.0);
        assert_eq!(q.pop_min(), Some((1, 30.0)));
        // The first (1, 100) entry was superseded and is discarded.
        assert_eq!(q.pop_min(), None);
        assert_eq!(q.heap_len(), 0);
    }

    #[test]
    fn test_update_to_later_time_hides_earlier_entry() {
        let mut q = EventQueue::new();
        q.add_or_update(5, 1.0);
        q.add_or_update(6, 2.0);
        q.add_or_update(5, 3.0);

        assert_eq!(q.pop_min(), Some((6, 2.0)));
        assert_eq!(q.pop_min(), Some((5, 3.0)));
        assert!(q.is_empty());
    }

    #[test]
    fn test_remove_key() {
        let mut q = EventQueue::new();
        q.add_or_update(1, 1.0);
        q.add_or_update(2, 2.0);
        q.remove_key(1);
        q.remove_key(99);

        assert_eq!(q.len(), 1);
        assert_eq!(q.heap_len(), 2);
        assert!(!q.contains(1));
        assert_eq!(q.pop_min(), Some((2, 2.0)));
        assert_eq!(q.pop_min(), None);
    }

    #[test]
    fn test_ties_break_on_key() {
        let mut q = EventQueue::new();
        q.add_or_update(9, 4.0);
        q.add_or_update(3, 4.0);
        q.add_or_update(6, 4.0);

        assert_eq!(q.pop_min(), Some((3, 4.0)));
        assert_eq!(q.pop_min(), Some((6, 4.0)));
        assert_eq!(q.pop_min(), Some((9, 4.0)));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut q = EventQueue::new();
        q.add_or_update(1, 5.0);
        q.add_or_update(2, 7.0);
        q.add_or_update(1, 9.0);

        // Head (1, 5.0) is stale and gets dropped by peek.
        assert_eq!(q.peek_min(), Some((2, 7.0)));
        assert_eq!(q.heap_len(), 2);
        assert_eq!(q.peek_min(), Some((2, 7.0)));
        assert_eq!(q.pop_min(), Some((2, 7.0)));
        assert_eq!(q.peek_min(), Some((1, 9.0)));
    }

    #[test]
    fn test_repeated_identical_update_pops_once() {
        let mut q = EventQueue::new();
        q.add_or_update(4, 2.5);
        q.add_or_update(4, 2.5);

        assert_eq!(q.pop_min(), Some((4, 2.5)));
        assert_eq!(q.pop_min(), None);
    }

    #[test]
    fn test_compaction_bounds_heap_and_preserves_order() {
        let mut q = EventQueue::new();
        for round in 0..2_000u32 {
            for key in 0..4u32 {
                q.add_or_update(key, f64::from(round * 10 + key));
            }
        }

        assert!(q.compactions() > 0);
        assert!(q.heap_len() <= COMPACTION_MIN_HEAP + 1);
        assert_eq!(q.len(), 4);

        let popped: Vec<_> = std::iter::from_fn(|| q.pop_min()).collect();
        assert_eq!(
            popped,
            vec![(0, 19_990.0), (1, 19_991.0), (2, 19_992.0), (3, 19_993.0)]
        );
    }

    #[test]
    fn test_time_of_tracks_latest_update() {
        let mut q = EventQueue::with_capacity(4);
        assert_eq!(q.time_of(1), None);
        q.add_or_update(1, 3.0);
        q.add_or_update(1, 1.5);
        assert_eq!(q.time_of(1), Some(1.5));
        assert_eq!(q.keys().collect::<Vec<_>>(), vec![1]);
    }
}
