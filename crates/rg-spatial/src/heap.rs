//! Binary min-heap keyed by an integer cost.
//!
//! The A* open set.  Entries are ordered by `(key, seq)` where `seq` is a
//! monotonically increasing insertion counter: among equal keys the entry
//! pushed first pops first, so a search over the same inputs always expands
//! nodes in the same order.
//!
//! Layout is the usual implicit binary tree in a `Vec`: children of `i` live
//! at `2i + 1` and `2i + 2`, and every parent key is `<=` its children's.

/// One heap slot.
#[derive(Debug, Clone)]
struct Entry<T> {
    key:  u64,
    seq:  u64,
    item: T,
}

impl<T> Entry<T> {
    #[inline]
    fn precedes(&self, other: &Entry<T>) -> bool {
        (self.key, self.seq) < (other.key, other.seq)
    }
}

/// A binary min-heap.  `push` and `pop` are O(log n).
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    entries:  Vec<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_seq: 0 }
    }
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), next_seq: 0 }
    }

    /// Insert `item` with priority `key` (lower pops first).
    pub fn push(&mut self, key: u64, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { key, seq, item });
        self.sift_up(self.entries.len() - 1);
    }

    /// Remove and return the entry with the smallest key.
    pub fn pop(&mut self) -> Option<(u64, T)> {
        if self.entries.is_empty() {
            return None;
        }
        // Move the last leaf into the root slot, then restore the invariant.
        let top = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((top.key, top.item))
    }

    /// Smallest key without removing it.
    pub fn peek_key(&self) -> Option<u64> {
        self.entries.first().map(|e| e.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_seq = 0;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.entries[i].precedes(&self.entries[parent]) {
                break;
            }
            self.entries.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.entries.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < n && self.entries[left].precedes(&self.entries[smallest]) {
                smallest = left;
            }
            if right < n && self.entries[right].precedes(&self.entries[smallest]) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.entries.swap(i, smallest);
            i = smallest;
        }
    }
}
