//! Binary min-heap over priority keys.
//!
//! Keys are stored in a resizable array laid out as an implicit complete
//! binary tree: the children of slot `i` are `2i + 1` and `2i + 2`. The
//! smallest key is always at slot 0. Insert and delete-min are O(log n).

/// Min-ordered multiset of keys. Smaller keys are served first.
#[derive(Debug, Clone)]
pub struct PriorityQueue<K> {
    heap: Vec<K>,
}

impl<K: Ord> PriorityQueue<K> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    /// Add a key.
    pub fn insert(&mut self, key: K) {
        self.heap.push(key);
        self.sift_up(self.heap.len() - 1);
    }

    /// The smallest key, or `None` when empty.
    #[must_use]
    pub fn get_min(&self) -> Option<&K> {
        self.heap.first()
    }

    /// Remove and return the smallest key, or `None` when empty.
    pub fn del_min(&mut self) -> Option<K> {
        if self.heap.is_empty() {
            return None;
        }
        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    /// Number of keys present.
    #[must_use]
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index] >= self.heap[parent] {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let smaller = if right < len && self.heap[right] < self.heap[left] {
                right
            } else {
                left
            };
            if self.heap[index] <= self.heap[smaller] {
                break;
            }
            self.heap.swap(index, smaller);
            index = smaller;
        }
    }
}

impl<K: Ord> Default for PriorityQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
