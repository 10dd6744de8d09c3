//! Array-backed binary min-heap with handle-addressed decrease-key.

use std::collections::HashMap;

use super::DecreaseKeyQueue;

/// Handle into a [`BinaryQueue`], valid until its entry is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryHandle(usize);

#[derive(Debug)]
struct Entry<T> {
    handle: usize,
    item: T,
    key: f64,
}

/// Binary heap over a flat array plus a handle-to-position map, so
/// decrease-key can find its entry in O(1) before the O(log n) sift-up.
#[derive(Debug)]
pub struct BinaryQueue<T> {
    heap: Vec<Entry<T>>,
    positions: HashMap<usize, usize>,
    next_handle: usize,
}

impl<T: Copy> BinaryQueue<T> {
    fn swap_entries(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].handle, a);
        self.positions.insert(self.heap[b].handle, b);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].key < self.heap[parent].key {
                self.swap_entries(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;
            if left < self.heap.len() && self.heap[left].key < self.heap[smallest].key {
                smallest = left;
            }
            if right < self.heap.len() && self.heap[right].key < self.heap[smallest].key {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap_entries(index, smallest);
            index = smallest;
        }
    }
}

impl<T: Copy> DecreaseKeyQueue<T> for BinaryQueue<T> {
    type Handle = BinaryHandle;

    fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: HashMap::new(),
            next_handle: 0,
        }
    }

    fn insert(&mut self, item: T, key: f64) -> BinaryHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.heap.push(Entry { handle, item, key });
        let index = self.heap.len() - 1;
        self.positions.insert(handle, index);
        self.sift_up(index);
        BinaryHandle(handle)
    }

    fn extract_min(&mut self) -> Option<(T, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap_entries(0, last);
        let entry = self.heap.pop()?;
        self.positions.remove(&entry.handle);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((entry.item, entry.key))
    }

    fn decrease_key(&mut self, handle: BinaryHandle, new_key: f64) {
        let Some(&index) = self.positions.get(&handle.0) else {
            return;
        };
        if new_key >= self.heap[index].key {
            return;
        }
        self.heap[index].key = new_key;
        self.sift_up(index);
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
