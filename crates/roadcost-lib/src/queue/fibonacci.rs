//! Fibonacci heap over an arena of slots.
//!
//! The classic pointer-heavy layout (circular sibling rings, parent/child
//! links, cascading cuts) is expressed with slot indices into one `Vec`;
//! removal returns a slot to a free list for reuse. This keeps every splice
//! O(1) without reference-counted cells or unsafe pointer juggling.
//!
//! On top of the minimum-queue contract this type offers [`extract_max`],
//! used by the memory-bounded search to evict its worst frontier entry. The
//! maximum is found by a full scan of every live node (roots and
//! descendants), sunk below the minimum with an internal sentinel key, and
//! removed through the ordinary extract-min machinery.
//!
//! [`extract_max`]: FibonacciQueue::extract_max

use super::DecreaseKeyQueue;

/// Handle into a [`FibonacciQueue`].
///
/// Valid until its entry is removed; the slot behind it is then recycled, so
/// a stale handle must never be passed back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FibonacciHandle(usize);

#[derive(Debug)]
struct Slot<T> {
    item: T,
    key: f64,
    parent: Option<usize>,
    /// One child; the rest are reachable through the child's sibling ring.
    child: Option<usize>,
    left: usize,
    right: usize,
    degree: usize,
    marked: bool,
}

/// Mergeable heap with amortized O(1) insert and decrease-key.
#[derive(Debug)]
pub struct FibonacciQueue<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    min: Option<usize>,
    len: usize,
}

impl<T: Copy> FibonacciQueue<T> {
    fn alloc(&mut self, item: T, key: f64) -> usize {
        let slot = Slot {
            item,
            key,
            parent: None,
            child: None,
            left: 0,
            right: 0,
            degree: 0,
            marked: false,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = slot;
                id
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.slots[id].left = id;
        self.slots[id].right = id;
        id
    }

    /// Detach `id` from its sibling ring, leaving it self-linked. The caller
    /// fixes any parent/child/min pointer that referenced it.
    fn unlink(&mut self, id: usize) {
        let left = self.slots[id].left;
        let right = self.slots[id].right;
        self.slots[left].right = right;
        self.slots[right].left = left;
        self.slots[id].left = id;
        self.slots[id].right = id;
    }

    /// Splice self-linked `id` into the ring directly after `anchor`.
    fn link_after(&mut self, anchor: usize, id: usize) {
        let right = self.slots[anchor].right;
        self.slots[id].left = anchor;
        self.slots[id].right = right;
        self.slots[anchor].right = id;
        self.slots[right].left = id;
    }

    /// Make `child` (currently a root) a child of `parent` during
    /// consolidation.
    fn link_as_child(&mut self, parent: usize, child: usize) {
        self.unlink(child);
        self.slots[child].parent = Some(parent);
        self.slots[child].marked = false;
        match self.slots[parent].child {
            Some(first) => self.link_after(first, child),
            None => self.slots[parent].child = Some(child),
        }
        self.slots[parent].degree += 1;
    }

    /// Cut `id` from `parent` and promote it to the root ring.
    fn cut(&mut self, id: usize, parent: usize) {
        let next = self.slots[id].right;
        if self.slots[parent].child == Some(id) {
            self.slots[parent].child = if next == id { None } else { Some(next) };
        }
        self.unlink(id);
        self.slots[parent].degree -= 1;
        self.slots[id].parent = None;
        self.slots[id].marked = false;
        match self.min {
            Some(min) => self.link_after(min, id),
            None => self.min = Some(id),
        }
    }

    /// Walk up from a node that just lost a child, cutting every ancestor
    /// that had already lost one and marking the first that had not.
    fn cascading_cut(&mut self, mut id: usize) {
        while let Some(parent) = self.slots[id].parent {
            if !self.slots[id].marked {
                self.slots[id].marked = true;
                break;
            }
            self.cut(id, parent);
            id = parent;
        }
    }

    /// Merge equal-degree roots until every degree occurs at most once, then
    /// rescan for the minimum.
    fn consolidate(&mut self) {
        let start = match self.min {
            Some(id) => id,
            None => return,
        };

        // Snapshot the root ring first; linking edits it while we walk.
        let mut roots = Vec::new();
        let mut cursor = start;
        loop {
            roots.push(cursor);
            cursor = self.slots[cursor].right;
            if cursor == start {
                break;
            }
        }

        // A degree can exceed the ceil(log2 n) estimate (the true bound is
        // log base phi), so the table grows on demand.
        let estimate = (self.len.max(1) as f64).log2().ceil() as usize + 1;
        let mut by_degree: Vec<Option<usize>> = vec![None; estimate];

        for root in roots {
            let mut node = root;
            let mut degree = self.slots[node].degree;
            loop {
                if degree >= by_degree.len() {
                    by_degree.resize(degree + 1, None);
                }
                match by_degree[degree] {
                    Some(other) if other != node => {
                        let (parent, child) = if self.slots[other].key < self.slots[node].key {
                            (other, node)
                        } else {
                            (node, other)
                        };
                        self.link_as_child(parent, child);
                        by_degree[degree] = None;
                        node = parent;
                        degree = self.slots[node].degree;
                    }
                    _ => {
                        by_degree[degree] = Some(node);
                        break;
                    }
                }
            }
        }

        let mut min: Option<usize> = None;
        for id in by_degree.into_iter().flatten() {
            min = match min {
                Some(best) if self.slots[best].key <= self.slots[id].key => Some(best),
                _ => Some(id),
            };
        }
        self.min = min;
    }

    /// Scan every live node (roots and all descendants) for the maximum key.
    fn find_max(&self) -> Option<usize> {
        let start = self.min?;
        let mut stack = Vec::new();
        let mut cursor = start;
        loop {
            stack.push(cursor);
            cursor = self.slots[cursor].right;
            if cursor == start {
                break;
            }
        }

        let mut best = start;
        while let Some(id) = stack.pop() {
            if self.slots[id].key > self.slots[best].key {
                best = id;
            }
            if let Some(child) = self.slots[id].child {
                let mut sibling = child;
                loop {
                    stack.push(sibling);
                    sibling = self.slots[sibling].right;
                    if sibling == child {
                        break;
                    }
                }
            }
        }
        Some(best)
    }

    /// Remove and return the entry with the largest key, or `None` if empty.
    ///
    /// Returns the key the entry held before removal. Used by the bounded
    /// search to evict the worst frontier node; everything else on this type
    /// is minimum-oriented.
    pub fn extract_max(&mut self) -> Option<(T, f64)> {
        let max = self.find_max()?;
        let key = self.slots[max].key;
        self.decrease_key(FibonacciHandle(max), f64::NEG_INFINITY);
        let (item, _) = self.extract_min()?;
        Some((item, key))
    }
}

impl<T: Copy> DecreaseKeyQueue<T> for FibonacciQueue<T> {
    type Handle = FibonacciHandle;

    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            min: None,
            len: 0,
        }
    }

    fn insert(&mut self, item: T, key: f64) -> FibonacciHandle {
        let id = self.alloc(item, key);
        match self.min {
            Some(min) => {
                self.link_after(min, id);
                if self.slots[id].key < self.slots[min].key {
                    self.min = Some(id);
                }
            }
            None => self.min = Some(id),
        }
        self.len += 1;
        FibonacciHandle(id)
    }

    fn extract_min(&mut self) -> Option<(T, f64)> {
        let min = self.min?;

        // Promote every child of the minimum to the root ring.
        while let Some(child) = self.slots[min].child {
            let next = self.slots[child].right;
            self.slots[min].child = if next == child { None } else { Some(next) };
            self.unlink(child);
            self.slots[child].parent = None;
            self.slots[child].marked = false;
            self.link_after(min, child);
        }
        self.slots[min].degree = 0;

        let rest = self.slots[min].right;
        let solitary = rest == min;
        self.unlink(min);
        let result = (self.slots[min].item, self.slots[min].key);
        self.free.push(min);
        self.len -= 1;

        if solitary {
            self.min = None;
        } else {
            self.min = Some(rest);
            self.consolidate();
        }
        Some(result)
    }

    fn decrease_key(&mut self, handle: FibonacciHandle, new_key: f64) {
        let id = handle.0;
        if new_key >= self.slots[id].key {
            return;
        }
        self.slots[id].key = new_key;
        if let Some(parent) = self.slots[id].parent {
            if new_key < self.slots[parent].key {
                self.cut(id, parent);
                self.cascading_cut(parent);
            }
        }
        if let Some(min) = self.min {
            if new_key < self.slots[min].key {
                self.min = Some(id);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the whole structure checking ring links, parent/child agreement,
    /// heap order, and the live-node count.
    fn check_structure<T: Copy>(queue: &FibonacciQueue<T>) {
        let Some(min) = queue.min else {
            assert_eq!(queue.len, 0);
            return;
        };
        let mut seen = 0usize;
        let mut stack = vec![];
        let mut cursor = min;
        loop {
            assert!(queue.slots[cursor].parent.is_none(), "root has a parent");
            stack.push(cursor);
            cursor = queue.slots[cursor].right;
            if cursor == min {
                break;
            }
        }
        while let Some(id) = stack.pop() {
            seen += 1;
            let slot = &queue.slots[id];
            assert_eq!(queue.slots[slot.right].left, id, "broken ring");
            assert_eq!(queue.slots[slot.left].right, id, "broken ring");
            assert!(
                queue.slots[min].key <= slot.key,
                "min pointer is not minimal"
            );
            if let Some(child) = slot.child {
                let mut count = 0;
                let mut sibling = child;
                loop {
                    assert_eq!(queue.slots[sibling].parent, Some(id));
                    assert!(slot.key <= queue.slots[sibling].key, "heap order broken");
                    stack.push(sibling);
                    count += 1;
                    sibling = queue.slots[sibling].right;
                    if sibling == child {
                        break;
                    }
                }
                assert_eq!(slot.degree, count, "degree disagrees with child count");
            } else {
                assert_eq!(slot.degree, 0);
            }
        }
        assert_eq!(seen, queue.len, "live node count disagrees with len");
    }

    #[test]
    fn extract_min_on_empty_is_none() {
        let mut queue: FibonacciQueue<u32> = FibonacciQueue::new();
        assert!(queue.extract_min().is_none());
        assert!(queue.extract_max().is_none());
    }

    #[test]
    fn drains_in_sorted_order_after_consolidation() {
        let mut queue = FibonacciQueue::new();
        for i in [9u32, 3, 7, 1, 8, 2, 6, 4, 5, 0] {
            queue.insert(i, f64::from(i));
            check_structure(&queue);
        }
        let mut drained = Vec::new();
        while let Some((item, _)) = queue.extract_min() {
            check_structure(&queue);
            drained.push(item);
        }
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn decrease_key_with_equal_or_larger_key_changes_nothing() {
        let mut queue = FibonacciQueue::new();
        let a = queue.insert('a', 5.0);
        queue.insert('b', 7.0);
        let min_before = queue.min;

        queue.decrease_key(a, 5.0);
        queue.decrease_key(a, 50.0);
        assert_eq!(queue.min, min_before);
        assert_eq!(queue.slots[min_before.unwrap()].key, 5.0);
        check_structure(&queue);
    }

    #[test]
    fn decrease_key_cuts_and_promotes_a_new_min() {
        let mut queue = FibonacciQueue::new();
        let mut handles = Vec::new();
        for i in 0..9u32 {
            handles.push(queue.insert(i, f64::from(i + 1)));
        }
        // Force consolidation so later nodes have parents.
        assert_eq!(queue.extract_min(), Some((0, 1.0)));
        check_structure(&queue);

        queue.decrease_key(handles[8], 0.5);
        check_structure(&queue);
        assert_eq!(queue.extract_min(), Some((8, 0.5)));
        check_structure(&queue);

        let mut rest = Vec::new();
        while let Some((item, _)) = queue.extract_min() {
            rest.push(item);
        }
        assert_eq!(rest, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn cascading_cut_keeps_structure_consistent() {
        let mut queue = FibonacciQueue::new();
        let mut handles = Vec::new();
        for i in 0..32u32 {
            handles.push(queue.insert(i, f64::from(i)));
        }
        assert!(queue.extract_min().is_some());
        check_structure(&queue);
        // Repeatedly cut deep nodes; each second cut on a shared parent
        // cascades upward.
        for &index in &[31usize, 30, 29, 28, 27, 26] {
            let target = f64::from(index as u32) / 100.0;
            queue.decrease_key(handles[index], target);
            check_structure(&queue);
        }
        let mut drained = Vec::new();
        while let Some((_, key)) = queue.extract_min() {
            drained.push(key);
        }
        for pair in drained.windows(2) {
            assert!(pair[0] <= pair[1], "out of order: {pair:?}");
        }
        assert_eq!(drained.len(), 31);
    }

    #[test]
    fn extract_max_finds_a_buried_descendant() {
        let mut queue = FibonacciQueue::new();
        for i in 0..9u32 {
            queue.insert(i, f64::from(i));
        }
        // Popping the 0 key consolidates keys 1..=8 into one degree-3 tree,
        // so the maximum is guaranteed to be a non-root descendant.
        assert_eq!(queue.extract_min(), Some((0, 0.0)));
        check_structure(&queue);

        assert_eq!(queue.extract_max(), Some((8, 8.0)));
        assert_eq!(queue.len(), 7);
        check_structure(&queue);

        let mut rest = Vec::new();
        while let Some((item, _)) = queue.extract_min() {
            rest.push(item);
        }
        assert_eq!(rest, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn slots_are_recycled_through_the_free_list() {
        let mut queue = FibonacciQueue::new();
        for i in 0..4u32 {
            queue.insert(i, f64::from(i));
        }
        assert_eq!(queue.extract_min(), Some((0, 0.0)));
        assert_eq!(queue.extract_min(), Some((1, 1.0)));
        let slots_before = queue.slots.len();

        queue.insert(10, 0.25);
        queue.insert(11, 0.75);
        assert_eq!(queue.slots.len(), slots_before, "free slots were not reused");
        check_structure(&queue);

        let mut drained = Vec::new();
        while let Some((item, _)) = queue.extract_min() {
            drained.push(item);
        }
        assert_eq!(drained, vec![10, 11, 2, 3]);
    }
}
