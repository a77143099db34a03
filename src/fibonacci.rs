//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized push, decrease_priority, and merge
//! - O(log n) amortized pop (extract-min)
//!
//! The structure consists of a collection of heap-ordered trees. Roots are
//! linked in a circular doubly linked list and the heap records the minimum
//! root. Children of one parent form their own ring.
//!
//! Entries live in a [`SlotMap`] arena and every link (sibling, parent and
//! child) is an [`EntryHandle`] into it. The arena is the sole owner of the
//! entries, so teardown is a flat release of the arena however deep the
//! trees grow, and a handle to an entry that has left the heap is detected by
//! the slotmap's generation check.

use crate::compare::{Compare, MinFirst};
use crate::stats::HeapStats;
use crate::traits::{Handle, Heap, HeapError, InvariantViolation, PoppedEntry};
use arena_ring::{Linked, RingLink, RingOps};
use log::{debug, trace};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::{smallvec, SmallVec};
use std::mem;

new_key_type! {
    /// Handle to an element in a Fibonacci heap
    ///
    /// Handles are tied to the heap that issued them. After the entry leaves
    /// the heap the handle is rejected with [`HeapError::InvalidHandle`].
    pub struct EntryHandle;
}

impl Handle for EntryHandle {}

/// (1 + √5) / 2
const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Degree slots kept inline before the consolidation table spills to the heap.
const INLINE_DEGREE_SLOTS: usize = 64;

/// Upper bound on the degree of any node in a heap of `len` entries.
///
/// This is `floor(log_φ len)`. It only sizes the consolidation table;
/// the table still grows if rounding ever undershoots.
fn degree_bound(len: usize) -> usize {
    if len < 2 {
        return 0;
    }
    ((len as f64).ln() / GOLDEN_RATIO.ln()).floor() as usize
}

struct Node<K, P, T> {
    priority: P,
    key: K,
    payload: T,
    parent: Option<EntryHandle>,
    child: Option<EntryHandle>,
    link: RingLink<EntryHandle>,
    degree: usize,
    marked: bool,
}

impl<K, P, T> Linked<EntryHandle> for Node<K, P, T> {
    fn link(&self) -> &RingLink<EntryHandle> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut RingLink<EntryHandle> {
        &mut self.link
    }
}

/// Fibonacci Heap
///
/// Each entry has a priority, an identifying key and a payload. The heap
/// never looks at the key; see [`KeyedQueue`](crate::keyed::KeyedQueue) for
/// lookup by key.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_queue::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push(5, "item", ());
/// heap.push(3, "other", ());
/// heap.decrease_priority(handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item", &())));
/// ```
pub struct FibonacciHeap<K, P, T = (), C = MinFirst> {
    nodes: SlotMap<EntryHandle, Node<K, P, T>>,
    min: Option<EntryHandle>,
    compare: C,
    stats: HeapStats,
}

impl<K, P: Ord, T> FibonacciHeap<K, P, T, MinFirst> {
    /// Creates an empty min-heap ordered by `Ord`.
    pub fn new() -> Self {
        Self::with_comparator(MinFirst)
    }
}

impl<K, P: Ord, T> Default for FibonacciHeap<K, P, T, MinFirst> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P, T, C: Compare<P>> FibonacciHeap<K, P, T, C> {
    /// Creates an empty heap ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        Self::with_capacity_and_comparator(0, compare)
    }

    /// Creates an empty heap with room for `capacity` entries before the
    /// arena reallocates.
    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            min: None,
            compare,
            stats: HeapStats::default(),
        }
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The comparator ordering this heap.
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Structural operation counters.
    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// Zeroes the structural operation counters.
    pub fn reset_stats(&mut self) {
        self.stats = HeapStats::default();
    }

    /// Inserts an entry, returning a handle for later `decrease_priority`.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn push(&mut self, priority: P, key: K, payload: T) -> EntryHandle {
        let handle = self.nodes.insert(Node {
            priority,
            key,
            payload,
            parent: None,
            child: None,
            link: RingLink::new(),
            degree: 0,
            marked: false,
        });
        RingOps::make_circular(&mut self.nodes, handle);
        self.add_root(handle);
        handle
    }

    /// Returns the minimum entry without removing it.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn peek(&self) -> Option<(&P, &K, &T)> {
        self.min.map(|min| {
            let node = &self.nodes[min];
            (&node.priority, &node.key, &node.payload)
        })
    }

    /// Alias for [`peek`](Self::peek).
    pub fn top(&self) -> Option<(&P, &K, &T)> {
        self.peek()
    }

    /// Handle of the minimum entry.
    pub fn peek_handle(&self) -> Option<EntryHandle> {
        self.min
    }

    /// Returns true if `handle` still names an entry of this heap.
    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Priority, key and payload of a live entry.
    pub fn get(&self, handle: EntryHandle) -> Option<(&P, &K, &T)> {
        self.nodes
            .get(handle)
            .map(|node| (&node.priority, &node.key, &node.payload))
    }

    /// Priority of a live entry.
    pub fn priority(&self, handle: EntryHandle) -> Option<&P> {
        self.nodes.get(handle).map(|node| &node.priority)
    }

    /// Key of a live entry.
    pub fn key(&self, handle: EntryHandle) -> Option<&K> {
        self.nodes.get(handle).map(|node| &node.key)
    }

    /// Mutable access to a live entry's payload. The payload plays no part
    /// in ordering, so changing it cannot break the heap.
    pub fn payload_mut(&mut self, handle: EntryHandle) -> Option<&mut T> {
        self.nodes.get_mut(handle).map(|node| &mut node.payload)
    }

    /// Iterates over every entry in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryHandle, &P, &K, &T)> + '_ {
        self.nodes
            .iter()
            .map(|(handle, node)| (handle, &node.priority, &node.key, &node.payload))
    }

    /// Removes and returns the minimum entry.
    ///
    /// The children of the minimum join the root ring, then trees of equal
    /// degree are linked until every root has a distinct degree.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn pop(&mut self) -> Option<PoppedEntry<K, P, T>> {
        let z = self.min?;

        if let Some(child) = self.nodes[z].child.take() {
            let mut current = child;
            loop {
                let node = &mut self.nodes[current];
                node.parent = None;
                node.marked = false;
                let next = node.link.next();
                if next == child {
                    break;
                }
                current = next;
            }
            self.nodes[z].degree = 0;
            RingOps::splice(&mut self.nodes, Some(z), Some(child));
        }

        match RingOps::remove(&mut self.nodes, z) {
            None => self.min = None,
            Some(right) => {
                self.min = Some(right);
                self.consolidate(right);
            }
        }

        let node = self.nodes.remove(z)?;
        Some(PoppedEntry {
            priority: node.priority,
            key: node.key,
            payload: node.payload,
        })
    }

    /// Lowers the priority of the entry identified by the handle.
    ///
    /// An equal priority is accepted and leaves the structure as it is.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the entry has left the heap
    /// - [`HeapError::InvalidPriorityUpdate`] if `new_priority` ranks after
    ///   the current priority; the heap is unchanged
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_priority(
        &mut self,
        handle: EntryHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        self.check_decrease(handle, &new_priority)?;
        let node = &mut self.nodes[handle];
        node.priority = new_priority;

        if let Some(parent) = node.parent {
            if self.precedes(handle, parent) {
                self.cut(handle, parent);
                self.cascading_cut(parent);
            }
        }

        match self.min {
            Some(min) if !self.precedes(handle, min) => {}
            _ => self.min = Some(handle),
        }
        Ok(())
    }

    /// Removes an arbitrary entry.
    ///
    /// The entry is cut to the root ring exactly as a decrease to a priority
    /// below every other would do, then extracted as the minimum. No sentinel
    /// priority value is needed.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the entry has left the heap.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn remove(&mut self, handle: EntryHandle) -> Result<PoppedEntry<K, P, T>, HeapError> {
        let parent = self
            .nodes
            .get(handle)
            .ok_or(HeapError::InvalidHandle)?
            .parent;
        if let Some(parent) = parent {
            self.cut(handle, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(handle);
        self.pop().ok_or(HeapError::InvalidHandle)
    }

    /// Merges another heap into this one, consuming the other heap.
    ///
    /// The other heap's root ring is spliced into this one and the better of
    /// the two minima is kept. No consolidation happens here.
    ///
    /// The absorbed entries move into this heap's arena, so their old handles
    /// stop being valid. The returned map translates each old handle into its
    /// handle in this heap.
    ///
    /// # Time Complexity
    /// O(1) structural work plus O(m) to relocate the m absorbed entries
    pub fn merge(&mut self, mut other: Self) -> SecondaryMap<EntryHandle, EntryHandle> {
        let mut moved = SecondaryMap::with_capacity(other.len());
        let Some(other_min) = other.min.take() else {
            return moved;
        };

        self.nodes.reserve(other.len());
        for (old, node) in other.nodes.drain() {
            let new = self.nodes.insert(node);
            moved.insert(old, new);
        }
        for &new in moved.values() {
            let node = &mut self.nodes[new];
            let next = moved[node.link.next()];
            let prev = moved[node.link.prev()];
            node.link.set_next(next);
            node.link.set_prev(prev);
            node.parent = node.parent.map(|parent| moved[parent]);
            node.child = node.child.map(|child| moved[child]);
        }

        let other_min = moved[other_min];
        match self.min {
            None => self.min = Some(other_min),
            Some(min) => {
                RingOps::splice(&mut self.nodes, Some(min), Some(other_min));
                if self.precedes(other_min, min) {
                    self.min = Some(other_min);
                }
            }
        }
        debug!("merged {} entries into heap of {}", moved.len(), self.len());
        moved
    }

    /// Union of two heaps as a new heap. See [`merge`](Self::merge).
    ///
    /// Only the smaller heap's entries are relocated, and the result keeps
    /// this heap's comparator. Handles into the larger input stay valid;
    /// handles into the smaller one do not. Use `merge` when those have to
    /// be translated.
    ///
    /// # Time Complexity
    /// O(1) structural work plus O(min(n, m)) relocation
    pub fn union(mut self, mut other: Self) -> Self {
        if other.len() > self.len() {
            mem::swap(&mut self.compare, &mut other.compare);
            other.merge(self);
            return other;
        }
        self.merge(other);
        self
    }

    /// Removes every entry, dropping priorities, keys and payloads.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.min = None;
    }

    /// Pops every entry in priority order.
    ///
    /// Entries not yet yielded when the iterator is dropped stay in the heap.
    pub fn drain_sorted(&mut self) -> impl Iterator<Item = PoppedEntry<K, P, T>> + '_ {
        std::iter::from_fn(move || self.pop())
    }

    /// Checks every structural invariant, reporting the first one broken.
    ///
    /// The walk uses an explicit work list and never modifies the heap.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(min) = self.min else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::WrongCount {
                    recorded: self.nodes.len(),
                    reachable: 0,
                })
            };
        };
        let min_priority = match self.nodes.get(min) {
            Some(node) if node.parent.is_none() => &node.priority,
            _ => return Err(InvariantViolation::WrongMinimum),
        };

        let mut reachable = 0;
        let mut work: Vec<(EntryHandle, Option<EntryHandle>)> = vec![(min, None)];
        while let Some((start, parent)) = work.pop() {
            let mut ring_len = 0;
            let mut current = start;
            loop {
                let node = self
                    .nodes
                    .get(current)
                    .ok_or(InvariantViolation::BrokenRing(start))?;
                reachable += 1;
                ring_len += 1;
                if reachable > self.nodes.len() {
                    return Err(InvariantViolation::WrongCount {
                        recorded: self.nodes.len(),
                        reachable,
                    });
                }

                let next = node.link.next();
                match self.nodes.get(next) {
                    Some(right) if right.link.prev() == current => {}
                    _ => return Err(InvariantViolation::BrokenRing(current)),
                }
                if node.parent != parent {
                    return Err(InvariantViolation::BrokenParentLink(current));
                }
                match parent {
                    None => {
                        if node.marked {
                            return Err(InvariantViolation::MarkedRoot(current));
                        }
                        if self.compare.precedes(&node.priority, min_priority) {
                            return Err(InvariantViolation::WrongMinimum);
                        }
                    }
                    Some(parent) => {
                        if self
                            .compare
                            .precedes(&node.priority, &self.nodes[parent].priority)
                        {
                            return Err(InvariantViolation::HeapOrder(current));
                        }
                    }
                }
                match node.child {
                    Some(child) => work.push((child, Some(current))),
                    None if node.degree != 0 => {
                        return Err(InvariantViolation::WrongDegree(current))
                    }
                    None => {}
                }

                if next == start {
                    break;
                }
                current = next;
            }
            if let Some(parent) = parent {
                if self.nodes[parent].degree != ring_len {
                    return Err(InvariantViolation::WrongDegree(parent));
                }
            }
        }

        if reachable != self.nodes.len() {
            return Err(InvariantViolation::WrongCount {
                recorded: self.nodes.len(),
                reachable,
            });
        }
        Ok(())
    }

    /// Depth of an entry: 0 for roots.
    pub fn depth(&self, handle: EntryHandle) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.nodes.get(handle)?;
        while let Some(parent) = current.parent {
            depth += 1;
            current = &self.nodes[parent];
        }
        Some(depth)
    }

    /// Validates a decrease without applying it.
    pub(crate) fn check_decrease(
        &self,
        handle: EntryHandle,
        new_priority: &P,
    ) -> Result<(), HeapError> {
        let node = self.nodes.get(handle).ok_or(HeapError::InvalidHandle)?;
        if self.compare.precedes(&node.priority, new_priority) {
            return Err(HeapError::InvalidPriorityUpdate);
        }
        Ok(())
    }

    /// Replaces the key stored in an entry, returning the old one.
    pub(crate) fn replace_key(&mut self, handle: EntryHandle, key: K) -> Option<K> {
        self.nodes
            .get_mut(handle)
            .map(|node| mem::replace(&mut node.key, key))
    }

    #[inline]
    fn precedes(&self, a: EntryHandle, b: EntryHandle) -> bool {
        self.compare
            .precedes(&self.nodes[a].priority, &self.nodes[b].priority)
    }

    /// Splices the singleton ring `root` into the root ring.
    fn add_root(&mut self, root: EntryHandle) {
        match self.min {
            None => self.min = Some(root),
            Some(min) => {
                RingOps::insert_before(&mut self.nodes, min, root);
                if self.precedes(root, min) {
                    self.min = Some(root);
                }
            }
        }
    }

    /// Links trees of the same degree until every root degree is distinct.
    fn consolidate(&mut self, start: EntryHandle) {
        let bound = degree_bound(self.nodes.len());
        let mut slots: SmallVec<[Option<EntryHandle>; INLINE_DEGREE_SLOTS]> =
            smallvec![None; bound + 2];

        // Linking rewires the ring, so walk a snapshot.
        let roots = RingOps::collect(&self.nodes, start);
        let roots_before = roots.len();

        for root in roots {
            let mut x = root;
            let mut d = self.nodes[x].degree;
            loop {
                if d >= slots.len() {
                    slots.resize(d + 1, None);
                }
                let Some(mut y) = slots[d].take() else {
                    break;
                };
                if self.precedes(y, x) {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                d += 1;
            }
            slots[d] = Some(x);
        }

        self.min = None;
        let mut roots_after = 0;
        for root in slots.into_iter().flatten() {
            roots_after += 1;
            match self.min {
                None => {
                    RingOps::make_circular(&mut self.nodes, root);
                    self.min = Some(root);
                }
                Some(min) => {
                    RingOps::insert_before(&mut self.nodes, min, root);
                    if self.precedes(root, min) {
                        self.min = Some(root);
                    }
                }
            }
        }

        self.stats.consolidations += 1;
        debug!(
            "consolidated {} roots into {} (degree bound {})",
            roots_before, roots_after, bound
        );
    }

    /// Makes the root `y` a child of the root `x`.
    fn link(&mut self, y: EntryHandle, x: EntryHandle) {
        RingOps::remove(&mut self.nodes, y);
        match self.nodes[x].child {
            Some(child) => RingOps::insert_before(&mut self.nodes, child, y),
            None => {
                RingOps::make_circular(&mut self.nodes, y);
                self.nodes[x].child = Some(y);
            }
        }
        let node = &mut self.nodes[y];
        node.parent = Some(x);
        node.marked = false;
        self.nodes[x].degree += 1;
        self.stats.links += 1;
        trace!("linked {:?} under {:?}", y, x);
    }

    /// Cuts `x` from its parent `parent` and adds it to the root ring.
    fn cut(&mut self, x: EntryHandle, parent: EntryHandle) {
        let sibling = RingOps::remove(&mut self.nodes, x);
        let parent_node = &mut self.nodes[parent];
        if parent_node.child == Some(x) {
            parent_node.child = sibling;
        }
        parent_node.degree -= 1;

        let node = &mut self.nodes[x];
        node.parent = None;
        node.marked = false;
        RingOps::make_circular(&mut self.nodes, x);
        match self.min {
            None => self.min = Some(x),
            Some(min) => RingOps::insert_before(&mut self.nodes, min, x),
        }
        self.stats.cuts += 1;
        trace!("cut {:?} from {:?}", x, parent);
    }

    /// Walks up from `y`, cutting marked ancestors until an unmarked one is
    /// marked or a root is reached.
    fn cascading_cut(&mut self, mut y: EntryHandle) {
        while let Some(z) = self.nodes[y].parent {
            if !self.nodes[y].marked {
                self.nodes[y].marked = true;
                return;
            }
            self.cut(y, z);
            self.stats.cascading_cuts += 1;
            trace!("cascading cut continues at {:?}", z);
            y = z;
        }
    }
}

impl<K, P, T, C: Compare<P> + Default> Heap<K, P, T> for FibonacciHeap<K, P, T, C> {
    type Handle = EntryHandle;

    fn new() -> Self {
        Self::with_comparator(C::default())
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, priority: P, key: K, payload: T) -> Result<EntryHandle, HeapError> {
        Ok(FibonacciHeap::push(self, priority, key, payload))
    }

    fn peek(&self) -> Option<(&P, &K, &T)> {
        FibonacciHeap::peek(self)
    }

    fn pop(&mut self) -> Option<PoppedEntry<K, P, T>> {
        FibonacciHeap::pop(self)
    }

    fn decrease_priority(&mut self, handle: EntryHandle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_priority(self, handle, new_priority)
    }

    fn clear(&mut self) {
        FibonacciHeap::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::MaxFirst;

    /// Pushes priorities 0..n, each keyed by itself, and pops 0 so the rest
    /// consolidate.
    fn consolidated(n: i32) -> (FibonacciHeap<i32, i32>, Vec<EntryHandle>) {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (0..n).map(|i| heap.push(i, i, ())).collect();
        assert_eq!(heap.pop().map(|e| e.priority), Some(0));
        (heap, handles)
    }

    fn pop_all(heap: &mut FibonacciHeap<i32, i32>) -> Vec<i32> {
        heap.drain_sorted().map(|e| e.priority).collect()
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = FibonacciHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.push(5, "a", ());
        heap.push(3, "b", ());
        heap.push(7, "c", ());

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek(), Some((&3, &"b", &())));

        let min = heap.pop().map(PoppedEntry::into_parts);
        assert_eq!(min, Some((3, "b", ())));
        assert_eq!(heap.peek(), Some((&5, &"a", &())));
        assert_eq!(heap.len(), 2);
        heap.validate().unwrap();
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: FibonacciHeap<u8, u8> = FibonacciHeap::new();
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.top(), None);
        assert!(heap.pop().is_none());
        heap.validate().unwrap();
    }

    #[test]
    fn test_pop_order() {
        let mut heap = FibonacciHeap::new();
        for p in [7, 2, 9, 1, 5] {
            heap.push(p, p, ());
        }
        assert_eq!(pop_all(&mut heap), vec![1, 2, 5, 7, 9]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_payload_travels_with_entry() {
        let mut heap = FibonacciHeap::new();
        let h = heap.push(4, 'x', String::from("four"));
        heap.push(2, 'y', String::from("two"));
        heap.payload_mut(h).unwrap().push('!');

        assert_eq!(heap.pop().unwrap().payload, "two");
        let last = heap.pop().unwrap();
        assert_eq!((last.key, last.payload.as_str()), ('x', "four!"));
    }

    #[test]
    fn test_decrease_priority() {
        let mut heap = FibonacciHeap::new();
        heap.push(10, "a", ());
        let h2 = heap.push(20, "b", ());
        let h3 = heap.push(30, "c", ());

        assert_eq!(heap.peek(), Some((&10, &"a", &())));

        heap.decrease_priority(h2, 5).unwrap();
        assert_eq!(heap.peek(), Some((&5, &"b", &())));

        heap.decrease_priority(h3, 1).unwrap();
        assert_eq!(heap.peek(), Some((&1, &"c", &())));
        heap.validate().unwrap();
    }

    #[test]
    fn test_decrease_priority_of_minimum() {
        let mut heap = FibonacciHeap::new();
        let h = heap.push(3, 'm', ());
        heap.push(8, 'n', ());
        heap.decrease_priority(h, 1).unwrap();
        let popped = heap.pop().unwrap();
        assert_eq!((popped.priority, popped.key), (1, 'm'));
    }

    #[test]
    fn test_rejects_worse_priority() {
        let (mut heap, handles) = consolidated(8);
        let before: Vec<_> = handles[1..].iter().map(|&h| *heap.priority(h).unwrap()).collect();

        assert_eq!(
            heap.decrease_priority(handles[4], 100),
            Err(HeapError::InvalidPriorityUpdate)
        );
        let after: Vec<_> = handles[1..].iter().map(|&h| *heap.priority(h).unwrap()).collect();
        assert_eq!(before, after);
        assert_eq!(heap.len(), 7);
        assert_eq!(heap.peek().map(|(p, _, _)| *p), Some(1));
        heap.validate().unwrap();
    }

    #[test]
    fn test_equal_priority_is_accepted() {
        let (mut heap, handles) = consolidated(6);
        let cuts = heap.stats().cuts;
        heap.decrease_priority(handles[3], 3).unwrap();
        assert_eq!(heap.stats().cuts, cuts);
        heap.validate().unwrap();
    }

    #[test]
    fn test_stale_handle() {
        let mut heap = FibonacciHeap::new();
        let h = heap.push(1, 1, ());
        heap.pop();
        heap.push(2, 2, ());
        assert!(!heap.contains(h));
        assert_eq!(heap.decrease_priority(h, 0), Err(HeapError::InvalidHandle));
        assert_eq!(heap.remove(h), Err(HeapError::InvalidHandle));
    }

    #[test]
    fn test_consolidation_builds_single_tree() {
        // 1..=8 consolidate into one binomial tree of degree 3.
        let (heap, handles) = consolidated(9);
        let root = heap.peek_handle().unwrap();
        assert_eq!(root, handles[1]);
        assert_eq!(heap.nodes[root].degree, 3);
        assert_eq!(RingOps::count(&heap.nodes, root), 1);
        assert_eq!(heap.depth(handles[8]), Some(3));
        assert_eq!(heap.stats().links, 7);
        heap.validate().unwrap();
    }

    #[test]
    fn test_consolidation_of_large_heap() {
        // 4096 remaining entries fill the inline degree table up to degree 12.
        let (heap, handles) = consolidated(4097);
        let root = heap.peek_handle().unwrap();
        assert_eq!(root, handles[1]);
        assert_eq!(heap.nodes[root].degree, 12);
        assert_eq!(RingOps::count(&heap.nodes, root), 1);
        heap.validate().unwrap();
    }

    #[test]
    fn test_stats_delta_across_reset() {
        let (mut heap, handles) = consolidated(9);
        let before = heap.stats();
        assert_eq!(before.links, 7);
        heap.reset_stats();
        heap.decrease_priority(handles[8], 0).unwrap();

        let delta = heap.stats().since(&before);
        assert_eq!(delta.links, 0);
        assert_eq!(delta.cuts, 1);
    }

    #[test]
    fn test_cut_marks_parent() {
        let (mut heap, handles) = consolidated(9);
        // 8 hangs under 7, which hangs under 5.
        heap.decrease_priority(handles[8], 0).unwrap();
        assert_eq!(heap.depth(handles[8]), Some(0));
        assert!(heap.nodes[handles[7]].marked);
        assert_eq!(heap.stats().cuts, 1);
        assert_eq!(heap.peek_handle(), Some(handles[8]));
        heap.validate().unwrap();
    }

    #[test]
    fn test_cascading_cut() {
        let (mut heap, handles) = consolidated(9);
        heap.reset_stats();

        // 6 leaves 5, marking it.
        heap.decrease_priority(handles[6], 3).unwrap();
        assert!(heap.nodes[handles[5]].marked);
        assert_eq!(heap.stats().cascading_cuts, 0);

        // 7 leaves the marked 5, which is cut in turn and unmarked.
        heap.decrease_priority(handles[7], 2).unwrap();
        let stats = heap.stats();
        assert_eq!(stats.cuts, 3);
        assert_eq!(stats.cascading_cuts, 1);
        assert_eq!(heap.depth(handles[5]), Some(0));
        assert!(!heap.nodes[handles[5]].marked);
        assert_eq!(heap.nodes[handles[1]].degree, 2);
        heap.validate().unwrap();

        assert_eq!(pop_all(&mut heap), vec![1, 2, 2, 3, 3, 4, 5, 8]);
    }

    #[test]
    fn test_remove_arbitrary() {
        let (mut heap, handles) = consolidated(9);
        let removed = heap.remove(handles[5]).unwrap();
        assert_eq!((removed.priority, removed.key), (5, 5));
        assert_eq!(heap.len(), 7);
        heap.validate().unwrap();
        assert_eq!(pop_all(&mut heap), vec![1, 2, 3, 4, 6, 7, 8]);
    }

    #[test]
    fn test_remove_root_and_minimum() {
        let mut heap = FibonacciHeap::new();
        let a = heap.push(1, 'a', ());
        let b = heap.push(2, 'b', ());
        assert_eq!(heap.remove(b).unwrap().key, 'b');
        assert_eq!(heap.remove(a).unwrap().key, 'a');
        assert!(heap.is_empty());
        heap.validate().unwrap();
    }

    #[test]
    fn test_merge() {
        let mut heap1 = FibonacciHeap::new();
        heap1.push(5, "a", ());
        heap1.push(10, "b", ());

        let mut heap2 = FibonacciHeap::new();
        heap2.push(3, "c", ());
        let d = heap2.push(7, "d", ());

        let moved = heap1.merge(heap2);
        assert_eq!(heap1.peek(), Some((&3, &"c", &())));
        assert_eq!(heap1.len(), 4);
        heap1.validate().unwrap();

        heap1.decrease_priority(moved[d], 1).unwrap();
        assert_eq!(heap1.peek(), Some((&1, &"d", &())));
    }

    #[test]
    fn test_merge_preserves_trees() {
        let (heap1, _) = consolidated(9);
        let (other, other_handles) = consolidated(5);
        let deep = other_handles[4];
        let other_depth = other.depth(deep);

        let mut merged = FibonacciHeap::new();
        merged.push(100, 100, ());
        let mut merged = merged.union(heap1);
        let moved = merged.merge(other);

        assert_eq!(merged.len(), 1 + 8 + 4);
        assert_eq!(merged.depth(moved[deep]), other_depth);
        merged.validate().unwrap();
        let popped = pop_all(&mut merged);
        assert_eq!(popped, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 6, 7, 8, 100]);
    }

    #[test]
    fn test_union_relocates_smaller_side() {
        let (large, handles) = consolidated(9);
        let mut small = FibonacciHeap::new();
        small.push(0, 100, ());

        let mut joined = small.union(large);
        assert_eq!(joined.len(), 9);
        assert_eq!(joined.depth(handles[8]), Some(3));
        assert_eq!(joined.key(handles[8]), Some(&8));
        assert_eq!(joined.peek(), Some((&0, &100, &())));
        joined.validate().unwrap();
        assert_eq!(pop_all(&mut joined), vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_union_keeps_receiver_comparator() {
        let by_value = |a: &i32, b: &i32| a < b;
        let mut small = FibonacciHeap::with_comparator(by_value);
        small.push(5, 'a', ());
        let mut large = FibonacciHeap::with_comparator(by_value);
        for (p, k) in [(3, 'b'), (9, 'c'), (1, 'd')] {
            large.push(p, k, ());
        }
        let mut joined = small.union(large);
        assert!(joined.comparator().precedes(&1, &2));
        let keys: Vec<_> = joined.drain_sorted().map(|e| e.key).collect();
        assert_eq!(keys, vec!['d', 'b', 'a', 'c']);
    }

    #[test]
    fn test_merge_with_empty() {
        let mut heap: FibonacciHeap<i32, i32> = FibonacciHeap::new();
        let moved = heap.merge(FibonacciHeap::new());
        assert!(moved.is_empty());
        assert!(heap.is_empty());

        let mut other = FibonacciHeap::new();
        other.push(4, 4, ());
        heap.merge(other);
        assert_eq!(heap.peek(), Some((&4, &4, &())));
        heap.validate().unwrap();
    }

    #[test]
    fn test_max_heap_comparator() {
        let mut heap = FibonacciHeap::with_comparator(MaxFirst);
        for p in [3, 9, 1, 4] {
            heap.push(p, (), ());
        }
        let h = heap.push(2, (), ());
        heap.decrease_priority(h, 10).unwrap();
        assert_eq!(
            heap.decrease_priority(h, 0),
            Err(HeapError::InvalidPriorityUpdate)
        );
        let order: Vec<_> = heap.drain_sorted().map(|e| e.priority).collect();
        assert_eq!(order, vec![10, 9, 4, 3, 1]);
    }

    #[test]
    fn test_closure_comparator() {
        let mut heap = FibonacciHeap::with_comparator(|a: &(u8, u8), b: &(u8, u8)| a.1 < b.1);
        heap.push((1, 9), "late", ());
        heap.push((2, 1), "early", ());
        assert_eq!(heap.pop().unwrap().key, "early");
    }

    #[test]
    fn test_clear() {
        let (mut heap, handles) = consolidated(20);
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert!(!heap.contains(handles[10]));
        heap.validate().unwrap();

        heap.push(1, 1, ());
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_degree_bound() {
        assert_eq!(degree_bound(0), 0);
        assert_eq!(degree_bound(1), 0);
        assert_eq!(degree_bound(2), 1);
        assert_eq!(degree_bound(1000), 14);
    }

    #[test]
    fn test_validate_detects_heap_order() {
        let (mut heap, handles) = consolidated(5);
        // Bypass decrease_priority so the child outranks its parent.
        heap.nodes[handles[4]].priority = -1;
        assert_eq!(
            heap.validate(),
            Err(InvariantViolation::HeapOrder(handles[4]))
        );
    }

    #[test]
    fn test_validate_detects_wrong_degree() {
        let (mut heap, handles) = consolidated(5);
        heap.nodes[handles[1]].degree += 1;
        assert_eq!(
            heap.validate(),
            Err(InvariantViolation::WrongDegree(handles[1]))
        );
    }
}
