//! Keyed priority queue
//!
//! [`KeyedQueue`] wraps a [`FibonacciHeap`] with an index from each entry's
//! key to its handle, so an entry can be found and re-prioritised by key in
//! O(1) average time instead of by scanning.
//!
//! Keys are unique: pushing a key that is already queued is rejected with
//! [`HeapError::DuplicateKey`]. The index is updated right after every heap
//! operation that succeeds, and it never names an entry that has left the
//! heap.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_queue::keyed::KeyedQueue;
//!
//! let mut queue = KeyedQueue::new();
//! queue.push(40, "b", ()).unwrap();
//! queue.push(25, "c", ()).unwrap();
//!
//! queue.decrease_priority(&"b", 10).unwrap();
//! assert_eq!(queue.pop().map(|e| e.key), Some("b"));
//! assert!(!queue.contains(&"b"));
//! ```

use crate::compare::{Compare, MinFirst};
use crate::fibonacci::{EntryHandle, FibonacciHeap};
use crate::stats::HeapStats;
use crate::traits::{ConsistencyFault, Heap, HeapError, InvariantViolation, PoppedEntry};
use log::error;
use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A Fibonacci heap with O(1) lookup of entries by key.
pub struct KeyedQueue<K, P, T = (), C = MinFirst> {
    heap: FibonacciHeap<K, P, T, C>,
    index: FxHashMap<K, EntryHandle>,
}

impl<K, P: Ord, T> KeyedQueue<K, P, T, MinFirst>
where
    K: Hash + Eq + Clone + Debug,
{
    /// Creates an empty queue ordered by `Ord`.
    pub fn new() -> Self {
        Self::with_comparator(MinFirst)
    }
}

impl<K, P: Ord, T> Default for KeyedQueue<K, P, T, MinFirst>
where
    K: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P, T, C> KeyedQueue<K, P, T, C>
where
    K: Hash + Eq + Clone + Debug,
    C: Compare<P>,
{
    /// Creates an empty queue ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        Self::with_capacity_and_comparator(0, compare)
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            heap: FibonacciHeap::with_capacity_and_comparator(capacity, compare),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Returns the number of queued entries
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The underlying heap, read-only.
    pub fn heap(&self) -> &FibonacciHeap<K, P, T, C> {
        &self.heap
    }

    /// Structural operation counters of the underlying heap.
    pub fn stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Queues an entry under `key`.
    ///
    /// # Errors
    /// [`HeapError::DuplicateKey`] if `key` is already queued; nothing is
    /// inserted.
    pub fn push(&mut self, priority: P, key: K, payload: T) -> Result<EntryHandle, HeapError> {
        if self.index.contains_key(&key) {
            return Err(HeapError::DuplicateKey);
        }
        let handle = self.heap.push(priority, key.clone(), payload);
        self.index.insert(key, handle);
        Ok(handle)
    }

    /// Handle of the entry queued under `key`.
    pub fn find(&self, key: &K) -> Option<EntryHandle> {
        self.index.get(key).copied()
    }

    /// Returns true if an entry is queued under `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Priority and payload of the entry queued under `key`.
    pub fn get(&self, key: &K) -> Option<(&P, &T)> {
        let handle = self.find(key)?;
        self.heap
            .get(handle)
            .map(|(priority, _, payload)| (priority, payload))
    }

    /// Priority of the entry queued under `key`.
    pub fn priority(&self, key: &K) -> Option<&P> {
        self.find(key).and_then(|handle| self.heap.priority(handle))
    }

    /// Mutable access to the payload queued under `key`.
    pub fn payload_mut(&mut self, key: &K) -> Option<&mut T> {
        let handle = self.find(key)?;
        self.heap.payload_mut(handle)
    }

    /// Returns the minimum entry without removing it.
    pub fn peek(&self) -> Option<(&P, &K, &T)> {
        self.heap.peek()
    }

    /// Iterates over every entry in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &P, &T)> + '_ {
        self.heap
            .iter()
            .map(|(_, priority, key, payload)| (key, priority, payload))
    }

    /// Removes and returns the minimum entry, dropping its key from the index.
    ///
    /// # Panics
    /// If the index has no record of the extracted entry. That means the
    /// index and the heap have diverged, which no sequence of public calls
    /// can cause.
    pub fn pop(&mut self) -> Option<PoppedEntry<K, P, T>> {
        let handle = self.heap.peek_handle()?;
        let entry = self.heap.pop()?;
        match self.index.remove(&entry.key) {
            Some(indexed) if indexed == handle => Some(entry),
            _ => consistency_fault(&entry.key),
        }
    }

    /// Removes the entry queued under `key`.
    ///
    /// # Errors
    /// [`HeapError::KeyNotFound`] if nothing is queued under `key`.
    pub fn remove(&mut self, key: &K) -> Result<PoppedEntry<K, P, T>, HeapError> {
        let handle = self.index.remove(key).ok_or(HeapError::KeyNotFound)?;
        match self.heap.remove(handle) {
            Ok(entry) => Ok(entry),
            Err(_) => consistency_fault(key),
        }
    }

    /// Lowers the priority of the entry queued under `key`.
    ///
    /// The key and the priority are independent, so the index is unchanged.
    ///
    /// # Errors
    /// - [`HeapError::KeyNotFound`] if nothing is queued under `key`
    /// - [`HeapError::InvalidPriorityUpdate`] if `new_priority` ranks after
    ///   the current priority
    pub fn decrease_priority(&mut self, key: &K, new_priority: P) -> Result<(), HeapError> {
        let handle = self.find(key).ok_or(HeapError::KeyNotFound)?;
        match self.heap.decrease_priority(handle, new_priority) {
            Err(HeapError::InvalidHandle) => consistency_fault(key),
            result => result,
        }
    }

    /// Lowers the priority of the entry identified by `handle`.
    pub fn decrease_priority_by_handle(
        &mut self,
        handle: EntryHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        self.heap.decrease_priority(handle, new_priority)
    }

    /// Moves the entry queued under `old` to `new_key` while lowering its
    /// priority.
    ///
    /// This serves queues whose key is derived from the priority. Every
    /// precondition is checked before anything changes.
    ///
    /// # Errors
    /// - [`HeapError::KeyNotFound`] if nothing is queued under `old`
    /// - [`HeapError::DuplicateKey`] if another entry is queued under `new_key`
    /// - [`HeapError::InvalidPriorityUpdate`] if `new_priority` ranks after
    ///   the current priority
    pub fn rekey(&mut self, old: &K, new_key: K, new_priority: P) -> Result<(), HeapError> {
        let handle = self.find(old).ok_or(HeapError::KeyNotFound)?;
        if new_key != *old && self.index.contains_key(&new_key) {
            return Err(HeapError::DuplicateKey);
        }
        self.heap.check_decrease(handle, &new_priority)?;

        self.index.remove(old);
        self.heap.replace_key(handle, new_key.clone());
        self.index.insert(new_key, handle);
        self.heap.decrease_priority(handle, new_priority)
    }

    /// Removes every entry from both the heap and the index.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    /// Moves every entry of `other` into this queue.
    ///
    /// # Errors
    /// [`HeapError::DuplicateKey`] if the queues share a key; neither queue
    /// is changed and `other` is dropped.
    pub fn merge(&mut self, other: Self) -> Result<(), HeapError> {
        if other.index.keys().any(|key| self.index.contains_key(key)) {
            return Err(HeapError::DuplicateKey);
        }
        let KeyedQueue { heap, index } = other;
        let moved = self.heap.merge(heap);
        self.index.reserve(index.len());
        for (key, old) in index {
            match moved.get(old) {
                Some(&new) => {
                    self.index.insert(key, new);
                }
                None => consistency_fault(&key),
            }
        }
        Ok(())
    }

    /// Checks the heap invariants and that the index matches the heap exactly.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.heap.validate()?;
        if self.index.len() != self.heap.len() {
            return Err(InvariantViolation::WrongCount {
                recorded: self.index.len(),
                reachable: self.heap.len(),
            });
        }
        for (key, &handle) in &self.index {
            if self.heap.key(handle) != Some(key) {
                return Err(InvariantViolation::IndexMismatch(handle));
            }
        }
        Ok(())
    }
}

impl<K, P, T, C> Heap<K, P, T> for KeyedQueue<K, P, T, C>
where
    K: Hash + Eq + Clone + Debug,
    C: Compare<P> + Default,
{
    type Handle = EntryHandle;

    fn new() -> Self {
        Self::with_comparator(C::default())
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn push(&mut self, priority: P, key: K, payload: T) -> Result<EntryHandle, HeapError> {
        KeyedQueue::push(self, priority, key, payload)
    }

    fn peek(&self) -> Option<(&P, &K, &T)> {
        self.heap.peek()
    }

    fn pop(&mut self) -> Option<PoppedEntry<K, P, T>> {
        KeyedQueue::pop(self)
    }

    fn decrease_priority(&mut self, handle: EntryHandle, new_priority: P) -> Result<(), HeapError> {
        self.decrease_priority_by_handle(handle, new_priority)
    }

    fn clear(&mut self) {
        KeyedQueue::clear(self)
    }
}

/// Reports a divergence between the index and the heap and aborts the
/// operation.
#[cold]
fn consistency_fault<K: Debug>(key: &K) -> ! {
    let fault = ConsistencyFault {
        key: format!("{:?}", key),
    };
    error!("{}", fault);
    panic!("{}", fault);
}
