//! Common traits and error types for the heaps in this crate
//!
//! - [`Heap`]: the operations shared by [`FibonacciHeap`] and [`KeyedQueue`]
//! - [`HeapError`]: recoverable failures reported to the caller
//! - [`ConsistencyFault`]: the panic message for a keyed queue whose index
//!   disagrees with its heap
//! - [`InvariantViolation`]: what `validate` reports when a structural
//!   invariant does not hold
//!
//! [`FibonacciHeap`]: crate::fibonacci::FibonacciHeap
//! [`KeyedQueue`]: crate::keyed::KeyedQueue

use crate::fibonacci::EntryHandle;
use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The new priority ranks after the current priority
    #[error("new priority ranks after the current priority")]
    InvalidPriorityUpdate,
    /// The handle is no longer valid (element was removed)
    #[error("handle is no longer valid (element was removed)")]
    InvalidHandle,
    /// No entry is stored under the requested key
    #[error("key is not present in the queue")]
    KeyNotFound,
    /// An entry is already stored under the key
    #[error("key is already present in the queue")]
    DuplicateKey,
}

/// The keyed index and the heap disagree about an extracted entry.
///
/// This is never returned as a `Result`: continuing after it would silently
/// lose entries, so it is raised as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key {key} cannot be found in the keyed queue index")]
pub struct ConsistencyFault {
    /// `Debug` rendering of the key that was missing or mis-mapped
    pub key: String,
}

/// A broken structural invariant found by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// `prev` is not the inverse of `next` at this entry
    #[error("ring links are inconsistent at {0:?}")]
    BrokenRing(EntryHandle),
    /// The entry's parent link does not match the ring it sits in
    #[error("parent link is wrong at {0:?}")]
    BrokenParentLink(EntryHandle),
    /// The stored degree differs from the child ring length
    #[error("degree does not match child count at {0:?}")]
    WrongDegree(EntryHandle),
    /// The entry ranks before its parent
    #[error("heap order violated at {0:?}")]
    HeapOrder(EntryHandle),
    /// A root carries a mark
    #[error("root {0:?} is marked")]
    MarkedRoot(EntryHandle),
    /// The recorded minimum is missing, not a root, or not minimal
    #[error("recorded minimum is wrong")]
    WrongMinimum,
    /// The recorded length differs from the number of reachable entries
    #[error("recorded length {recorded} but {reachable} entries are reachable")]
    WrongCount {
        /// Value of `len()`
        recorded: usize,
        /// Entries reached from the root ring
        reachable: usize,
    },
    /// A keyed queue's index disagrees with the stored key of an entry
    #[error("keyed index does not match entry {0:?}")]
    IndexMismatch(EntryHandle),
}

/// A handle to an element in the heap, used for decrease_priority operations
///
/// This is an opaque type that identifies a specific element in the heap.
pub trait Handle: Copy + PartialEq + Eq {}

/// An entry that has left the heap. The caller owns all of its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoppedEntry<K, P, T = ()> {
    /// Priority at the time of extraction
    pub priority: P,
    /// Identifying key
    pub key: K,
    /// Attached payload
    pub payload: T,
}

impl<K, P, T> PoppedEntry<K, P, T> {
    /// Splits the entry into `(priority, key, payload)`.
    pub fn into_parts(self) -> (P, K, T) {
        (self.priority, self.key, self.payload)
    }
}

/// Base trait for the priority queues in this crate
///
/// Entries carry a priority, an identifying key and a payload. Ordering is
/// decided by the heap's comparator on the priority alone.
///
/// # Example
///
/// ```rust
/// use rust_fibonacci_queue::Heap;
/// use rust_fibonacci_queue::fibonacci::FibonacciHeap;
///
/// fn drain_priorities<H: Heap<&'static str, i32>>(mut heap: H) -> Vec<i32> {
///     let mut out = Vec::new();
///     while let Some(entry) = heap.pop() {
///         out.push(entry.priority);
///     }
///     out
/// }
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(3, "three", ());
/// heap.push(1, "one", ());
/// assert_eq!(drain_priorities(heap), vec![1, 3]);
/// ```
pub trait Heap<K, P, T = ()> {
    /// The handle type for this heap, used to reference elements for decrease_priority
    type Handle: Handle;

    /// Creates a new empty heap
    fn new() -> Self
    where
        Self: Sized;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an element, returning its handle
    ///
    /// # Time Complexity
    /// O(1) amortized
    fn push(&mut self, priority: P, key: K, payload: T) -> Result<Self::Handle, HeapError>;

    /// Returns the minimum entry without removing it
    ///
    /// # Time Complexity
    /// O(1)
    fn peek(&self) -> Option<(&P, &K, &T)>;

    /// Removes and returns the minimum entry
    ///
    /// # Time Complexity
    /// O(log n) amortized
    fn pop(&mut self) -> Option<PoppedEntry<K, P, T>>;

    /// Lowers the priority of the element identified by the handle
    ///
    /// # Errors
    /// - `HeapError::InvalidHandle` if the element has left the heap
    /// - `HeapError::InvalidPriorityUpdate` if the new priority ranks after
    ///   the current one
    ///
    /// # Time Complexity
    /// O(1) amortized
    fn decrease_priority(&mut self, handle: Self::Handle, new_priority: P) -> Result<(), HeapError>;

    /// Removes every element
    fn clear(&mut self);
}
