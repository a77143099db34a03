//! Fibonacci heap priority queues for Rust
//!
//! This crate provides an arena-backed Fibonacci heap and a keyed queue built
//! on top of it.
//!
//! # Features
//!
//! - **Fibonacci Heap**: O(1) amortized push, decrease_priority and merge;
//!   O(log n) amortized pop. Entries carry a priority, a key and a payload,
//!   and are ordered by a caller-supplied comparator.
//! - **Keyed Queue**: the same heap plus an index from key to entry, so an
//!   entry can be found and re-prioritised by key in O(1) average time.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_queue::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.push(5, "item1", ());
//! heap.push(3, "item2", ());
//! heap.decrease_priority(handle1, 1).unwrap();
//! assert_eq!(heap.peek(), Some((&1, &"item1", &())));
//! ```

pub mod compare;
pub mod fibonacci;
pub mod keyed;
pub mod stats;
pub mod traits;

// Re-export the main types for convenience
pub use compare::{Compare, MaxFirst, MinFirst};
pub use fibonacci::{EntryHandle, FibonacciHeap};
pub use keyed::KeyedQueue;
pub use traits::{Heap, HeapError, PoppedEntry};
