//! Priority orderings
//!
//! Every heap in this crate is a min-heap with respect to a [`Compare`]
//! implementation: the entry that [`precedes`](Compare::precedes) all others
//! is the one returned by `peek` and `pop`. Swapping the comparator turns the
//! same structure into a max-heap.
//!
//! # Example
//!
//! ```rust
//! use rust_fibonacci_queue::compare::{Compare, MaxFirst, MinFirst};
//!
//! assert!(MinFirst.precedes(&1, &2));
//! assert!(MaxFirst.precedes(&2, &1));
//!
//! // Any `Fn(&P, &P) -> bool` is a comparator too.
//! let by_len = |a: &&str, b: &&str| a.len() < b.len();
//! assert!(by_len.precedes(&"ab", &"abc"));
//! ```

/// A strict "ranks before" predicate over priorities.
///
/// Implementations must be a strict weak ordering: irreflexive, transitive,
/// and with transitive incomparability. Entries that do not precede each
/// other in either direction are treated as equal.
pub trait Compare<P: ?Sized> {
    /// Returns true if `a` must be extracted before `b`.
    fn precedes(&self, a: &P, b: &P) -> bool;
}

/// Smallest priority first, using `Ord`. The default for every heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinFirst;

impl<P: Ord + ?Sized> Compare<P> for MinFirst {
    #[inline]
    fn precedes(&self, a: &P, b: &P) -> bool {
        a < b
    }
}

/// Largest priority first, using `Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaxFirst;

impl<P: Ord + ?Sized> Compare<P> for MaxFirst {
    #[inline]
    fn precedes(&self, a: &P, b: &P) -> bool {
        a > b
    }
}

impl<P: ?Sized, F> Compare<P> for F
where
    F: Fn(&P, &P) -> bool,
{
    #[inline]
    fn precedes(&self, a: &P, b: &P) -> bool {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_first() {
        assert!(MinFirst.precedes(&1, &2));
        assert!(!MinFirst.precedes(&2, &1));
        assert!(!MinFirst.precedes(&2, &2));
    }

    #[test]
    fn test_max_first() {
        assert!(MaxFirst.precedes(&"b", &"a"));
        assert!(!MaxFirst.precedes(&"a", &"a"));
    }

    #[test]
    fn test_closure_comparator() {
        let by_abs = |a: &i32, b: &i32| a.abs() < b.abs();
        assert!(by_abs.precedes(&-1, &3));
        assert!(!by_abs.precedes(&-3, &3));
    }
}
