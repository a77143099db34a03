//! Circular doubly-linked rings threaded through a slotmap arena.
//!
//! Every node lives in a [`SlotMap`] and carries a [`RingLink`] naming its
//! neighbours by key instead of by pointer. This gives the same O(1) splice
//! and removal that an intrusive pointer list offers, while the arena keeps
//! sole ownership of the nodes: a node whose neighbours still mention it can
//! never be freed twice, and a stale key is caught by the slotmap's
//! generation check instead of reading freed memory.
//!
//! # Circular vs Linear Lists
//!
//! In a circular ring:
//! - A single node points to itself (both `next` and `prev`)
//! - There is no head or tail - any member can be the entry point
//! - Splicing two rings together is O(1)
//! - Iteration wraps around, so it must track its starting point
//!
//! A node may sit in at most one ring per embedded [`RingLink`].
//!
//! # Example
//!
//! ```rust
//! use arena_ring::{Linked, RingLink, RingOps};
//! use slotmap::{DefaultKey, SlotMap};
//!
//! struct Node {
//!     link: RingLink<DefaultKey>,
//!     value: i32,
//! }
//!
//! impl Linked<DefaultKey> for Node {
//!     fn link(&self) -> &RingLink<DefaultKey> {
//!         &self.link
//!     }
//!     fn link_mut(&mut self) -> &mut RingLink<DefaultKey> {
//!         &mut self.link
//!     }
//! }
//!
//! let mut arena = SlotMap::new();
//! let a = arena.insert(Node { link: RingLink::new(), value: 1 });
//! let b = arena.insert(Node { link: RingLink::new(), value: 2 });
//!
//! RingOps::make_circular(&mut arena, a);
//! RingOps::make_circular(&mut arena, b);
//! RingOps::splice(&mut arena, Some(a), Some(b));
//!
//! assert_eq!(RingOps::next(&arena, a), b);
//! assert_eq!(RingOps::next(&arena, b), a);
//! assert_eq!(arena[b].value, 2);
//! ```

use slotmap::{Key, SlotMap};

// =============================================================================
// RingLink
// =============================================================================

/// Neighbour keys of one ring member.
///
/// When unlinked, both keys are null. When linked (even as a single node),
/// both name live members of the same arena; a lone member names itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RingLink<K: Key> {
    next: K,
    prev: K,
}

impl<K: Key> RingLink<K> {
    /// Creates a new unlinked `RingLink`.
    #[inline]
    pub fn new() -> Self {
        RingLink {
            next: K::null(),
            prev: K::null(),
        }
    }

    /// Checks whether this link is part of a ring.
    #[inline]
    pub fn is_linked(&self) -> bool {
        !self.next.is_null()
    }

    /// The following member (the "right" sibling).
    #[inline]
    pub fn next(&self) -> K {
        self.next
    }

    /// The preceding member (the "left" sibling).
    #[inline]
    pub fn prev(&self) -> K {
        self.prev
    }

    /// Overwrites the following member.
    ///
    /// This does not update the neighbour. Prefer the [`RingOps`] functions,
    /// which keep both directions consistent.
    #[inline]
    pub fn set_next(&mut self, next: K) {
        self.next = next;
    }

    /// Overwrites the preceding member. See [`RingLink::set_next`].
    #[inline]
    pub fn set_prev(&mut self, prev: K) {
        self.prev = prev;
    }

    /// Resets both neighbours to null without touching them.
    #[inline]
    pub fn force_unlink(&mut self) {
        self.next = K::null();
        self.prev = K::null();
    }
}

impl<K: Key> Default for RingLink<K> {
    #[inline]
    fn default() -> Self {
        RingLink::new()
    }
}

/// Implemented by arena nodes that embed a [`RingLink`].
pub trait Linked<K: Key> {
    /// The embedded ring link.
    fn link(&self) -> &RingLink<K>;

    /// The embedded ring link, mutably.
    fn link_mut(&mut self) -> &mut RingLink<K>;
}

// =============================================================================
// RingOps
// =============================================================================

/// Operations on rings stored in a [`SlotMap`].
///
/// All structural operations are O(1); [`RingOps::count`] and
/// [`RingOps::collect`] are linear in the ring length.
///
/// # Panics
///
/// Every key passed in must name a live arena entry. A missing key means the
/// ring is corrupt, which is a programming error: the lookup panics rather
/// than attempting a repair.
#[derive(Clone, Copy, Debug, Default)]
pub struct RingOps;

impl RingOps {
    /// The member after `at`.
    #[inline]
    pub fn next<K: Key, N: Linked<K>>(arena: &SlotMap<K, N>, at: K) -> K {
        arena[at].link().next()
    }

    /// The member before `at`.
    #[inline]
    pub fn prev<K: Key, N: Linked<K>>(arena: &SlotMap<K, N>, at: K) -> K {
        arena[at].link().prev()
    }

    /// Makes `at` a ring of one element.
    ///
    /// Any previous links are discarded without updating the old neighbours,
    /// so `at` must already be detached from them.
    #[inline]
    pub fn make_circular<K: Key, N: Linked<K>>(arena: &mut SlotMap<K, N>, at: K) {
        let link = arena[at].link_mut();
        link.set_next(at);
        link.set_prev(at);
    }

    /// Inserts the unlinked node `new` immediately before `at`.
    #[inline]
    pub fn insert_before<K: Key, N: Linked<K>>(arena: &mut SlotMap<K, N>, at: K, new: K) {
        debug_assert!(arena[at].link().is_linked(), "at is not linked");
        let prev = arena[at].link().prev();
        arena[at].link_mut().set_prev(new);
        {
            let link = arena[new].link_mut();
            link.set_next(at);
            link.set_prev(prev);
        }
        arena[prev].link_mut().set_next(new);
    }

    /// Removes `at` from its ring and leaves it unlinked.
    ///
    /// Returns the member that followed `at`, or `None` if `at` was the only
    /// element and the ring is now empty.
    #[inline]
    pub fn remove<K: Key, N: Linked<K>>(arena: &mut SlotMap<K, N>, at: K) -> Option<K> {
        let (next, prev) = {
            let link = arena[at].link();
            debug_assert!(link.is_linked(), "node is not linked");
            (link.next(), link.prev())
        };
        arena[at].link_mut().force_unlink();
        if next == at {
            return None;
        }
        arena[prev].link_mut().set_next(next);
        arena[next].link_mut().set_prev(prev);
        Some(next)
    }

    /// Joins two rings into one.
    ///
    /// Returns an entry point into the merged ring, or `None` if both were
    /// empty. If either side is `None`, the other is returned untouched.
    ///
    /// `a` and `b` must belong to different rings.
    #[inline]
    pub fn splice<K: Key, N: Linked<K>>(
        arena: &mut SlotMap<K, N>,
        a: Option<K>,
        b: Option<K>,
    ) -> Option<K> {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (Some(a), Some(b)) => {
                // Before:
                //   Ring A: ... <-> a_prev <-> a <-> ...
                //   Ring B: ... <-> b_prev <-> b <-> ...
                //
                // After:
                //   ... <-> a_prev <-> b <-> ... <-> b_prev <-> a <-> ...
                let a_prev = arena[a].link().prev();
                let b_prev = arena[b].link().prev();

                arena[a_prev].link_mut().set_next(b);
                arena[b].link_mut().set_prev(a_prev);

                arena[b_prev].link_mut().set_next(a);
                arena[a].link_mut().set_prev(b_prev);

                Some(a)
            }
        }
    }

    /// Counts the members of the ring containing `start`.
    pub fn count<K: Key, N: Linked<K>>(arena: &SlotMap<K, N>, start: K) -> usize {
        Self::iter(arena, start).count()
    }

    /// Snapshots the ring containing `start`, beginning at `start`.
    ///
    /// The snapshot stays valid while the ring is rewired, which live
    /// traversal does not.
    pub fn collect<K: Key, N: Linked<K>>(arena: &SlotMap<K, N>, start: K) -> Vec<K> {
        Self::iter(arena, start).collect()
    }

    /// Iterates the ring containing `start` once, following `next`.
    pub fn iter<K: Key, N: Linked<K>>(arena: &SlotMap<K, N>, start: K) -> RingIter<'_, K, N> {
        RingIter {
            arena,
            start,
            current: Some(start),
        }
    }
}

/// Iterator over one ring, created by [`RingOps::iter`].
pub struct RingIter<'a, K: Key, N> {
    arena: &'a SlotMap<K, N>,
    start: K,
    current: Option<K>,
}

impl<'a, K: Key, N: Linked<K>> Iterator for RingIter<'a, K, N> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.current?;
        let next = self.arena[current].link().next();
        self.current = if next == self.start { None } else { Some(next) };
        Some(current)
    }
}

// =============================================================================
// Tests
// =============================================================================
