//! Structural operation counters
//!
//! A [`FibonacciHeap`](crate::fibonacci::FibonacciHeap) counts the tree
//! surgery it performs. The numbers make the amortized analysis observable:
//! the cuts triggered by one `decrease_priority` are bounded by the depth of
//! the entry, and links are paid for by earlier inserts.

/// Counts of structural operations since construction or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Trees linked under another root during consolidation
    pub links: u64,
    /// Entries cut from their parent, including cascading cuts
    pub cuts: u64,
    /// Cuts caused by a marked ancestor rather than by the decreased entry
    pub cascading_cuts: u64,
    /// Consolidation passes run by extract-min
    pub consolidations: u64,
}

impl HeapStats {
    /// Difference between this snapshot and an earlier one.
    ///
    /// A counter that was reset in between reads as zero rather than
    /// underflowing.
    pub fn since(&self, earlier: &HeapStats) -> HeapStats {
        HeapStats {
            links: self.links.saturating_sub(earlier.links),
            cuts: self.cuts.saturating_sub(earlier.cuts),
            cascading_cuts: self.cascading_cuts.saturating_sub(earlier.cascading_cuts),
            consolidations: self.consolidations.saturating_sub(earlier.consolidations),
        }
    }
}
