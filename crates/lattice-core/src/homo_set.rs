//! Homogeneous (upward- or downward-closed) point sets, stored as antichains.
//!
//! A single generic type serves both orientations, parameterized by the
//! const generic `UPPER` — the direct analogue of the C++ source's
//! `template <bool UD> class homo_set`. `UPPER = true` is the upward-closed
//! variant (`U`, backing the TRUE region); `UPPER = false` is the
//! downward-closed variant (`D`, backing the FALSE region).

use crate::point::Point;

/// A set of points maintained as an antichain (invariant U1: no two members
/// are `≤`-comparable), interpreted as either an upward-closed region
/// (`UPPER = true`) or a downward-closed region (`UPPER = false`).
#[derive(Clone, Default)]
pub struct HomoSet<const UPPER: bool> {
    elems: Vec<Point>,
}

/// `↑U`: the upward-closed region backing the TRUE side.
pub type UpperSet = HomoSet<true>;
/// `↓D`: the downward-closed region backing the FALSE side.
pub type LowerSet = HomoSet<false>;

impl<const UPPER: bool> HomoSet<UPPER> {
    /// An empty set.
    pub fn new() -> Self {
        HomoSet { elems: Vec::new() }
    }

    /// `S ≤ p`: `true` iff some member of the set is `≤ p`.
    pub fn le(&self, p: &Point) -> bool {
        self.elems.iter().any(|e| e.le(p))
    }

    /// `S ≥ p`: `true` iff some member of the set is `≥ p`.
    pub fn ge(&self, p: &Point) -> bool {
        self.elems.iter().any(|e| e.ge(p))
    }

    /// `true` iff `p` already lies in the closed region this set
    /// represents (`↑U` when `UPPER`, `↓D` otherwise).
    pub fn contains_region(&self, p: &Point) -> bool {
        if UPPER { self.le(p) } else { self.ge(p) }
    }

    /// Monotone insertion with absorption: a no-op if `p` is already in the
    /// region; otherwise removes every member the new point dominates (or
    /// is dominated by, depending on orientation) before inserting `p`.
    /// Returns `true` iff the set's region grew.
    pub fn insert(&mut self, p: Point) -> bool {
        if self.contains_region(&p) {
            return false;
        }
        if UPPER {
            self.elems.retain(|e| !e.ge(&p));
        } else {
            self.elems.retain(|e| !e.le(&p));
        }
        self.elems.push(p);
        true
    }

    /// Minimum popcount over the set for `UPPER`, maximum for `!UPPER` —
    /// the "lowest known TRUE" / "highest known FALSE". `None` if empty.
    pub fn best_hier(&self) -> Option<usize> {
        let counts = self.elems.iter().map(Point::popcount);
        if UPPER { counts.min() } else { counts.max() }
    }

    /// Iterate the antichain members in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.elems.iter()
    }

    /// Number of antichain members.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// `true` iff the set has no members (the region is empty).
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
}
