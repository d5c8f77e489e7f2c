//! Priority-queue entries for the upward/downward suggestion walk.
//!
//! `BinaryHeap` is a max-heap, so entries are wrapped in `Reverse` to pop
//! lowest-`prog`-first — the same idiom the pack's best-first search code
//! uses for its frontier (`Reverse<FrontierKey>`).

use lattice_core::Point;

/// A candidate point queued for `next_u`/`next_d`, carrying the priority
/// score (`prog`) it was computed with at enqueue time.
#[derive(Clone, Debug)]
pub struct Entry {
    pub point: Point,
    prog: i64,
}

impl Entry {
    pub fn new(point: Point, prog: i64) -> Entry {
        Entry { point, prog }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.prog == other.prog && self.point == other.point
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.prog
            .cmp(&other.prog)
            .then_with(|| self.point.words().cmp(other.point.words()))
    }
}
