//! The three-valued decision store: labeling, closure, frontier
//! maintenance, and the priority-ordered suggestion walk.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use lattice_core::{LatticeError, LowerSet, Point, UpperSet};

use crate::queue::Entry;

/// Incremental decision engine over the Boolean lattice `B^N`.
///
/// Holds the two homogeneous regions (`us`/`ds`), the IMPROBABLE carve-out
/// set, the two frontier sets (infima of TRUE, suprema of FALSE), and the
/// priority queues that drive `next_u`/`next_d`. See the crate-level
/// invariants I1-I5 in the expanded specification.
pub struct TriSet {
    n: usize,
    us: UpperSet,
    ds: LowerSet,
    zs: HashSet<Point>,
    sup: HashSet<Point>,
    inf: HashSet<Point>,
    uq: BinaryHeap<Reverse<Entry>>,
    dq: BinaryHeap<Reverse<Entry>>,
    ud: usize,
    dd: usize,
    ul: HashSet<Point>,
    dl: HashSet<Point>,
}

impl TriSet {
    /// Create an empty store for a session of dimension `n`.
    pub fn new(n: usize) -> TriSet {
        TriSet {
            n,
            us: UpperSet::new(),
            ds: LowerSet::new(),
            zs: HashSet::new(),
            sup: HashSet::new(),
            inf: HashSet::new(),
            uq: BinaryHeap::new(),
            dq: BinaryHeap::new(),
            ud: 0,
            dd: 0,
            ul: HashSet::new(),
            dl: HashSet::new(),
        }
    }

    /// The session's fixed dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    fn check_dim(&self, p: &Point) -> Result<(), LatticeError> {
        if p.n() != self.n {
            return Err(LatticeError::DimensionMismatch {
                expected: self.n,
                found: p.n(),
            });
        }
        Ok(())
    }

    fn invalidate_walk(&mut self) {
        self.ud = 0;
        self.ul.clear();
        self.dd = 0;
        self.dl.clear();
    }

    fn enqueue_u(&mut self, p: Point, bonus: i64) {
        if self.ds.contains_region(&p) || self.zs.contains(&p) {
            return;
        }
        let prog = p.popcount() as i64 + bonus;
        self.uq.push(Reverse(Entry::new(p, prog)));
    }

    fn enqueue_d(&mut self, p: Point, bonus: i64) {
        if self.us.contains_region(&p) || self.zs.contains(&p) {
            return;
        }
        let prog = (self.n - p.popcount()) as i64 + bonus;
        self.dq.push(Reverse(Entry::new(p, prog)));
    }

    /// `check_inf`: for `p` assumed `∈ ↑us`, passes iff every lower cover
    /// of `p` is decided-FALSE or IMPROBABLE. On success, adds `p` to
    /// `inf` and returns `true`.
    fn check_inf(&mut self, p: &Point) -> bool {
        for c in p.downs() {
            if !(self.ds.contains_region(&c) || self.zs.contains(&c)) {
                return false;
            }
        }
        self.inf.insert(p.clone());
        true
    }

    /// `check_sup`: for `p` assumed `∈ ↓ds`, the dual of [`Self::check_inf`].
    fn check_sup(&mut self, p: &Point) -> bool {
        for c in p.ups() {
            if !(self.us.contains_region(&c) || self.zs.contains(&c)) {
                return false;
            }
        }
        self.sup.insert(p.clone());
        true
    }

    /// Rerun `check_inf` on every member of `us` and `check_sup` on every
    /// member of `ds` — finalization after the last label, when no further
    /// probes will be issued.
    pub fn check_all(&mut self) {
        let us_pts: Vec<Point> = self.us.iter().cloned().collect();
        let ds_pts: Vec<Point> = self.ds.iter().cloned().collect();
        for u in us_pts {
            self.check_inf(&u);
        }
        for d in ds_pts {
            self.check_sup(&d);
        }
    }

    /// `true` iff `p ∈ ↑us ∨ p ∈ ↓ds`.
    pub fn is_decided(&self, p: &Point) -> bool {
        self.us.contains_region(p) || self.ds.contains_region(p)
    }

    /// Label `p` as TRUE. Returns `Ok(true)` iff this changed the state,
    /// `Ok(false)` if `p` was already TRUE, `Err` if `p` was already FALSE.
    pub fn mark_true(&mut self, p: &Point) -> Result<bool, LatticeError> {
        self.check_dim(p)?;
        if self.ds.contains_region(p) {
            return Err(LatticeError::AlreadyDecidedOtherWay);
        }
        if self.us.contains_region(p) {
            return Ok(false);
        }

        self.invalidate_walk();

        let existing: Vec<Point> = self.us.iter().cloned().collect();
        self.us.insert(p.clone());

        let became_inf = self.check_inf(p);

        if !became_inf {
            for u in &existing {
                self.enqueue_u(p.meet(u), 0);
            }
            if !existing.is_empty() {
                let mut collapsed = p.clone();
                for u in &existing {
                    collapsed = collapsed.meet(u);
                }
                self.enqueue_u(collapsed, 0);
            }
            for c in p.downs() {
                self.enqueue_u(c, 0);
            }
        }

        for c in p.downs() {
            if self.ds.contains_region(&c) {
                self.check_sup(&c);
            }
        }

        Ok(true)
    }

    /// Label `p` as FALSE. Dual of [`Self::mark_true`].
    pub fn mark_false(&mut self, p: &Point) -> Result<bool, LatticeError> {
        self.check_dim(p)?;
        if self.us.contains_region(p) {
            return Err(LatticeError::AlreadyDecidedOtherWay);
        }
        if self.ds.contains_region(p) {
            return Ok(false);
        }

        self.invalidate_walk();

        let existing: Vec<Point> = self.ds.iter().cloned().collect();
        self.ds.insert(p.clone());

        let became_sup = self.check_sup(p);

        if !became_sup {
            for d in &existing {
                self.enqueue_d(p.join(d), 0);
            }
            if !existing.is_empty() {
                let mut collapsed = p.clone();
                for d in &existing {
                    collapsed = collapsed.join(d);
                }
                self.enqueue_d(collapsed, 0);
            }
            for c in p.ups() {
                self.enqueue_d(c, 0);
            }
        }

        for c in p.ups() {
            if self.us.contains_region(&c) {
                self.check_inf(&c);
            }
        }

        Ok(true)
    }

    /// Label `p` as IMPROBABLE. Returns `Ok(false)` (not an error) if `p`
    /// was already IMPROBABLE.
    pub fn mark_improbable(&mut self, p: &Point) -> Result<bool, LatticeError> {
        self.check_dim(p)?;
        if self.us.contains_region(p) || self.ds.contains_region(p) {
            return Err(LatticeError::AlreadyDecidedOtherWay);
        }
        if self.zs.contains(p) {
            return Ok(false);
        }

        self.invalidate_walk();
        self.zs.insert(p.clone());

        let n = self.n as i64;
        let pc = p.popcount() as i64;
        let uq_bonus = -(n - pc) / 2 - 1;
        let dq_bonus = -pc / 2 - 1;

        for c in p.downs() {
            self.enqueue_u(c, uq_bonus);
        }
        for c in p.ups() {
            self.enqueue_d(c, dq_bonus);
        }

        for c in p.ups() {
            if self.us.contains_region(&c) {
                self.check_inf(&c);
            }
        }
        for c in p.downs() {
            if self.ds.contains_region(&c) {
                self.check_sup(&c);
            }
        }

        Ok(true)
    }

    /// A candidate is stale once it has become decided (either way) or
    /// IMPROBABLE since it was enqueued.
    fn is_stale(&self, p: &Point) -> bool {
        self.us.contains_region(p) || self.ds.contains_region(p) || self.zs.contains(p)
    }

    /// Suggest the next point to probe in search of infima of TRUE. Returns
    /// the null point when the search is exhausted.
    pub fn next_u(&mut self) -> Point {
        loop {
            while let Some(Reverse(entry)) = self.uq.pop() {
                if !self.is_stale(&entry.point) {
                    return entry.point;
                }
            }

            if self.ud > self.n {
                return Point::null();
            }

            let curr: Vec<Point> = if self.ud == 0 {
                self.us.iter().cloned().collect()
            } else {
                self.ul.iter().cloned().collect()
            };

            let mut next_ring: HashSet<Point> = HashSet::new();
            let bonus = -(self.ud as i64) - 1;
            for e in &curr {
                for c in e.ups() {
                    let other_dominates = self.us.iter().any(|u| *u != *e && u.le(&c));
                    if other_dominates {
                        continue;
                    }
                    next_ring.insert(c.clone());
                    for lc in c.downs() {
                        self.enqueue_u(lc, bonus);
                    }
                }
            }
            self.ud += 1;
            self.ul = next_ring;
        }
    }

    /// Suggest the next point to probe in search of suprema of FALSE. Dual
    /// of [`Self::next_u`].
    pub fn next_d(&mut self) -> Point {
        loop {
            while let Some(Reverse(entry)) = self.dq.pop() {
                if !self.is_stale(&entry.point) {
                    return entry.point;
                }
            }

            if self.dd > self.n {
                return Point::null();
            }

            let curr: Vec<Point> = if self.dd == 0 {
                self.ds.iter().cloned().collect()
            } else {
                self.dl.iter().cloned().collect()
            };

            let mut next_ring: HashSet<Point> = HashSet::new();
            let bonus = -(self.dd as i64) - 1;
            for e in &curr {
                for c in e.downs() {
                    let other_dominates = self.ds.iter().any(|d| *d != *e && d.ge(&c));
                    if other_dominates {
                        continue;
                    }
                    next_ring.insert(c.clone());
                    for uc in c.ups() {
                        self.enqueue_d(uc, bonus);
                    }
                }
            }
            self.dd += 1;
            self.dl = next_ring;
        }
    }

    /// The TRUE region's antichain of minima.
    pub fn us(&self) -> &UpperSet {
        &self.us
    }

    /// The FALSE region's antichain of maxima.
    pub fn ds(&self) -> &LowerSet {
        &self.ds
    }

    /// IMPROBABLE points.
    pub fn zs(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.zs.iter()
    }

    /// Suprema of the FALSE region.
    pub fn sup(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.sup.iter()
    }

    /// Infima of the TRUE region.
    pub fn inf(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.inf.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::TriSet;
    use lattice_core::{LatticeError, Point};

    fn p(s: &str, n: usize) -> Point {
        Point::parse(s, n)
    }

    #[test]
    fn scenario_1_basic_true_false() {
        let mut ts = TriSet::new(4);
        assert_eq!(ts.mark_true(&p("1111", 4)), Ok(true));
        assert_eq!(ts.mark_false(&p("0000", 4)), Ok(true));

        assert_eq!(ts.us().iter().collect::<Vec<_>>(), vec![&p("1111", 4)]);
        assert_eq!(ts.ds().iter().collect::<Vec<_>>(), vec![&p("0000", 4)]);
        assert_eq!(ts.sup().count(), 0);
        assert_eq!(ts.inf().count(), 0);
    }

    #[test]
    fn scenario_2_absorption_and_infimum() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1111", 4)).unwrap();
        ts.mark_false(&p("0000", 4)).unwrap();
        ts.mark_true(&p("0100", 4)).unwrap();

        assert_eq!(ts.us().iter().collect::<Vec<_>>(), vec![&p("0100", 4)]);
        assert!(ts.inf().any(|e| *e == p("0100", 4)));
    }

    #[test]
    fn scenario_3_ds_fills_in_as_an_antichain() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1111", 4)).unwrap();

        for target in ["1000", "0100", "0010", "0001"] {
            ts.mark_false(&p(target, 4)).unwrap();
        }

        for target in ["1000", "0100", "0010", "0001"] {
            assert!(ts.ds().iter().any(|e| *e == p(target, 4)));
        }
        // Not yet suprema: their upper covers (popcount 2) are still
        // undecided, per the spec's own framing of this scenario.
        assert_eq!(ts.sup().count(), 0);
    }

    #[test]
    fn check_sup_fires_once_every_upper_cover_is_covered() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1111", 4)).unwrap();
        ts.mark_false(&p("1000", 4)).unwrap();

        // Upper covers of "1000" are "1100", "1010", "1001".
        ts.mark_improbable(&p("1100", 4)).unwrap();
        assert!(!ts.sup().any(|e| *e == p("1000", 4)));
        ts.mark_improbable(&p("1010", 4)).unwrap();
        assert!(!ts.sup().any(|e| *e == p("1000", 4)));
        ts.mark_improbable(&p("1001", 4)).unwrap();
        assert!(ts.sup().any(|e| *e == p("1000", 4)));
    }

    #[test]
    fn scenario_4_improbable_is_carved_out() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        ts.mark_false(&p("0011", 4)).unwrap();
        ts.mark_improbable(&p("1001", 4)).unwrap();

        assert_eq!(ts.zs().collect::<Vec<_>>(), vec![&p("1001", 4)]);

        let mut seen = Vec::new();
        loop {
            let s = ts.next_u();
            if !s.is_present() {
                break;
            }
            assert_ne!(s, p("1001", 4));
            assert!(!s.ge(&p("1100", 4)));
            seen.push(s);
            if seen.len() > 64 {
                break;
            }
        }
    }

    #[test]
    fn scenario_5_contradiction_is_rejected() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        assert_eq!(
            ts.mark_false(&p("1000", 4)),
            Err(LatticeError::AlreadyDecidedOtherWay)
        );
    }

    #[test]
    fn scenario_6_idempotence() {
        let mut ts = TriSet::new(4);
        assert_eq!(ts.mark_true(&p("1010", 4)), Ok(true));
        assert_eq!(ts.mark_true(&p("1010", 4)), Ok(false));
        assert_eq!(ts.us().len(), 1);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let mut ts = TriSet::new(4);
        let wrong = Point::parse("111", 3);
        assert_eq!(
            ts.mark_true(&wrong),
            Err(LatticeError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn property_monotone_growth() {
        let mut ts = TriSet::new(4);
        let before: Vec<_> = ts.us().iter().cloned().collect();
        let changed = ts.mark_true(&p("0110", 4)).unwrap();
        assert!(changed);
        let after: Vec<_> = ts.us().iter().cloned().collect();
        assert_ne!(before, after);
    }

    #[test]
    fn property_suggestions_are_fresh() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        for _ in 0..20 {
            let s = ts.next_u();
            if !s.is_present() {
                break;
            }
            assert!(!ts.is_decided(&s));
            assert!(ts.zs().all(|z| *z != s));
        }
    }

    #[test]
    fn property_antichain_after_many_labels() {
        let mut ts = TriSet::new(4);
        for s in ["1000", "0100", "0010", "0001"] {
            ts.mark_false(&p(s, 4)).unwrap();
        }
        let ds: Vec<_> = ts.ds().iter().collect();
        for (i, a) in ds.iter().enumerate() {
            for (j, b) in ds.iter().enumerate() {
                if i != j {
                    assert!(!a.le(b));
                }
            }
        }
    }

    #[test]
    fn property_disjoint_true_and_false_regions() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        ts.mark_false(&p("0011", 4)).unwrap();
        for bits in [
            "0000", "0001", "0010", "0011", "0100", "0101", "0110", "0111", "1000", "1001",
            "1010", "1011", "1100", "1101", "1110", "1111",
        ] {
            let q = p(bits, 4);
            let in_true = ts.us().contains_region(&q);
            let in_false = ts.ds().contains_region(&q);
            assert!(!(in_true && in_false), "{bits} decided both ways");
        }
    }

    #[test]
    fn property_zs_members_stay_undecided() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        ts.mark_false(&p("0011", 4)).unwrap();
        ts.mark_improbable(&p("1001", 4)).unwrap();
        ts.mark_improbable(&p("0110", 4)).unwrap();
        for z in ts.zs().cloned().collect::<Vec<_>>() {
            assert!(!ts.is_decided(&z), "{z} is IMPROBABLE but also decided");
        }
    }

    #[test]
    fn property_sup_correct() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1111", 4)).unwrap();
        ts.mark_false(&p("1000", 4)).unwrap();
        ts.mark_improbable(&p("1100", 4)).unwrap();
        ts.mark_improbable(&p("1010", 4)).unwrap();
        ts.mark_improbable(&p("1001", 4)).unwrap();
        for s in ts.sup().cloned().collect::<Vec<_>>() {
            assert!(ts.ds().contains_region(&s));
            for c in s.ups() {
                assert!(ts.us().contains_region(&c) || ts.zs().any(|z| *z == c));
            }
        }
    }

    #[test]
    fn property_inf_correct() {
        let mut ts = TriSet::new(4);
        ts.mark_false(&p("0000", 4)).unwrap();
        ts.mark_true(&p("0100", 4)).unwrap();
        for i in ts.inf().cloned().collect::<Vec<_>>() {
            assert!(ts.us().contains_region(&i));
            for c in i.downs() {
                assert!(ts.ds().contains_region(&c) || ts.zs().any(|z| *z == c));
            }
        }
    }

    #[test]
    fn is_decided_reflects_both_regions() {
        let mut ts = TriSet::new(4);
        ts.mark_true(&p("1100", 4)).unwrap();
        ts.mark_false(&p("0000", 4)).unwrap();
        assert!(ts.is_decided(&p("1100", 4)));
        assert!(ts.is_decided(&p("1110", 4)));
        assert!(ts.is_decided(&p("0000", 4)));
        assert!(!ts.is_decided(&p("0010", 4)));
    }
}
