//! Equal-space partition (`Cmap`)
//!
//! A `Cmap` is a sorted sequence of `k - 1` finite dividers inducing `k`
//! half-open bins `(-inf, d_1), [d_1, d_2), ..., [d_{k-1}, +inf)` over the
//! real line. It is the partition half of a `Structure` (§3); the `HCounter`
//! half accumulates weight per bin index. `Cmap`s are immutable — rearrangement
//! never mutates one in place, it builds a new one (`updater::update_cmap`)
//! and the `Sketch` prepends a fresh `Structure`.

use crate::range::Range;
use crate::Prim;

/// A sorted-divider partition of the real line into `dividers.len() + 1` bins.
///
/// Equality is equality of the divider sequence (after construction-time
/// sort + positional dedup), matching the source's definition of `Cmap`
/// equality.
#[derive(Clone, Debug, PartialEq)]
pub struct Cmap {
    dividers: Vec<Prim>,
}

impl Cmap {
    /// Build a `Cmap` from an arbitrary (possibly unsorted, possibly
    /// duplicate-valued) list of finite dividers.
    ///
    /// Dividers are sorted; exact duplicates (equal `f64` bit patterns are
    /// not required — equal by `==` suffices) collapse to one entry, since a
    /// repeated divider would otherwise induce a zero-width bin that can
    /// never be queried meaningfully.
    ///
    /// Panics (debug builds) if any divider is non-finite or `NaN` — dividers
    /// are always finite by construction elsewhere in this crate (the outer
    /// bins get their infinities from the boundary convention in [`Cmap::range`],
    /// never from a stored divider).
    pub fn divider(mut dividers: Vec<Prim>) -> Self {
        debug_assert!(
            dividers.iter().all(|d| d.is_finite()),
            "Cmap dividers must be finite"
        );
        dividers.sort_by(|a, b| a.partial_cmp(b).expect("Cmap dividers must not be NaN"));
        dividers.dedup_by(|a, b| a == b);
        Self { dividers }
    }

    /// Build an equally spaced `Cmap` with `bins` bins over `[start, end)`.
    ///
    /// Used to seed the initial `Structure` from `SketchConf::cmap_start`/`cmap_end`.
    pub fn equal_space(start: Prim, end: Prim, bins: usize) -> Self {
        debug_assert!(bins >= 1);
        debug_assert!(start < end, "equal_space requires start < end");
        let step = (end - start) / bins as Prim;
        let dividers = (1..bins).map(|i| start + step * i as Prim).collect();
        Self::divider(dividers)
    }

    /// Number of bins: `dividers.len() + 1`.
    #[inline]
    pub fn size(&self) -> usize {
        self.dividers.len() + 1
    }

    /// Bin index containing `x`: the count of dividers `<= x`.
    ///
    /// Ties at a divider go to the right (half-open `[d, ...)`), so
    /// `apply(d_i) == i` for every interior divider.
    pub fn apply(&self, x: Prim) -> usize {
        // partition_point finds the first index where the predicate is
        // false; with predicate `d <= x` that index equals the number of
        // dividers not exceeding x, i.e. exactly the bin index.
        self.dividers.partition_point(|&d| d <= x)
    }

    /// The half-open `Range` of bin `i`, using `-inf`/`+inf` sentinels for the
    /// outer bins. Panics if `i >= size()`.
    pub fn range(&self, i: usize) -> Range {
        let k = self.size();
        assert!(i < k, "bin index {i} out of range (size={k})");
        let start = if i == 0 { Prim::NEG_INFINITY } else { self.dividers[i - 1] };
        let end = if i == k - 1 { Prim::INFINITY } else { self.dividers[i] };
        Range::new(start, end)
    }

    /// All bin ranges, in index order.
    pub fn bins(&self) -> Vec<Range> {
        (0..self.size()).map(|i| self.range(i)).collect()
    }

    /// The stored divider sequence (sorted, deduplicated).
    pub fn dividers(&self) -> &[Prim] {
        &self.dividers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_sorts_and_dedups() {
        let c = Cmap::divider(vec![3.0, 1.0, 2.0, 1.0]);
        assert_eq!(c.dividers(), &[1.0, 2.0, 3.0]);
        assert_eq!(c.size(), 4);
    }

    #[test]
    fn apply_matches_scenario_6() {
        // Cmap.divider([3, 1, 2]).apply(2.5) == 2
        let c = Cmap::divider(vec![3.0, 1.0, 2.0]);
        assert_eq!(c.apply(2.5), 2);
    }

    #[test]
    fn apply_right_inclusive_at_dividers() {
        let c = Cmap::divider(vec![1.0, 2.0, 3.0]);
        for (i, &d) in c.dividers().to_vec().iter().enumerate() {
            assert_eq!(c.apply(d), i + 1, "apply at divider {d} should land in the right bin");
        }
        assert_eq!(c.apply(0.5), 0);
        assert_eq!(c.apply(100.0), 3);
    }

    #[test]
    fn range_uses_sentinels_on_outer_bins() {
        let c = Cmap::divider(vec![1.0, 2.0]);
        assert_eq!(c.range(0), Range::new(f64::NEG_INFINITY, 1.0));
        assert_eq!(c.range(1), Range::new(1.0, 2.0));
        assert_eq!(c.range(2), Range::new(2.0, f64::INFINITY));
    }

    #[test]
    fn equal_space_produces_expected_dividers() {
        let c = Cmap::equal_space(0.0, 10.0, 4);
        assert_eq!(c.dividers(), &[2.5, 5.0, 7.5]);
    }

    #[test]
    fn bins_enumerates_all_ranges() {
        let c = Cmap::equal_space(0.0, 4.0, 2);
        let bins = c.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].end, 2.0);
        assert_eq!(bins[1].start, 2.0);
    }
}
