//! `Structure`: one generation's `(Cmap, HCounter)` pairing
//!
//! A `Sketch` holds a short history of `Structure`s, newest first (§4.5): the
//! newest is queried with full weight, older ones contribute a
//! `decay_rate`-weighted share. Rearrangement (§4.6 deep update) prepends a
//! brand-new `Structure` built from a freshly computed `Cmap`; narrow update
//! only ever touches the newest `Structure`'s counter.
//!
//! `cmap` is wrapped in an `Arc` (§5): a narrow update only ever replaces a
//! `Structure`'s counter, so every reference-generation `Structure` (all but
//! the effective prefix) can share its `Cmap` with the previous sketch value
//! instead of reallocating the divider vector on every update.

use std::sync::Arc;

use crate::cmap::Cmap;
use crate::counter::{CountMinCounter, HCounter};
use crate::plot::DensityPlot;
use crate::range::Range;

/// One generation: a partition paired with the counter accumulated over it.
#[derive(Clone, Debug)]
pub struct Structure {
    pub cmap: Arc<Cmap>,
    pub counter: CountMinCounter,
}

impl Structure {
    /// A fresh, all-zero `Structure` over `cmap`, sized to match it.
    pub fn empty(cmap: Cmap, width: usize, depth: usize, seed: u64) -> Self {
        Self { cmap: Arc::new(cmap), counter: CountMinCounter::new(width, depth, seed) }
    }

    /// Bin index `x` falls into under this generation's `Cmap`.
    #[inline]
    pub fn bin_of(&self, x: f64) -> usize {
        self.cmap.apply(x)
    }

    /// Return a new `Structure` with `x`'s bin incremented by `w`.
    pub fn update(&self, x: f64, w: f64) -> Self {
        let i = self.bin_of(x);
        Self { cmap: Arc::clone(&self.cmap), counter: self.counter.updates(&[(i, w)]) }
    }

    /// Return a new `Structure` with every `(x, w)` pair applied in one batch.
    pub fn updates(&self, ps: &[(f64, f64)]) -> Self {
        let ups: Vec<(usize, f64)> = ps.iter().map(|&(x, w)| (self.bin_of(x), w)).collect();
        Self { cmap: Arc::clone(&self.cmap), counter: self.counter.updates(&ups) }
    }

    /// This generation's `(bin, density)` records, excluding the two
    /// unbounded outer bins (§4.5 `densityPlot`) — a `DensityPlot` record
    /// needs a finite-length range to carry a meaningful density value.
    pub fn density(&self) -> DensityPlot {
        let size = self.cmap.size();
        if size < 3 {
            return DensityPlot::zero();
        }
        let records: Vec<(Range, f64)> = (1..size - 1)
            .filter_map(|i| {
                let r = self.cmap.range(i);
                let len = r.length();
                if len <= 0.0 {
                    return None;
                }
                let count = self.counter.get(i);
                if count == 0.0 {
                    return None;
                }
                Some((r, count / len))
            })
            .collect();
        DensityPlot::disjoint(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_copy_on_write() {
        let cmap = Cmap::equal_space(0.0, 10.0, 4);
        let s0 = Structure::empty(cmap, 32, 3, 1);
        let s1 = s0.update(2.5, 1.0);
        assert_eq!(s0.counter.sum(), 0.0);
        assert_eq!(s1.counter.sum(), 1.0);
    }

    #[test]
    fn bin_of_matches_cmap_apply() {
        let cmap = Cmap::equal_space(0.0, 10.0, 4);
        let s = Structure::empty(cmap.clone(), 32, 3, 1);
        for x in [-1.0, 0.0, 3.3, 9.9, 20.0] {
            assert_eq!(s.bin_of(x), cmap.apply(x));
        }
    }

    #[test]
    fn density_skips_outer_bins_and_empty_bins() {
        let cmap = Cmap::equal_space(0.0, 10.0, 4);
        let s = Structure::empty(cmap, 32, 3, 1).update(2.5, 4.0);
        let plot = s.density();
        // bin 1 covers [2.5, 5.0) with weight 4.0 -> density 4.0/2.5
        assert!((plot.interpolation(3.0) - 4.0 / 2.5).abs() < 1e-9);
        assert_eq!(plot.interpolation(-5.0), 0.0, "outer bin never contributes a density record");
        assert_eq!(plot.interpolation(100.0), 0.0);
    }
}
