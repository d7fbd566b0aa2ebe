//! Piecewise functions over disjoint `Range`s: density, count, and cumulative plots
//!
//! `DensityPlot` and `CountPlot` are piecewise-constant step functions built
//! from a list of `(Range, value)` records; `CumulativePlot` is the
//! monotone piecewise-linear function produced by integrating a density left
//! to right. Together these are the interpolation machinery the CDF-inversion
//! updater (`updater.rs`) consumes: it builds a mixed density, integrates it,
//! inverts the integral, and samples the inverse at equally spaced
//! cumulative-mass targets to get the new partition's dividers.
//!
//! All three types assume finite range bounds — the two outer, unbounded
//! `Cmap` bins are excluded before a `Structure`'s counters are turned into a
//! plot (§4.5), and every smoothing kernel here only ever emits finite
//! windows around finite sample points.

use crate::range::Range;
use crate::{Count, Prim};

/// Evaluate a piecewise-constant step function at `x`: the value of the
/// record whose range contains it, or `0.0` in an (implicit) gap between
/// records.
fn step_interpolate(records: &[(Range, f64)], x: Prim) -> f64 {
    // `records` is kept sorted by `start`; binary search for the last record
    // whose start is `<= x`, then check it actually contains `x` (there may
    // be a gap).
    let idx = records.partition_point(|(r, _)| r.start <= x);
    if idx == 0 {
        return 0.0;
    }
    let (r, v) = &records[idx - 1];
    if r.contains(x) {
        *v
    } else {
        0.0
    }
}

/// Merge a list of (possibly overlapping, possibly duplicate-range) weighted
/// segments into a disjoint, sorted record list by summing contributions on
/// every atomic sub-interval of the breakpoint arrangement. Zero-valued
/// sub-intervals are dropped (a gap and an explicit zero are indistinguishable
/// to `step_interpolate`).
fn merge_overlapping(segments: &[(Range, f64)]) -> Vec<(Range, f64)> {
    if segments.is_empty() {
        return Vec::new();
    }
    let mut xs: Vec<Prim> = segments.iter().flat_map(|(r, _)| [r.start, r.end]).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).expect("plot breakpoints must not be NaN"));
    xs.dedup();

    let mut out = Vec::with_capacity(xs.len().saturating_sub(1));
    for w in xs.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        if hi <= lo {
            continue;
        }
        let mid = (lo + hi) / 2.0;
        let val: f64 = segments
            .iter()
            .filter(|(r, _)| r.contains(mid))
            .map(|(_, v)| v)
            .sum();
        if val != 0.0 {
            out.push((Range::new(lo, hi), val));
        }
    }
    out
}

fn sorted_disjoint(mut records: Vec<(Range, f64)>) -> Vec<(Range, f64)> {
    records.sort_by(|(a, _), (b, _)| a.start.partial_cmp(&b.start).expect("NaN range bound"));
    debug_assert!(
        records.windows(2).all(|w| w[0].0.end <= w[1].0.start),
        "DensityPlot/CountPlot records must be pairwise non-overlapping"
    );
    records
}

/// A piecewise-constant density (value = probability mass per unit length).
#[derive(Clone, Debug, Default)]
pub struct DensityPlot {
    records: Vec<(Range, f64)>,
}

impl DensityPlot {
    /// Build from a list of non-overlapping `(Range, density)` records.
    pub fn disjoint(records: Vec<(Range, f64)>) -> Self {
        Self { records: sorted_disjoint(records) }
    }

    /// An empty density (zero everywhere).
    pub fn zero() -> Self {
        Self { records: Vec::new() }
    }

    /// Density at `x`: the value of the covering record, or `0` in a gap.
    pub fn interpolation(&self, x: Prim) -> f64 {
        step_interpolate(&self.records, x)
    }

    /// The underlying records, in range-start order.
    pub fn records(&self) -> &[(Range, f64)] {
        &self.records
    }

    /// Scale every density value by `s`.
    pub fn scale(&self, s: f64) -> Self {
        Self {
            records: self.records.iter().map(|(r, v)| (*r, v * s)).collect(),
        }
    }

    /// Pointwise sum over the union of both plots' breakpoints.
    pub fn add(&self, other: &DensityPlot) -> Self {
        let mut segments = self.records.clone();
        segments.extend(other.records.iter().copied());
        Self { records: merge_overlapping(&segments) }
    }

    /// Integrate left to right into a monotone, piecewise-linear `CumulativePlot`.
    pub fn cumulative(&self) -> CumulativePlot {
        let mut breakpoints = Vec::with_capacity(self.records.len() * 2);
        let mut acc = 0.0;
        for (r, v) in &self.records {
            if breakpoints.last().map(|&(x, _)| x) != Some(r.start) {
                breakpoints.push((r.start, acc));
            }
            acc += v * r.length();
            breakpoints.push((r.end, acc));
        }
        CumulativePlot { breakpoints }
    }

    /// Square-kernel smoothing (§4.4/§4.8): each `(x_i, w_i)` contributes a
    /// uniform density of height `w_i / window` over `[x_i - window/2, x_i +
    /// window/2)`; overlapping contributions sum.
    pub fn square_kernel(points: &[(Prim, Count)], window: Prim) -> Self {
        debug_assert!(window > 0.0, "square_kernel requires a positive window");
        let half = window / 2.0;
        let segments: Vec<(Range, f64)> = points
            .iter()
            .filter(|(_, w)| *w != 0.0)
            .map(|(x, w)| (Range::new(x - half, x + half), w / window))
            .collect();
        Self { records: merge_overlapping(&segments) }
    }
}

/// A piecewise-constant *count* (value = raw count in range, not a density).
#[derive(Clone, Debug, Default)]
pub struct CountPlot {
    records: Vec<(Range, f64)>,
}

impl CountPlot {
    /// Build from a list of non-overlapping `(Range, count)` records.
    pub fn disjoint(records: Vec<(Range, f64)>) -> Self {
        Self { records: sorted_disjoint(records) }
    }

    /// Raw count covering `x` (no division by range length), or `0` in a gap.
    pub fn interpolation(&self, x: Prim) -> f64 {
        step_interpolate(&self.records, x)
    }
}

/// A monotone, piecewise-linear function produced by integrating a density,
/// or its inverse (swap the axes of a strictly increasing cumulative plot).
#[derive(Clone, Debug, Default)]
pub struct CumulativePlot {
    /// `(x, y)` pairs, sorted by `x`, with `y` nondecreasing.
    breakpoints: Vec<(Prim, Prim)>,
}

impl CumulativePlot {
    /// Linear interpolation between breakpoints; saturates to the first
    /// breakpoint's `y` below the domain and the last breakpoint's `y` above
    /// it. This saturation rule is exactly what makes `interpolation(+inf)`
    /// return the total mass and `interpolation(-inf)` return `0` with no
    /// special-casing of infinities: any `x >= breakpoints.last().0` (finite
    /// or not) takes the "above" branch, and symmetrically for `-inf` below.
    pub fn interpolation(&self, x: Prim) -> Prim {
        let Some(&(x0, y0)) = self.breakpoints.first() else {
            return 0.0;
        };
        let &(xn, yn) = self.breakpoints.last().unwrap();
        if x <= x0 {
            return y0;
        }
        if x >= xn {
            return yn;
        }
        let idx = self.breakpoints.partition_point(|&(bx, _)| bx <= x);
        let (xa, ya) = self.breakpoints[idx - 1];
        let (xb, yb) = self.breakpoints[idx];
        if xb == xa {
            return yb;
        }
        ya + (yb - ya) * (x - xa) / (xb - xa)
    }

    /// Swap `(x, y)` to `(y, x)`: turns a cumulative plot into its inverse,
    /// defined (via the same saturating `interpolation`) on `[0, total]`.
    pub fn inverse(&self) -> Self {
        let mut swapped: Vec<(Prim, Prim)> = self.breakpoints.iter().map(|&(x, y)| (y, x)).collect();
        swapped.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("NaN cumulative value"));
        Self { breakpoints: swapped }
    }

    /// `true` when every breakpoint `y` is finite (used by the updater to
    /// detect `NumericOverflow` before trusting `total`).
    pub fn is_finite(&self) -> bool {
        self.breakpoints.iter().all(|(x, y)| x.is_finite() && y.is_finite())
    }

    /// Total accumulated mass (`interpolation(+inf)`).
    pub fn total(&self) -> Prim {
        self.interpolation(Prim::INFINITY)
    }
}
