//! Smoothing kernels: sparse `(value, weight)` samples -> a continuous density
//!
//! Used by `Sketch::deep_update` (§4.6 step 4) to turn the batch of samples
//! that triggered a rearrangement into a density, which is then projected
//! onto the freshly rebuilt `Cmap` bin-by-bin. This is a different consumer
//! than `DensityPlot::square_kernel` (§4.4/§4.8), which the CDF-inversion
//! updater uses directly with an explicit `window` to build its mixed
//! density — `SmoothingPs` implementations here take no window parameter.

use crate::plot::DensityPlot;
use crate::range::Range;
use crate::{Count, Prim};

/// Converts a sparse list of `(value, weight)` samples into a continuous
/// density. Implementations are pure functions of the input slice.
pub trait SmoothingPs {
    fn smooth(&self, ps: &[(Prim, Count)]) -> DensityPlot;
}

/// Piecewise-constant smoothing over consecutive sorted samples.
///
/// With `>= 2` input points, a zero-weight point is extrapolated on each end
/// (`p_1 - (p_2 - p_1)` and `p_n + (p_n - p_{n-1})`) so the extreme samples
/// get a density contribution too, then every consecutive pair `[p_i,
/// p_{i+1}]` emits a density of `(w_i + w_{i+1}) / (2 * length)`. The result
/// integrates to `sum(w_i)` in expectation (the trapezoid-style averaging
/// over adjacent weights conserves total mass up to the boundary
/// extrapolation, which contributes zero weight by construction).
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualSpaceSmoothing;

impl SmoothingPs for EqualSpaceSmoothing {
    fn smooth(&self, ps: &[(Prim, Count)]) -> DensityPlot {
        if ps.is_empty() {
            return DensityPlot::zero();
        }
        let mut sorted = ps.to_vec();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("NaN sample value"));

        let points: Vec<(Prim, Count)> = if sorted.len() >= 2 {
            let (x0, _) = sorted[0];
            let (x1, _) = sorted[1];
            let head = x0 - (x1 - x0);
            let n = sorted.len();
            let (xn, _) = sorted[n - 1];
            let (xn1, _) = sorted[n - 2];
            let tail = xn + (xn - xn1);

            let mut out = Vec::with_capacity(sorted.len() + 2);
            out.push((head, 0.0));
            out.extend(sorted);
            out.push((tail, 0.0));
            out
        } else {
            sorted
        };

        let mut records = Vec::with_capacity(points.len().saturating_sub(1));
        for w in points.windows(2) {
            let (x0, w0) = w[0];
            let (x1, w1) = w[1];
            let length = x1 - x0;
            if length <= 0.0 || !length.is_finite() {
                continue;
            }
            let density = (w0 + w1) / (2.0 * length);
            records.push((Range::new(x0, x1), density));
        }
        DensityPlot::disjoint(records)
    }
}

/// Gaussian-kernel smoothing, discretized over a fixed shared support.
///
/// Each sample `(x_i, w_i)` contributes a Gaussian of mass `w_i` centered at
/// `x_i` with standard deviation `sigma`. Rather than sampling (which would
/// need an RNG and only approximate the kernel stochastically), the
/// contribution is computed in closed form via CDF differences: the support
/// `[min(x) - 4*sigma, max(x) + 4*sigma]` (capturing effectively all of every
/// sample's mass) is split into `resolution` equal buckets, and each bucket's
/// density is the sum, over all samples, of that sample's Gaussian mass
/// falling in the bucket divided by the bucket width.
#[derive(Clone, Copy, Debug)]
pub struct NormalSmoothing {
    pub sigma: Prim,
    pub resolution: usize,
}

impl NormalSmoothing {
    pub fn new(sigma: Prim) -> Self {
        Self { sigma, resolution: 64 }
    }
}

impl SmoothingPs for NormalSmoothing {
    fn smooth(&self, ps: &[(Prim, Count)]) -> DensityPlot {
        if ps.is_empty() || self.sigma <= 0.0 {
            return DensityPlot::zero();
        }
        let min_x = ps.iter().map(|(x, _)| *x).fold(Prim::INFINITY, Prim::min);
        let max_x = ps.iter().map(|(x, _)| *x).fold(Prim::NEG_INFINITY, Prim::max);
        let lo = min_x - 4.0 * self.sigma;
        let hi = max_x + 4.0 * self.sigma;
        if !(lo < hi) || self.resolution == 0 {
            return DensityPlot::zero();
        }
        let bucket_width = (hi - lo) / self.resolution as Prim;

        let mut records = Vec::with_capacity(self.resolution);
        for b in 0..self.resolution {
            let b_lo = lo + bucket_width * b as Prim;
            let b_hi = b_lo + bucket_width;
            let mass: f64 = ps
                .iter()
                .map(|(x, w)| w * (normal_cdf(b_hi, *x, self.sigma) - normal_cdf(b_lo, *x, self.sigma)))
                .sum();
            if mass != 0.0 {
                records.push((Range::new(b_lo, b_hi), mass / bucket_width));
            }
        }
        DensityPlot::disjoint(records)
    }
}

/// Abramowitz & Stegun 7.1.26 approximation of the error function (max
/// absolute error ~1.5e-7) — avoids pulling in a special-functions crate for
/// a single closed-form CDF evaluation.
fn erf(x: Prim) -> Prim {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t) + A3) * t + A2) * t + A1;
    let y = 1.0 - poly * t * (-x * x).exp();
    sign * y
}

fn normal_cdf(x: Prim, mean: Prim, sigma: Prim) -> Prim {
    0.5 * (1.0 + erf((x - mean) / (sigma * std::f64::consts::SQRT_2)))
}
