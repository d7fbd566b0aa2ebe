//! CDF-inversion rearrangement: turning observed mass into a new `Cmap`
//!
//! This is the `updateCmap` arithmetic of §4.8: take the newest generation's
//! density, mix in the incoming batch's square-kernel-smoothed density, and
//! sample the resulting cumulative distribution's inverse at `cmap_size`
//! equally spaced cumulative-mass targets — an equal-space partition in
//! *probability mass* rather than in raw coordinate space, so bins with more
//! observed density get finer resolution.
//!
//! Every failure path here is a fallback, not a propagated error: an empty
//! sketch, a zero-mass mixed density, or a non-finite accumulated total all
//! just keep the prior `Cmap` for another round rather than poisoning the
//! whole structure or collapsing every divider to `0.0` (the `unit == 0.0`
//! degenerate case zero mass would otherwise produce), with a `tracing`
//! event so the condition is visible without being fatal. A batch
//! concentrated at a single (but nonzero-mass) value (`DegenerateInput` in
//! §7) needs no special case at all: the inverse-CDF samples all collapse to
//! that one value, and `Cmap::divider`'s construction-time dedup turns that
//! into a well-formed, if degenerate, partition.

use crate::cmap::Cmap;
use crate::plot::DensityPlot;
use crate::structure::Structure;
use crate::{Count, Prim};

/// Recompute the partition for the next generation.
///
/// `prior` is the `Cmap` to fall back to if the rearrangement is degenerate;
/// `newest` is the sketch's current newest `Structure` (`None` only for a
/// defensively-impossible empty sketch, §7 `EmptySketch`); `ps` is the
/// incoming batch driving the rearrangement; `mixing_ratio` and `window` are
/// `SketchConf`'s `mixing_ratio`/`window`; `cmap_size` is the bin count of
/// the partition to produce.
pub fn update_cmap(
    prior: &Cmap,
    newest: Option<&Structure>,
    ps: &[(Prim, Count)],
    mixing_ratio: Prim,
    window: Prim,
    cmap_size: usize,
) -> Cmap {
    let Some(newest) = newest else {
        tracing::debug!("update_cmap: sketch has no Structures yet, keeping prior cmap");
        return prior.clone();
    };

    let sketch_plot = newest.density();
    let mixed = if ps.is_empty() {
        sketch_plot
    } else {
        let denom = mixing_ratio + 1.0;
        sketch_plot
            .scale(1.0 / denom)
            .add(&DensityPlot::square_kernel(ps, window).scale(mixing_ratio / denom))
    };

    let cdf = mixed.cumulative();
    let total = cdf.total();
    if !total.is_finite() {
        tracing::warn!("update_cmap: cumulative total overflowed to non-finite, keeping prior cmap");
        return prior.clone();
    }
    if total <= 0.0 {
        tracing::debug!("update_cmap: mixed density carries no mass, keeping prior cmap");
        return prior.clone();
    }

    let inv_cdf = cdf.inverse();
    let unit = total / cmap_size as Prim;
    let dividers: Vec<Prim> = (1..cmap_size).map(|i| inv_cdf.interpolation(i as Prim * unit)).collect();

    if dividers.iter().any(|d| !d.is_finite()) {
        tracing::warn!("update_cmap: inverse-CDF sampling produced a non-finite divider, keeping prior cmap");
        return prior.clone();
    }

    tracing::debug!(total, bins = cmap_size, "update_cmap: rearranged partition");
    Cmap::divider(dividers)
}
