//! Crate root: public surface, core aliases, and cross-module invariants
//!
//! This module is the single canonical entry point for downstream users of
//! this library. It centralizes the scalar aliases (`Prim`/`Count`) and
//! re-exports the submodules that together implement a streaming,
//! adaptively re-partitioned probability-density sketch under concept drift.
//!
//! ## Invariants
//!
//! - **Coordinates.** Every value a [`Sketch`] sees is first projected to
//!   `Prim` (`f64`) through a [`Measure`]; the core engine never touches a
//!   caller's domain type directly.
//! - **Generations.** A sketch holds `1..=conf.cmap_no` [`Structure`]s,
//!   newest first; only the newest ever receives a narrow (counter-only)
//!   update, and rearrangement (deep update) is the only operation that adds
//!   or drops a generation.
//! - **Determinism.** Nothing in this crate reads OS entropy or wall-clock
//!   time: `CountMinCounter` seeding, rearrangement's fresh-counter seeding,
//!   and the sketch's long-lived RNG are all deterministic functions of
//!   `SketchConf::seed` and the data already observed.
//!
//! If any of the above is violated at runtime the failure mode is a precise,
//! typed error (`ConfigError`) at construction time, never a panic from
//! inside a query or update — see [`config`] and [`Sketch::try_empty`].

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Half-open real intervals, the coordinate primitive every other module builds on.
pub mod range;
/// Equal-space partition of the real line into indexed bins.
pub mod cmap;
/// The abstract hashed-weight counter trait and its `CountMinCounter` implementation.
pub mod counter;
/// Piecewise density/count/cumulative functions over disjoint ranges.
pub mod plot;
/// One generation: a `(Cmap, HCounter)` pairing.
pub mod structure;
/// Square-kernel and normal-kernel smoothing of sparse samples into a density.
pub mod smoothing;
/// Time-decayed generation weighting, with a bounded memoization cache.
pub mod decay;
/// The `Measure<A>` boundary conversion between a domain type and `Prim`.
pub mod measure;
/// `SketchConf` and its validation.
pub mod config;
/// The CDF-inversion rearrangement algorithm.
pub mod updater;
/// The core `Sketch`/`SketchKind` engine and the public `TypedSketch<A>` surface.
pub mod sketch;

pub use config::{ConfigError, SketchConf};
pub use measure::Measure;
pub use sketch::{Sketch, SketchKind, TypedSketch};

/// The canonical numeric coordinate (double precision) used internally.
pub type Prim = f64;

/// A non-negative real weight.
pub type Count = f64;
