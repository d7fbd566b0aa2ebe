//! Sketch configuration and its validation
//!
//! `SketchConf` is the one place every tunable of a `Sketch` lives: initial
//! partition shape, counter sizing, generation count/decay, and the
//! adaptive-layer queue/window/mixing parameters (§6). It derives `serde` for
//! introspection/debugging (logging a config, round-tripping it through a
//! support bundle) — this crate makes no wire-format compatibility promise
//! over the serialized form.

use thiserror::Error;

use crate::Prim;

/// All tunables of a `Sketch`, validated once via [`SketchConf::validated`]
/// before any `Structure` is built from them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SketchConf {
    /// Number of bins in the initial equal-space `Cmap`. Must be `>= 2`.
    pub cmap_size: usize,
    /// Number of generations (`Structure`s) retained. Must be `>= 1`.
    pub cmap_no: usize,
    /// Lower bound of the initial `Cmap`'s finite span.
    pub cmap_start: Prim,
    /// Upper bound of the initial `Cmap`'s finite span.
    pub cmap_end: Prim,
    /// `CountMinCounter` table width. Must be `> 0`.
    pub counter_width: usize,
    /// `CountMinCounter` table depth. Must be `> 0`.
    pub counter_depth: usize,
    /// Capacity of the adaptive layer's bounded FIFO sample queue.
    pub queue_size: usize,
    /// Generation decay rate `lambda` used by [`crate::decay::decay_rate`]. Must be `>= 0`.
    pub decay_factor: Prim,
    /// Mixing weight between the queue's own density and the decayed base
    /// structures' density when building a rearrangement's mixed density
    /// (§4.8). Must be `>= 0`.
    pub mixing_ratio: Prim,
    /// Square-kernel window used when folding queue samples into a density. Must be `> 0`.
    pub window: Prim,
    /// Seed for deterministic `CountMinCounter` row-hash derivation and any
    /// sampling the adaptive layer performs.
    pub seed: u64,
}

/// A `SketchConf` field failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cmap_size must be >= 2, got {0}")]
    CmapSizeTooSmall(usize),
    #[error("cmap_no must be >= 1, got {0}")]
    CmapNoTooSmall(usize),
    #[error("cmap_start must be < cmap_end, got start={start} end={end}")]
    CmapSpanEmpty { start: Prim, end: Prim },
    #[error("counter_width and counter_depth must both be > 0, got width={width} depth={depth}")]
    CounterDimsZero { width: usize, depth: usize },
    #[error("window must be > 0, got {0}")]
    WindowNotPositive(Prim),
    #[error("decay_factor must be >= 0, got {0}")]
    NegativeDecayFactor(Prim),
    #[error("mixing_ratio must be >= 0, got {0}")]
    NegativeMixingRatio(Prim),
}

impl SketchConf {
    /// Validate every field, returning the conf unchanged on success.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.cmap_size < 2 {
            return Err(ConfigError::CmapSizeTooSmall(self.cmap_size));
        }
        if self.cmap_no < 1 {
            return Err(ConfigError::CmapNoTooSmall(self.cmap_no));
        }
        if !(self.cmap_start < self.cmap_end) {
            return Err(ConfigError::CmapSpanEmpty { start: self.cmap_start, end: self.cmap_end });
        }
        if self.counter_width == 0 || self.counter_depth == 0 {
            return Err(ConfigError::CounterDimsZero { width: self.counter_width, depth: self.counter_depth });
        }
        if !(self.window > 0.0) {
            return Err(ConfigError::WindowNotPositive(self.window));
        }
        if self.decay_factor < 0.0 {
            return Err(ConfigError::NegativeDecayFactor(self.decay_factor));
        }
        if self.mixing_ratio < 0.0 {
            return Err(ConfigError::NegativeMixingRatio(self.mixing_ratio));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SketchConf {
        SketchConf {
            cmap_size: 8,
            cmap_no: 3,
            cmap_start: 0.0,
            cmap_end: 100.0,
            counter_width: 64,
            counter_depth: 4,
            queue_size: 256,
            decay_factor: 0.1,
            mixing_ratio: 0.5,
            window: 1.0,
            seed: 7,
        }
    }

    #[test]
    fn valid_conf_passes() {
        assert!(base().validated().is_ok());
    }

    #[test]
    fn rejects_tiny_cmap_size() {
        let mut c = base();
        c.cmap_size = 1;
        assert!(matches!(c.validated(), Err(ConfigError::CmapSizeTooSmall(1))));
    }

    #[test]
    fn rejects_empty_span() {
        let mut c = base();
        c.cmap_start = 10.0;
        c.cmap_end = 10.0;
        assert!(matches!(c.validated(), Err(ConfigError::CmapSpanEmpty { .. })));
    }

    #[test]
    fn rejects_zero_counter_dims() {
        let mut c = base();
        c.counter_depth = 0;
        assert!(matches!(c.validated(), Err(ConfigError::CounterDimsZero { .. })));
    }

    #[test]
    fn rejects_nonpositive_window() {
        let mut c = base();
        c.window = 0.0;
        assert!(matches!(c.validated(), Err(ConfigError::WindowNotPositive(_))));
    }

    #[test]
    fn rejects_negative_decay_and_mixing() {
        let mut c = base();
        c.decay_factor = -0.1;
        assert!(matches!(c.validated(), Err(ConfigError::NegativeDecayFactor(_))));

        let mut c2 = base();
        c2.mixing_ratio = -0.1;
        assert!(matches!(c2.validated(), Err(ConfigError::NegativeMixingRatio(_))));
    }

    #[test]
    fn round_trips_through_json() {
        let c = base();
        let encoded = serde_json::to_string(&c).expect("conf should serialize");
        let decoded: SketchConf = serde_json::from_str(&encoded).expect("conf should deserialize");
        assert_eq!(decoded.cmap_size, c.cmap_size);
        assert_eq!(decoded.seed, c.seed);
    }
}
