//! Time-decayed generation weighting
//!
//! Each `Structure` in a `Sketch`'s history is weighted by `exp(-lambda * i)`
//! where `i` is its generation index (`0` = newest), so a query's estimate is
//! a blend biased toward recent data without discarding older generations
//! outright (§4.5). `decay_rate` is called on every query path over every
//! live generation, so it is memoized per thread: the same `(lambda, i)` pair
//! recurs constantly (a `Sketch` with `cmap_no` generations re-evaluates the
//! same small set of indices on every `sum`/`count`/`probability` call).

use std::cell::RefCell;
use std::collections::HashMap;

use crate::Prim;

const CACHE_CAPACITY: usize = 100;

thread_local! {
    static DECAY_CACHE: RefCell<DecayCache> = RefCell::new(DecayCache::new());
}

/// A tiny bounded memoization cache, oldest-insertion-first eviction.
///
/// Deliberately thread-local rather than a process-wide `Mutex`: decay rates
/// are pure, cheap-to-recompute floats, so there is no correctness reason to
/// share one cache across threads, and a thread-local avoids lock contention
/// on a query-hot path (see DESIGN.md's discussion of this choice against
/// `pcs.rs`'s global `OnceLock<Mutex<_>>` cache, which guards state that
/// really must be process-wide).
struct DecayCache {
    values: HashMap<(u64, usize), Prim>,
    order: Vec<(u64, usize)>,
}

impl DecayCache {
    fn new() -> Self {
        Self { values: HashMap::new(), order: Vec::new() }
    }

    fn get_or_insert(&mut self, key: (u64, usize), compute: impl FnOnce() -> Prim) -> Prim {
        if let Some(&v) = self.values.get(&key) {
            return v;
        }
        let v = compute();
        if self.order.len() >= CACHE_CAPACITY {
            let oldest = self.order.remove(0);
            self.values.remove(&oldest);
        }
        self.order.push(key);
        self.values.insert(key, v);
        v
    }
}

/// `exp(-lambda * i)`, memoized per calling thread.
///
/// `lambda` is bucketed into the cache key by its raw bit pattern rather than
/// compared for equality as a float directly — `HashMap` needs `Eq`/`Hash`,
/// which `f64` doesn't implement, and reusing the same `SketchConf` (the
/// overwhelmingly common case: one `decay_factor` per `Sketch` for its whole
/// lifetime) means the bit pattern is stable across calls anyway.
pub fn decay_rate(lambda: Prim, i: usize) -> Prim {
    let key = (lambda.to_bits(), i);
    DECAY_CACHE.with(|cache| cache.borrow_mut().get_or_insert(key, || (-lambda * i as Prim).exp()))
}
