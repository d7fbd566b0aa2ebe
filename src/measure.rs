//! `Measure<A>`: the explicit boundary conversion between a domain type and `Prim`
//!
//! The core `Sketch` engine works exclusively in `Prim` (`f64`); anything
//! domain-typed (durations, prices, whatever `A` a caller actually cares
//! about) crosses that boundary through an explicit pair of closures rather
//! than a typeclass resolved by the compiler, per the redesign called out in
//! SPEC_FULL.md §REDESIGN FLAGS: passing the conversion as a value means a
//! caller can supply two different `Measure<std::time::Duration>`s (say,
//! seconds vs. milliseconds resolution) for two different `TypedSketch`s
//! without a newtype wrapper for each.

use crate::Prim;

/// A two-way conversion between a domain type `A` and the sketch's internal
/// `Prim` coordinate space.
///
/// Neither direction needs to be exact in both directions — `from(to(a))`
/// need not equal `a` bit-for-bit — but callers should pick conversions where
/// distinct `a` values map to distinct `Prim`s over the range they care
/// about, or the sketch will alias unrelated inputs into the same bin.
pub struct Measure<A> {
    to: Box<dyn Fn(&A) -> Prim>,
    from: Box<dyn Fn(Prim) -> A>,
}

impl<A> Measure<A> {
    /// Build a `Measure` from an explicit `to`/`from` pair of conversions.
    pub fn new(to: impl Fn(&A) -> Prim + 'static, from: impl Fn(Prim) -> A + 'static) -> Self {
        Self { to: Box::new(to), from: Box::new(from) }
    }

    #[inline]
    pub fn to_prim(&self, a: &A) -> Prim {
        (self.to)(a)
    }

    #[inline]
    pub fn from_prim(&self, x: Prim) -> A {
        (self.from)(x)
    }

    /// The identity measure over `Prim` itself.
    pub fn identity() -> Measure<Prim> {
        Measure::new(|x: &Prim| *x, |x: Prim| x)
    }
}
