//! Opaque value equality (§4.10).
//!
//! Aggregation and diff need to know whether two values are "the same" for
//! LPM-equivalence purposes. The default is the value's own [`PartialEq`];
//! [`EqBy`] is the escape hatch for values whose natural equality (if they
//! even have one) is not what aggregation/diff should use -- typically
//! pointer-like values that should compare by referent rather than by
//! address, mirroring how the teacher's `MergeUpdate` trait (`common.rs`)
//! separates "how do I combine" from "what am I".

/// Values stored in a [`crate::table::Table`] implement this to be usable
/// with `aggregate`/`diff`. A blanket impl covers any `PartialEq` type, so
/// this is transparent for ordinary value types.
pub trait ValueEq {
    fn value_eq(&self, other: &Self) -> bool;
}

impl<T: PartialEq> ValueEq for T {
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// Wraps a value together with an explicit equality callback, for values
/// that either have no `PartialEq` or whose `PartialEq` is the wrong
/// comparison for aggregation/diff purposes.
#[derive(Clone)]
pub struct EqBy<T> {
    value: T,
    eq: std::sync::Arc<dyn Fn(&T, &T) -> bool + Send + Sync>,
}

impl<T> EqBy<T> {
    pub fn new(
        value: T,
        eq: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        EqBy {
            value,
            eq: std::sync::Arc::new(eq),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> ValueEq for EqBy<T> {
    fn value_eq(&self, other: &Self) -> bool {
        (self.eq)(&self.value, &other.value)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for EqBy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EqBy").field("value", &self.value).finish()
    }
}
