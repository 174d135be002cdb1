//! A persistent, immutable radix trie keyed by IP prefixes.
//!
//! [`table::Table`]/[`table::TableMut`] store a value per prefix and answer
//! longest-prefix-match queries; [`table::Set`]/[`table::SetMut`] specialise
//! that same trie to unit values and add set algebra (union/intersect/
//! difference) plus a bridge to contiguous address ranges. Every snapshot is
//! immutable and `Arc`-shared; [`table::TableMut`]/[`table::SetMut`] are
//! mutable handles that publish new snapshots by atomic compare-and-swap.

#![allow(clippy::type_complexity)]

pub mod af;
pub mod equal;
pub mod error;
mod handle;
mod node;
pub mod prefix;
pub mod range;
mod set;
pub mod table;

pub use af::Address;
pub use equal::{EqBy, ValueEq};
pub use error::{PrefixError, RangeError};
pub use node::{DiffEvent, DiffOptions};
pub use prefix::Prefix;
pub use range::Range;
pub use table::{LongestMatch, MatchType, Set, SetMut, Table, TableMut};
