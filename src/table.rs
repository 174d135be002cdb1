//! Public API surface: immutable snapshots and mutable handles over a
//! prefix table (value-carrying, §4.12) and a prefix set (§4.8), plus the
//! freeze/thaw pair that connects them (§4.11).
//!
//! Grounded on the teacher's snapshot-vs-mutable split: `store.rs` hands
//! out `Arc`-shared read views while `tree.rs` owns the mutable side; this
//! module generalizes that split to a single cell type (`handle::Handle`)
//! shared by both the table and set flavours.

use crate::af::Address;
use crate::equal::ValueEq;
use crate::handle::Handle;
use crate::node::{self, DiffEvent, DiffOptions, Link};
use crate::prefix::Prefix;
use crate::range::{prefixes_to_ranges, Range};
use crate::set;

//------------ shared result types ----------------------------------------------

/// Whether a [`Table::longest_match`]/[`Set::longest_match`] hit matched
/// the query prefix exactly or only contained it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Contains,
}

/// The result of a longest-prefix-match lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongestMatch<AF: Address, V> {
    pub prefix: Prefix<AF>,
    pub value: V,
    pub match_type: MatchType,
}

fn match_type<AF: Address>(found: Prefix<AF>, queried: &Prefix<AF>) -> MatchType {
    // Compare masked forms, not `==`: a stored prefix keeps whatever host
    // bits it was inserted with (§9), so a literal comparison against the
    // query's masked form would report `Contains` for an exact hit whose
    // stored value happens to carry host bits.
    if found.masked() == queried.masked() {
        MatchType::Exact
    } else {
        MatchType::Contains
    }
}

//------------ Table --------------------------------------------------------

/// An immutable, cheaply-clonable snapshot of a prefix table.
pub struct Table<AF: Address, V> {
    root: Link<AF, V>,
}

// Cloning only copies the root `Arc`, regardless of whether `V` itself is
// `Clone`; derive would add a spurious `V: Clone` bound.
impl<AF: Address, V> Clone for Table<AF, V> {
    fn clone(&self) -> Self {
        Table {
            root: self.root.clone(),
        }
    }
}

impl<AF: Address, V: std::fmt::Debug> std::fmt::Debug for Table<AF, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("root", &self.root).finish()
    }
}

impl<AF: Address, V> Table<AF, V> {
    pub fn new() -> Self {
        Table { root: None }
    }

    pub fn size(&self) -> usize {
        node::size(&self.root)
    }

    pub fn height(&self) -> usize {
        node::height(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, prefix: &Prefix<AF>) -> Option<&V> {
        node::get_exact(&self.root, prefix)
    }

    pub fn contains(&self, prefix: &Prefix<AF>) -> bool {
        self.get(prefix).is_some()
    }

    pub fn longest_match(&self, key: &Prefix<AF>) -> Option<LongestMatch<AF, &V>> {
        let found = node::longest_match(&self.root, key)?;
        Some(LongestMatch {
            prefix: found.prefix,
            value: found.value.as_ref().expect("active node has a value"),
            match_type: match_type(found.prefix, key),
        })
    }

    /// Visits active (prefix, value) pairs in lexicographic order; a
    /// `false` return from `cb` halts the walk early.
    pub fn walk(&self, mut cb: impl FnMut(&Prefix<AF>, &V) -> bool) -> bool {
        node::walk(&self.root, &mut cb)
    }

    /// A new mutable handle seeded with this snapshot's root. The
    /// snapshot itself is untouched; subsequent writes to the handle do
    /// not affect it.
    pub fn to_mut(&self) -> TableMut<AF, V> {
        TableMut {
            handle: Handle::new(self.root.clone()),
        }
    }
}

impl<AF: Address, V> Default for Table<AF, V> {
    fn default() -> Self {
        Table::new()
    }
}

impl<AF: Address, V: Clone> Table<AF, V> {
    pub fn collect(&self) -> Vec<(Prefix<AF>, V)> {
        node::collect(&self.root)
    }
}

impl<AF: Address, V: ValueEq + Clone> Table<AF, V> {
    /// The minimal set of (prefix, value) pairs preserving longest-prefix
    /// match equivalence with this table (§4.6).
    pub fn aggregate(&self) -> Table<AF, V> {
        let mut root: Link<AF, V> = None;
        for (p, v) in node::aggregate(&self.root) {
            root = node::insert(
                root,
                p,
                v,
                node::InsertOptions {
                    allow_insert: true,
                    allow_update: true,
                },
            )
            .expect("aggregated prefixes are already disjoint by construction");
        }
        Table { root }
    }
}

impl<AF: Address, V: ValueEq> Table<AF, V> {
    /// Walks both tables in lockstep, reporting Removed/Added/Modified
    /// active prefixes per `opts` (§4.7).
    pub fn diff(
        &self,
        other: &Table<AF, V>,
        opts: &DiffOptions,
        mut cb: impl FnMut(DiffEvent<AF, V>) -> bool,
    ) -> bool {
        node::diff(&self.root, &other.root, opts, &mut cb)
    }
}

impl<AF: Address, V: PartialEq> PartialEq for Table<AF, V> {
    fn eq(&self, other: &Self) -> bool {
        node::structurally_equal(&self.root, &other.root)
    }
}

impl<AF: Address, V: PartialEq> Eq for Table<AF, V> {}

impl<AF: Address, V: Clone> FromIterator<(Prefix<AF>, V)> for Table<AF, V> {
    fn from_iter<I: IntoIterator<Item = (Prefix<AF>, V)>>(iter: I) -> Self {
        let mut root: Link<AF, V> = None;
        for (p, v) in iter {
            root = node::insert(
                root,
                p,
                v,
                node::InsertOptions {
                    allow_insert: true,
                    allow_update: true,
                },
            )
            .expect("insert-or-update never fails");
        }
        Table { root }
    }
}

/// A mutable handle over a shared, atomically-published trie cell.
pub struct TableMut<AF: Address, V> {
    handle: Handle<AF, V>,
}

impl<AF: Address, V: Clone> TableMut<AF, V> {
    pub fn new() -> Self {
        TableMut {
            handle: Handle::new(None),
        }
    }

    /// A new handle sharing this one's cell: writes through either are
    /// visible through both.
    pub fn share(&self) -> Self {
        TableMut {
            handle: self.handle.share(),
        }
    }

    pub fn size(&self) -> usize {
        node::size(&self.handle.load())
    }

    /// A point-in-time immutable snapshot of this handle's current root.
    pub fn freeze(&self) -> Table<AF, V> {
        Table {
            root: self.handle.load(),
        }
    }

    /// Inserts `value` at `prefix`. Returns `false` (no change) if the
    /// prefix is already present.
    pub fn insert(&self, prefix: Prefix<AF>, value: V) -> bool {
        self.handle
            .mutate(|root| {
                match node::insert(
                    root,
                    prefix,
                    value,
                    node::InsertOptions {
                        allow_insert: true,
                        allow_update: false,
                    },
                ) {
                    Ok(new_root) => Ok((new_root, true)),
                    Err(node::InsertError::AlreadyExists) => {
                        Err(())
                    }
                    Err(node::InsertError::DoesNotExist) => unreachable!(
                        "allow_insert is set, so this cannot happen"
                    ),
                }
            })
            .unwrap_or(false)
    }

    /// Overwrites the value at `prefix`. Returns `false` (no change) if
    /// the prefix is absent.
    pub fn update(&self, prefix: Prefix<AF>, value: V) -> bool {
        self.handle
            .mutate(|root| {
                match node::insert(
                    root,
                    prefix,
                    value,
                    node::InsertOptions {
                        allow_insert: false,
                        allow_update: true,
                    },
                ) {
                    Ok(new_root) => Ok((new_root, true)),
                    Err(node::InsertError::DoesNotExist) => Err(()),
                    Err(node::InsertError::AlreadyExists) => unreachable!(
                        "allow_update is set, so this cannot happen"
                    ),
                }
            })
            .unwrap_or(false)
    }

    /// Inserts `value` at `prefix`, overwriting any existing value.
    pub fn insert_or_update(&self, prefix: Prefix<AF>, value: V) {
        self.handle
            .mutate(|root| {
                let new_root = node::insert(
                    root,
                    prefix,
                    value,
                    node::InsertOptions {
                        allow_insert: true,
                        allow_update: true,
                    },
                )
                .expect("insert-or-update never fails");
                Ok::<_, std::convert::Infallible>((new_root, ()))
            })
            .unwrap_or(())
    }

    /// Returns `prefix`'s value if present, else inserts `value` and
    /// returns it.
    pub fn get_or_insert(&self, prefix: Prefix<AF>, value: V) -> V
    where
        V: Clone,
    {
        self.handle
            .mutate(|root| {
                if let Some(existing) = node::get_exact(&root, &prefix) {
                    let existing = existing.clone();
                    return Ok::<_, std::convert::Infallible>((root, existing));
                }
                let value_clone = value.clone();
                let new_root = node::insert(
                    root,
                    prefix,
                    value,
                    node::InsertOptions {
                        allow_insert: true,
                        allow_update: true,
                    },
                )
                .expect("prefix was confirmed absent above");
                Ok((new_root, value_clone))
            })
            .unwrap()
    }

    /// Removes `prefix`. Returns `false` (no change) if it was absent.
    pub fn remove(&self, prefix: &Prefix<AF>) -> bool {
        let prefix = *prefix;
        self.handle
            .mutate(|root| match node::delete(root, prefix) {
                Ok(new_root) => Ok((new_root, true)),
                Err(node::DeleteError::NotFound) => Err(()),
            })
            .unwrap_or(false)
    }

    pub fn get(&self, prefix: &Prefix<AF>) -> Option<V>
    where
        V: Clone,
    {
        node::get_exact(&self.handle.load(), prefix).cloned()
    }

    pub fn longest_match(&self, key: &Prefix<AF>) -> Option<LongestMatch<AF, V>>
    where
        V: Clone,
    {
        let root = self.handle.load();
        let found = node::longest_match(&root, key)?;
        Some(LongestMatch {
            prefix: found.prefix,
            value: found.value.clone().expect("active node has a value"),
            match_type: match_type(found.prefix, key),
        })
    }

    pub fn walk(&self, mut cb: impl FnMut(&Prefix<AF>, &V) -> bool) -> bool {
        node::walk(&self.handle.load(), &mut cb)
    }
}

impl<AF: Address, V> Default for TableMut<AF, V> {
    /// An uninitialised handle: reads behave as an empty table, but any
    /// mutator panics until the handle is replaced with [`TableMut::new`]
    /// or a snapshot's [`Table::to_mut`].
    fn default() -> Self {
        TableMut {
            handle: Handle::uninitialized(),
        }
    }
}

//------------ Set ------------------------------------------------------------

/// An immutable, cheaply-clonable snapshot of a prefix set, kept in
/// maximally-flattened form.
#[derive(Clone)]
pub struct Set<AF: Address> {
    root: Link<AF, ()>,
}

impl<AF: Address> Set<AF> {
    pub fn new() -> Self {
        Set { root: None }
    }

    /// Total number of addresses this set covers (`Σ 2^(W-len)` over its
    /// active, maximally-flattened prefixes), not the number of trie nodes.
    pub fn size(&self) -> u128 {
        set::cardinality(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Whether any member prefix's range covers `key` (longest-prefix
    /// match membership, not exact membership).
    pub fn contains(&self, key: &Prefix<AF>) -> bool {
        node::longest_match(&self.root, key).is_some()
    }

    pub fn contains_exact(&self, prefix: &Prefix<AF>) -> bool {
        node::get_exact(&self.root, prefix).is_some()
    }

    pub fn union(&self, other: &Set<AF>) -> Set<AF> {
        Set {
            root: set::union(self.root.clone(), other.root.clone()),
        }
    }

    pub fn intersect(&self, other: &Set<AF>) -> Set<AF> {
        Set {
            root: set::intersect(self.root.clone(), other.root.clone()),
        }
    }

    pub fn difference(&self, other: &Set<AF>) -> Set<AF> {
        Set {
            root: set::difference(self.root.clone(), other.root.clone()),
        }
    }

    pub fn walk_prefixes(&self, mut cb: impl FnMut(&Prefix<AF>) -> bool) -> bool {
        node::walk(&self.root, &mut |p, _| cb(p))
    }

    /// The minimal list of closed address ranges this set covers, merging
    /// adjacent member prefixes.
    pub fn walk_ranges(&self) -> Vec<Range<AF>> {
        let prefixes = node::collect(&self.root).into_iter().map(|(p, _)| p);
        prefixes_to_ranges(prefixes)
    }

    /// Enumerates every individual address covered by this set. Only
    /// practical for small sets; provided as a helper, not the primary
    /// way to consume a set's membership.
    pub fn walk_addresses(&self, mut cb: impl FnMut(AF) -> bool) -> bool {
        for range in self.walk_ranges() {
            let mut addr = range.first();
            loop {
                if !cb(addr) {
                    return false;
                }
                if addr == range.last() {
                    break;
                }
                addr = addr
                    .checked_add(AF::checked_pow2(0).unwrap())
                    .expect("addr < range.last() so a successor exists");
            }
        }
        true
    }

    pub fn to_mut(&self) -> SetMut<AF> {
        SetMut {
            handle: Handle::new(self.root.clone()),
        }
    }
}

impl<AF: Address> Default for Set<AF> {
    fn default() -> Self {
        Set::new()
    }
}

impl<AF: Address> PartialEq for Set<AF> {
    fn eq(&self, other: &Self) -> bool {
        node::structurally_equal(&self.root, &other.root)
    }
}

impl<AF: Address> Eq for Set<AF> {}

impl<AF: Address> FromIterator<Prefix<AF>> for Set<AF> {
    fn from_iter<I: IntoIterator<Item = Prefix<AF>>>(iter: I) -> Self {
        let mut root: Link<AF, ()> = None;
        for p in iter {
            root = set::insert(root, p);
        }
        Set { root }
    }
}

impl<AF: Address> From<Range<AF>> for Set<AF> {
    fn from(range: Range<AF>) -> Self {
        range.to_prefixes().into_iter().collect()
    }
}

/// A mutable handle over a shared, atomically-published set cell.
pub struct SetMut<AF: Address> {
    handle: Handle<AF, ()>,
}

impl<AF: Address> SetMut<AF> {
    pub fn new() -> Self {
        SetMut {
            handle: Handle::new(None),
        }
    }

    pub fn share(&self) -> Self {
        SetMut {
            handle: self.handle.share(),
        }
    }

    /// Total number of addresses this set covers; see [`Set::size`].
    pub fn size(&self) -> u128 {
        set::cardinality(&self.handle.load())
    }

    pub fn freeze(&self) -> Set<AF> {
        Set {
            root: self.handle.load(),
        }
    }

    /// Adds `prefix` to the set, flattening newly-adjacent peers.
    pub fn insert(&self, prefix: Prefix<AF>) {
        self.handle
            .mutate(|root| {
                Ok::<_, std::convert::Infallible>((set::insert(root, prefix), ()))
            })
            .unwrap()
    }

    /// Removes `prefix` from the set, splitting a coarser covering member
    /// if necessary. Returns `false` (no change) if `prefix` was absent.
    pub fn remove(&self, prefix: &Prefix<AF>) -> bool {
        let prefix = *prefix;
        self.handle
            .mutate(|root| match set::remove(root, prefix) {
                Ok(new_root) => Ok((new_root, true)),
                Err(set::RemoveError::NotFound) => Err(()),
            })
            .unwrap_or(false)
    }

    pub fn contains(&self, key: &Prefix<AF>) -> bool {
        node::longest_match(&self.handle.load(), key).is_some()
    }
}

impl<AF: Address> Default for SetMut<AF> {
    fn default() -> Self {
        SetMut {
            handle: Handle::uninitialized(),
        }
    }
}

#[cfg(feature = "serde")]
impl<AF, V> serde::Serialize for Table<AF, V>
where
    AF: Address + serde::Serialize,
    V: Clone + serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.collect().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, AF, V> serde::Deserialize<'de> for Table<AF, V>
where
    AF: Address + serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs: Vec<(Prefix<AF>, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl<AF: Address + serde::Serialize> serde::Serialize for Set<AF> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let prefixes: Vec<Prefix<AF>> =
            node::collect(&self.root).into_iter().map(|(p, ())| p).collect();
        prefixes.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, AF: Address + serde::Deserialize<'de>> serde::Deserialize<'de>
    for Set<AF>
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let prefixes: Vec<Prefix<AF>> = Vec::deserialize(deserializer)?;
        Ok(prefixes.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(addr: u32, len: u8) -> Prefix<u32> {
        Prefix::new(addr, len).unwrap()
    }

    #[test]
    fn insert_then_get() {
        let t: TableMut<u32, i32> = TableMut::new();
        assert!(t.insert(p(0x0a000000, 8), 1));
        assert_eq!(t.get(&p(0x0a000000, 8)), Some(1));
    }

    #[test]
    fn insert_twice_fails() {
        let t: TableMut<u32, i32> = TableMut::new();
        assert!(t.insert(p(0x0a000000, 8), 1));
        assert!(!t.insert(p(0x0a000000, 8), 2));
        assert_eq!(t.get(&p(0x0a000000, 8)), Some(1));
    }

    #[test]
    fn update_requires_presence() {
        let t: TableMut<u32, i32> = TableMut::new();
        assert!(!t.update(p(0x0a000000, 8), 1));
        t.insert_or_update(p(0x0a000000, 8), 1);
        assert!(t.update(p(0x0a000000, 8), 2));
        assert_eq!(t.get(&p(0x0a000000, 8)), Some(2));
    }

    #[test]
    fn insert_remove_roundtrip_structurally_equal() {
        let before: Table<u32, i32> =
            std::iter::once((p(0x0b000000, 8), 2)).collect();
        let t = before.to_mut();
        t.insert(p(0x0a000000, 8), 1);
        t.remove(&p(0x0a000000, 8));
        assert_eq!(t.freeze(), before);
    }

    #[test]
    #[should_panic(expected = "not initialised")]
    fn default_mutable_table_panics_on_write() {
        let t: TableMut<u32, i32> = TableMut::default();
        t.insert(p(0x0a000000, 8), 1);
    }

    #[test]
    fn default_mutable_table_reads_empty() {
        let t: TableMut<u32, i32> = TableMut::default();
        assert_eq!(t.size(), 0);
        assert_eq!(t.get(&p(0x0a000000, 8)), None);
    }

    #[test]
    fn longest_match_reports_match_kind() {
        let t: TableMut<u32, i32> = TableMut::new();
        t.insert(p(0x0a000000, 8), 1);
        let m = t.longest_match(&p(0x0a000000, 8)).unwrap();
        assert_eq!(m.match_type, MatchType::Exact);
        let m = t.longest_match(&p(0x0a224a00, 24)).unwrap();
        assert_eq!(m.match_type, MatchType::Contains);
    }

    #[test]
    fn set_union_and_ranges() {
        let s: SetMut<u32> = SetMut::new();
        s.insert(p(0x0a000000, 25));
        s.insert(p(0x0a000080, 25));
        let snap = s.freeze();
        assert_eq!(snap.size(), 256);
        let ranges = snap.walk_ranges();
        assert_eq!(ranges, vec![Range::new(0x0a000000u32, 0x0a0000ffu32).unwrap()]);
    }

    #[test]
    fn set_from_range_round_trips() {
        let r = Range::new(10u32, 20u32).unwrap();
        let s: Set<u32> = r.into();
        assert_eq!(s.walk_ranges(), vec![r]);
    }

    #[test]
    fn shared_mutable_handles_see_each_other() {
        let a: TableMut<u32, i32> = TableMut::new();
        let b = a.share();
        a.insert(p(0x0a000000, 8), 9);
        assert_eq!(b.get(&p(0x0a000000, 8)), Some(9));
    }
}
