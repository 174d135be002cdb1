//! Set-specialized trie operations (§4.8): unit-valued tries kept in
//! maximally-flattened form, plus `union`/`intersect`/`difference`.
//!
//! Grounded on `node.rs`'s recursive-by-`compare` shape; a set reuses the
//! same `Node<AF, V>` layout with `V = ()`, the same parameterisation the
//! teacher uses for `AddressFamily`/`Meta` rather than hand-rolling a
//! separate bitset type.

use std::sync::Arc;

use crate::af::Address;
use crate::node::{self, clone_value, join, Link, Node};
use crate::prefix::{compare, Prefix, Relation};
use crate::range::Range;

/// Collapses an inactive node whose two children are both active and
/// exactly one bit longer than it into a single active leaf, dropping the
/// children. This is what keeps a set maximally compacted after edits.
fn try_flatten<AF: Address>(node: Arc<Node<AF, ()>>) -> Arc<Node<AF, ()>> {
    if node.active {
        return node;
    }
    let child_len = node.prefix.len() + 1;
    match (&node.children[0], &node.children[1]) {
        (Some(l), Some(r))
            if l.active
                && r.active
                && l.prefix.len() == child_len
                && r.prefix.len() == child_len =>
        {
            log::debug!(
                "flatten: merging {} and {} into {}",
                l.prefix,
                r.prefix,
                node.prefix
            );
            Node::leaf(node.prefix, ())
        }
        _ => node,
    }
}

/// Inserts `prefix` into a set, flattening newly-adjacent peers as it
/// rebuilds the path back to the root.
pub(crate) fn insert<AF: Address>(
    root: Link<AF, ()>,
    prefix: Prefix<AF>,
) -> Link<AF, ()> {
    // `compare` masks internally, so `prefix` is stored as given rather
    // than normalised away, matching the table's insert (§9).
    Some(insert_rec(root, prefix))
}

fn insert_rec<AF: Address>(
    root: Link<AF, ()>,
    prefix: Prefix<AF>,
) -> Arc<Node<AF, ()>> {
    match root {
        None => Node::leaf(prefix, ()),
        Some(node) => {
            let cmp = compare(&node.prefix, &prefix);
            match cmp.relation {
                Relation::Same => {
                    if node.active {
                        node
                    } else {
                        node.with_active(prefix, ())
                    }
                }
                Relation::Contains => {
                    let c = cmp.child;
                    let new_child =
                        insert_rec(node.children[c as usize].clone(), prefix);
                    try_flatten(node.child_slot(c, Some(new_child)))
                }
                Relation::IsContained => {
                    let c = node.prefix.bit_at(prefix.len());
                    let mut children: [Link<AF, ()>; 2] = [None, None];
                    children[c as usize] = Some(node);
                    try_flatten(Node::rebuild(prefix, true, Some(()), children))
                }
                Relation::Disjoint => {
                    let joined = Prefix::new_unchecked(
                        node.prefix.network().mask(cmp.common),
                        cmp.common,
                    );
                    let new_leaf = Node::leaf(prefix, ());
                    let node_bit =
                        if cmp.reversed { cmp.child } else { 1 - cmp.child };
                    try_flatten(join(joined, node_bit, node, new_leaf))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoveError {
    NotFound,
}

/// Removes `prefix` from a set. When `prefix` lies strictly inside an
/// active node's range (rather than naming that node exactly), the node's
/// range is split: everything except `prefix`'s range is re-inserted,
/// which is what lets `remove` work against a set stored as one coarser
/// covering prefix.
pub(crate) fn remove<AF: Address>(
    root: Link<AF, ()>,
    prefix: Prefix<AF>,
) -> Result<Link<AF, ()>, RemoveError> {
    let masked = prefix.masked();
    match root {
        None => Err(RemoveError::NotFound),
        Some(node) => {
            let cmp = compare(&node.prefix, &masked);
            match cmp.relation {
                Relation::Same => {
                    if !node.active {
                        return Err(RemoveError::NotFound);
                    }
                    match (&node.children[0], &node.children[1]) {
                        (None, None) => Ok(None),
                        (Some(_), None) => Ok(node.children[0].clone()),
                        (None, Some(_)) => Ok(node.children[1].clone()),
                        (Some(_), Some(_)) => Ok(Some(Node::rebuild(
                            node.prefix,
                            false,
                            None,
                            [
                                node.children[0].clone(),
                                node.children[1].clone(),
                            ],
                        ))),
                    }
                }
                Relation::Contains => {
                    let c = cmp.child;
                    let new_child = remove(
                        node.children[c as usize].clone(),
                        masked,
                    )?;
                    let sibling = node.children[1 - c as usize].clone();
                    match (&new_child, node.active, &sibling) {
                        (None, false, Some(_)) => Ok(sibling),
                        (None, false, None) => Ok(None),
                        _ => {
                            let mut children = [
                                node.children[0].clone(),
                                node.children[1].clone(),
                            ];
                            children[c as usize] = new_child;
                            Ok(Some(try_flatten(Node::rebuild(
                                node.prefix,
                                node.active,
                                clone_value(&node.value),
                                children,
                            ))))
                        }
                    }
                }
                Relation::IsContained => {
                    if !node.active {
                        return Err(RemoveError::NotFound);
                    }
                    // `masked` names a prefix strictly inside this active
                    // node's range: rebuild the remainder as the union of
                    // the blocks covering `node.prefix`'s range minus
                    // `masked`'s range, then insert each back in.
                    let whole = Range::from_prefix(&node.prefix);
                    let hole = Range::from_prefix(&masked);
                    let remainder = subtract_many(vec![whole], hole);
                    let mut rebuilt: Link<AF, ()> = None;
                    for r in remainder {
                        for p in r.to_prefixes() {
                            rebuilt = insert(rebuilt, p);
                        }
                    }
                    Ok(rebuilt)
                }
                Relation::Disjoint => Err(RemoveError::NotFound),
            }
        }
    }
}

/// Removes the overlap with `hole` from every range in `ranges`, splitting
/// a range into (at most) two pieces when `hole` falls strictly inside it.
/// Ranges that do not overlap `hole` pass through unchanged.
fn subtract_many<AF: Address>(
    ranges: Vec<Range<AF>>,
    hole: Range<AF>,
) -> Vec<Range<AF>> {
    let one = AF::checked_pow2(0).expect("2^0 always fits");
    let mut out = Vec::new();
    for r in ranges {
        if hole.last() < r.first() || hole.first() > r.last() {
            out.push(r);
            continue;
        }
        if hole.first() > r.first() {
            let before_last = hole
                .first()
                .checked_sub(one)
                .expect("hole.first > r.first implies a predecessor exists");
            out.push(
                Range::new(r.first(), before_last)
                    .expect("r.first <= before_last by construction"),
            );
        }
        if hole.last() < r.last() {
            let after_first = hole
                .last()
                .checked_add(one)
                .expect("hole.last < r.last implies a successor exists");
            out.push(
                Range::new(after_first, r.last())
                    .expect("after_first <= r.last by construction"),
            );
        }
    }
    out
}

/// The maximal disjoint ranges actually covered by a set subtree: an
/// active node's whole range is reported without descending further,
/// since any active descendants below it are already covered.
fn maximal_ranges<AF: Address>(link: &Link<AF, ()>) -> Vec<Range<AF>> {
    match link {
        None => Vec::new(),
        Some(node) if node.active => vec![Range::from_prefix(&node.prefix)],
        Some(node) => {
            let mut out = maximal_ranges(&node.children[0]);
            out.extend(maximal_ranges(&node.children[1]));
            out
        }
    }
}

/// Total number of addresses the set covers: `Σ 2^(W-len)` over active
/// prefixes. A maximally-flattened set's active prefixes are pairwise
/// disjoint, so this is a plain sum rather than needing inclusion-exclusion.
/// This is the set's notion of "size" (§4.8); the node-count cached on each
/// `Node` (`node::size`) is a separate, internal bookkeeping figure used for
/// the structural invariants, not the set's address count.
pub(crate) fn cardinality<AF: Address>(root: &Link<AF, ()>) -> u128 {
    fn block_size(host_bits: u8) -> u128 {
        if host_bits >= 128 {
            // 2^128 does not fit in a u128; only a /0 over an already
            // hypothetical wider-than-IPv6 family could reach this.
            u128::MAX
        } else {
            1u128 << host_bits
        }
    }
    let mut total: u128 = 0;
    node::walk(root, &mut |p, _| {
        total = total.saturating_add(block_size(AF::BITS - p.len()));
        true
    });
    total
}

//------------ set algebra (§4.8) -----------------------------------------------

/// `A ∪ B`.
pub(crate) fn union<AF: Address>(
    a: Link<AF, ()>,
    b: Link<AF, ()>,
) -> Link<AF, ()> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => {
            if Arc::ptr_eq(&a, &b) {
                return Some(a);
            }
            let cmp = compare(&a.prefix, &b.prefix);
            match cmp.relation {
                Relation::Same => {
                    let active = a.active || b.active;
                    if active {
                        Some(Node::leaf(a.prefix, ()))
                    } else {
                        let l = union(
                            a.children[0].clone(),
                            b.children[0].clone(),
                        );
                        let r = union(
                            a.children[1].clone(),
                            b.children[1].clone(),
                        );
                        Some(try_flatten(Node::rebuild(
                            a.prefix,
                            false,
                            None,
                            [l, r],
                        )))
                    }
                }
                Relation::Contains => {
                    if a.active {
                        return Some(a);
                    }
                    let c = cmp.child;
                    let merged = union(a.children[c as usize].clone(), Some(b));
                    Some(try_flatten(a.child_slot(c, merged)))
                }
                Relation::IsContained => {
                    if b.active {
                        return Some(b);
                    }
                    let c = cmp.child;
                    let merged = union(Some(a), b.children[c as usize].clone());
                    Some(try_flatten(b.child_slot(c, merged)))
                }
                Relation::Disjoint => {
                    let joined = Prefix::new_unchecked(
                        a.prefix.network().mask(cmp.common),
                        cmp.common,
                    );
                    let a_bit = if cmp.reversed { cmp.child } else { 1 - cmp.child };
                    Some(try_flatten(join(joined, a_bit, a, b)))
                }
            }
        }
    }
}

/// `A ∩ B`.
pub(crate) fn intersect<AF: Address>(
    a: Link<AF, ()>,
    b: Link<AF, ()>,
) -> Link<AF, ()> {
    match (a, b) {
        (None, _) | (_, None) => None,
        (Some(a), Some(b)) => {
            if Arc::ptr_eq(&a, &b) {
                return Some(a);
            }
            let cmp = compare(&a.prefix, &b.prefix);
            match cmp.relation {
                Relation::Same => {
                    // An active node covers its whole range, so it cannot
                    // narrow what the other side already contributes: the
                    // intersection mirrors the other side exactly.
                    if a.active {
                        Some(b)
                    } else if b.active {
                        Some(a)
                    } else {
                        let l = intersect(
                            a.children[0].clone(),
                            b.children[0].clone(),
                        );
                        let r = intersect(
                            a.children[1].clone(),
                            b.children[1].clone(),
                        );
                        match (&l, &r) {
                            (None, None) => None,
                            _ => Some(try_flatten(Node::rebuild(
                                a.prefix, false, None, [l, r],
                            ))),
                        }
                    }
                }
                Relation::Contains => {
                    if a.active {
                        Some(b)
                    } else {
                        intersect(a.children[cmp.child as usize].clone(), Some(b))
                    }
                }
                Relation::IsContained => {
                    if b.active {
                        Some(a)
                    } else {
                        intersect(Some(a), b.children[cmp.child as usize].clone())
                    }
                }
                Relation::Disjoint => None,
            }
        }
    }
}

/// `A \ B`.
///
/// Computed over ranges rather than by structural recursion: an active
/// node anywhere in `A` or `B` can sit above further, individually
/// redundant active descendants (an artifact of how insert lifts a new
/// coarser membership above an existing finer one), so a purely
/// prefix-by-prefix walk would need to special-case every combination of
/// "active with leftover children" on both sides. Reducing both sides to
/// their maximal covered ranges first sidesteps that and is still linear
/// in the number of active nodes.
pub(crate) fn difference<AF: Address>(
    a: Link<AF, ()>,
    b: Link<AF, ()>,
) -> Link<AF, ()> {
    let b_ranges = maximal_ranges(&b);
    if b_ranges.is_empty() {
        return a;
    }
    let mut result: Link<AF, ()> = None;
    for ra in maximal_ranges(&a) {
        let mut remaining = vec![ra];
        for rb in &b_ranges {
            if remaining.is_empty() {
                break;
            }
            remaining = subtract_many(remaining, *rb);
        }
        for r in remaining {
            for p in r.to_prefixes() {
                result = insert(result, p);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::collect;

    fn p(addr: u32, len: u8) -> Prefix<u32> {
        Prefix::new(addr, len).unwrap()
    }

    fn keys(root: &Link<u32, ()>) -> Vec<Prefix<u32>> {
        collect(root).into_iter().map(|(p, _)| p).collect()
    }

    #[test]
    fn insert_flattens_sibling_halves() {
        let root = insert(None, p(0x0a000000, 25));
        let root = insert(root, p(0x0a000080, 25));
        assert_eq!(keys(&root), vec![p(0x0a000000, 24)]);
    }

    #[test]
    fn insert_preserves_host_bits_when_not_flattened() {
        let root = insert(None, p(0x0a0000ff, 24));
        assert_eq!(keys(&root), vec![p(0x0a0000ff, 24)]);
    }

    #[test]
    fn cardinality_counts_addresses_not_nodes() {
        let root = insert(None, p(0x0a000000, 25));
        let root = insert(root, p(0x0a000080, 25));
        // Flattens to a single /24 node, but covers 256 addresses.
        assert_eq!(keys(&root).len(), 1);
        assert_eq!(cardinality(&root), 256);
    }

    #[test]
    fn remove_splits_coarser_prefix() {
        let root = insert(None, p(0x0a000000, 24));
        let root = remove(root, p(0x0a000040, 26)).unwrap();
        let want: Vec<Prefix<u32>> = Range::new(0x0a000000u32, 0x0a00003fu32)
            .unwrap()
            .to_prefixes()
            .into_iter()
            .chain(
                Range::new(0x0a000080u32, 0x0a0000ffu32)
                    .unwrap()
                    .to_prefixes(),
            )
            .collect();
        let mut got = keys(&root);
        got.sort();
        let mut want = want;
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn union_commutative() {
        let a = insert(insert(None, p(0x0a000000, 8)), p(0x0c000000, 8));
        let b = insert(None, p(0x0b000000, 8));
        let ab = union(a.clone(), b.clone());
        let ba = union(b, a);
        assert_eq!(keys(&ab), keys(&ba));
        assert_eq!(
            keys(&ab),
            vec![p(0x0a000000, 8), p(0x0b000000, 8), p(0x0c000000, 8)]
        );
    }

    #[test]
    fn union_absorbs_more_specific() {
        let a = insert(None, p(0x0a000000, 8));
        let b = insert(None, p(0x0a224a00, 24));
        assert_eq!(keys(&union(a, b)), vec![p(0x0a000000, 8)]);
    }

    #[test]
    fn intersect_keeps_overlap_only() {
        let a = insert(insert(None, p(0x0a000000, 8)), p(0x0b000000, 8));
        let b = insert(None, p(0x0a224a00, 24));
        assert_eq!(keys(&intersect(a, b)), vec![p(0x0a224a00, 24)]);
    }

    #[test]
    fn difference_self_is_empty() {
        let a = insert(insert(None, p(0x0a000000, 8)), p(0x0b000000, 8));
        assert!(difference(a.clone(), a).is_none());
    }

    #[test]
    fn difference_then_union_recovers_superset() {
        let a = insert(None, p(0x0a000000, 8));
        let b = insert(None, p(0x0a224a00, 24));
        let diff = difference(a.clone(), b.clone());
        let back = union(diff, b);
        assert_eq!(keys(&back), keys(&a));
    }
}
