//! The copy-on-write radix trie node (§3, §4.2-§4.7).
//!
//! Grounded on the teacher's recursive-by-`compare` structure in
//! `tree.rs`/`match_node_for_strides!`, generalized from a stride-N bitmap
//! node to a plain binary two-child node: this crate's trie branches one
//! bit at a time rather than one nibble at a time, which is what the spec's
//! node model (§3) calls for.

use std::sync::Arc;

use crate::af::Address;
use crate::equal::ValueEq;
use crate::prefix::{compare, contains, Prefix, Relation};

pub(crate) type Link<AF, V> = Option<Arc<Node<AF, V>>>;

#[derive(Debug)]
pub(crate) struct Node<AF: Address, V> {
    pub(crate) prefix: Prefix<AF>,
    pub(crate) active: bool,
    pub(crate) value: Option<V>,
    pub(crate) children: [Link<AF, V>; 2],
    pub(crate) size: usize,
    pub(crate) height: usize,
}

pub(crate) fn size<AF: Address, V>(link: &Link<AF, V>) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

pub(crate) fn height<AF: Address, V>(link: &Link<AF, V>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

impl<AF: Address, V: Clone> Node<AF, V> {
    pub(crate) fn leaf(prefix: Prefix<AF>, value: V) -> Arc<Self> {
        Arc::new(Node {
            prefix,
            active: true,
            value: Some(value),
            children: [None, None],
            size: 1,
            height: 1,
        })
    }

    /// Rebuilds a node with fresh children, recomputing `size`/`height`
    /// bottom-up as §4.2 requires after every structural change.
    pub(crate) fn rebuild(
        prefix: Prefix<AF>,
        active: bool,
        value: Option<V>,
        children: [Link<AF, V>; 2],
    ) -> Arc<Self> {
        let size =
            usize::from(active) + size(&children[0]) + size(&children[1]);
        let height = 1 + height(&children[0]).max(height(&children[1]));
        Arc::new(Node {
            prefix,
            active,
            value,
            children,
            size,
            height,
        })
    }

    pub(crate) fn with_active(
        self: &Arc<Self>,
        prefix: Prefix<AF>,
        value: V,
    ) -> Arc<Self> {
        Node::rebuild(
            prefix,
            true,
            Some(value),
            [self.children[0].clone(), self.children[1].clone()],
        )
    }

    pub(crate) fn child_slot(
        self: &Arc<Self>,
        c: u8,
        new_child: Link<AF, V>,
    ) -> Arc<Self> {
        let mut children =
            [self.children[0].clone(), self.children[1].clone()];
        children[c as usize] = new_child;
        Node::rebuild(self.prefix, self.active, clone_value(&self.value), children)
    }
}

pub(crate) fn clone_value<V: Clone>(v: &Option<V>) -> Option<V> {
    v.clone()
}

/// Builds an inactive join node at `prefix` holding `a` and `b` as children,
/// `a` at index `a_bit`.
pub(crate) fn join<AF: Address, V: Clone>(
    prefix: Prefix<AF>,
    a_bit: u8,
    a: Arc<Node<AF, V>>,
    b: Arc<Node<AF, V>>,
) -> Arc<Node<AF, V>> {
    let mut children: [Link<AF, V>; 2] = [None, None];
    children[a_bit as usize] = Some(a);
    children[1 - a_bit as usize] = Some(b);
    Node::rebuild(prefix, false, None, children)
}

//------------ insert (§4.2) ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertError {
    AlreadyExists,
    DoesNotExist,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct InsertOptions {
    pub allow_insert: bool,
    pub allow_update: bool,
}

pub(crate) fn insert<AF: Address, V: Clone>(
    root: Link<AF, V>,
    prefix: Prefix<AF>,
    value: V,
    opts: InsertOptions,
) -> Result<Link<AF, V>, InsertError> {
    // `compare`/`contains` mask internally (via `Prefix::network`), so
    // `prefix` is threaded through and stored as given: host bits are data,
    // not something the trie is entitled to normalise away (§9).
    match root {
        None => {
            if opts.allow_insert {
                log::trace!("insert: new leaf at {prefix}");
                Ok(Some(Node::leaf(prefix, value)))
            } else {
                Err(InsertError::DoesNotExist)
            }
        }
        Some(node) => {
            let cmp = compare(&node.prefix, &prefix);
            match cmp.relation {
                Relation::Same => {
                    if node.active && !opts.allow_update {
                        Err(InsertError::AlreadyExists)
                    } else if !node.active && !opts.allow_insert {
                        Err(InsertError::DoesNotExist)
                    } else {
                        log::trace!("insert: setting value at {prefix}");
                        Ok(Some(node.with_active(prefix, value)))
                    }
                }
                Relation::Contains => {
                    let c = cmp.child;
                    let new_child = insert(
                        node.children[c as usize].clone(),
                        prefix,
                        value,
                        opts,
                    )?;
                    Ok(Some(node.child_slot(c, new_child)))
                }
                Relation::IsContained => {
                    if !opts.allow_insert {
                        return Err(InsertError::DoesNotExist);
                    }
                    log::trace!("insert: {prefix} becomes new parent of {}", node.prefix);
                    let c = node.prefix.bit_at(prefix.len());
                    let mut children: [Link<AF, V>; 2] = [None, None];
                    children[c as usize] = Some(node);
                    Ok(Some(Node::rebuild(
                        prefix,
                        true,
                        Some(value),
                        children,
                    )))
                }
                Relation::Disjoint => {
                    if !opts.allow_insert {
                        return Err(InsertError::DoesNotExist);
                    }
                    let joined = Prefix::new_unchecked(
                        node.prefix.network().mask(cmp.common),
                        cmp.common,
                    );
                    log::trace!("insert: splitting at {joined} for {prefix}");
                    let new_leaf = Node::leaf(prefix, value);
                    // `cmp.child` is the discriminating bit of whichever
                    // side of the comparison is longer; `reversed` tells us
                    // which side that was (see `prefix::compare`).
                    let node_bit = if cmp.reversed {
                        cmp.child
                    } else {
                        1 - cmp.child
                    };
                    Ok(Some(join(joined, node_bit, node, new_leaf)))
                }
            }
        }
    }
}

//------------ delete (§4.3) ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteError {
    NotFound,
}

pub(crate) fn delete<AF: Address, V: Clone>(
    root: Link<AF, V>,
    prefix: Prefix<AF>,
) -> Result<Link<AF, V>, DeleteError> {
    let masked = prefix.masked();
    match root {
        None => Err(DeleteError::NotFound),
        Some(node) => {
            let cmp = compare(&node.prefix, &masked);
            match cmp.relation {
                Relation::Same => {
                    if !node.active {
                        return Err(DeleteError::NotFound);
                    }
                    log::trace!("delete: removing {}", node.prefix);
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
                    let new_child =
                        delete(node.children[c as usize].clone(), masked)?;
                    let sibling = node.children[1 - c as usize].clone();
                    match (&new_child, node.active, &sibling) {
                        (None, false, Some(_)) => Ok(sibling),
                        (None, false, None) => Ok(None),
                        _ => {
                            let mut children =
                                [node.children[0].clone(), node.children[1].clone()];
                            children[c as usize] = new_child;
                            Ok(Some(Node::rebuild(
                                node.prefix,
                                node.active,
                                clone_value(&node.value),
                                children,
                            )))
                        }
                    }
                }
                Relation::IsContained | Relation::Disjoint => {
                    Err(DeleteError::NotFound)
                }
            }
        }
    }
}

//------------ longest match (§4.4) --------------------------------------------

pub(crate) fn longest_match<'a, AF: Address, V>(
    root: &'a Link<AF, V>,
    key: &Prefix<AF>,
) -> Option<&'a Node<AF, V>> {
    let node = root.as_deref()?;
    if key.len() < node.prefix.len() {
        return None;
    }
    let c = contains(&node.prefix, key);
    if !c.matches {
        return None;
    }
    if c.exact {
        return node.active.then_some(node);
    }
    if let Some(found) =
        longest_match(&node.children[c.child as usize], key)
    {
        return Some(found);
    }
    node.active.then_some(node)
}

pub(crate) fn get_exact<'a, AF: Address, V>(
    root: &'a Link<AF, V>,
    key: &Prefix<AF>,
) -> Option<&'a V> {
    let masked = key.masked();
    let node = root.as_deref()?;
    let cmp = compare(&node.prefix, &masked);
    match cmp.relation {
        Relation::Same => {
            if node.active {
                node.value.as_ref()
            } else {
                None
            }
        }
        Relation::Contains => {
            get_exact(&node.children[cmp.child as usize], &masked)
        }
        _ => None,
    }
}

//------------ walk (§4.5) ------------------------------------------------------

/// Visits active nodes in lexicographic prefix order. Returns `false` if the
/// callback asked to stop.
pub(crate) fn walk<AF: Address, V>(
    root: &Link<AF, V>,
    cb: &mut dyn FnMut(&Prefix<AF>, &V) -> bool,
) -> bool {
    let Some(node) = root else { return true };
    if node.active {
        if !cb(&node.prefix, node.value.as_ref().expect("active node has a value"))
        {
            return false;
        }
    }
    walk(&node.children[0], cb) && walk(&node.children[1], cb)
}

pub(crate) fn collect<AF: Address, V: Clone>(
    root: &Link<AF, V>,
) -> Vec<(Prefix<AF>, V)> {
    let mut out = Vec::new();
    walk(root, &mut |p, v| {
        out.push((*p, v.clone()));
        true
    });
    out
}

//------------ aggregate (§4.6) -------------------------------------------------

/// Returns `Some(v)` iff every address in `node.prefix`'s full range
/// resolves, by longest-prefix match, to the same value `v`.
///
/// A missing child slot falls back to the node's own value when the node
/// is active (there's nothing more specific there, so LPM resolves to the
/// node itself); an inactive node never has a missing slot (invariant I1).
fn full_coverage_value<AF: Address, V: ValueEq + Clone>(
    node: &Node<AF, V>,
) -> Option<V> {
    if node.children[0].is_none() && node.children[1].is_none() {
        return node.value.clone();
    }
    let side = |child: &Link<AF, V>| -> Option<V> {
        match child {
            Some(c) => full_coverage_value(c),
            None => node.value.clone(),
        }
    };
    let lv = side(&node.children[0]);
    let rv = side(&node.children[1]);
    match (lv, rv) {
        (Some(lv), Some(rv)) if lv.value_eq(&rv) => {
            if node.active {
                if lv.value_eq(node.value.as_ref().unwrap()) {
                    Some(lv)
                } else {
                    None
                }
            } else {
                Some(lv)
            }
        }
        _ => None,
    }
}

fn aggregate_rec<AF: Address, V: ValueEq + Clone>(
    node: &Node<AF, V>,
    ancestor: Option<&V>,
    out: &mut Vec<(Prefix<AF>, V)>,
) {
    if let Some(full) = full_coverage_value(node) {
        if ancestor.is_none_or(|a| !a.value_eq(&full)) {
            out.push((node.prefix, full));
        }
        return;
    }
    let new_ancestor = if node.active {
        let v = node.value.as_ref().expect("active node has a value");
        if ancestor.is_none_or(|a| !a.value_eq(v)) {
            out.push((node.prefix, v.clone()));
        }
        Some(v)
    } else {
        ancestor
    };
    if let Some(l) = &node.children[0] {
        aggregate_rec(l, new_ancestor, out);
    }
    if let Some(r) = &node.children[1] {
        aggregate_rec(r, new_ancestor, out);
    }
}

/// Produces the minimal list of `(prefix, value)` pairs that preserve
/// longest-prefix-match equivalence with `root` (§4.6).
pub(crate) fn aggregate<AF: Address, V: ValueEq + Clone>(
    root: &Link<AF, V>,
) -> Vec<(Prefix<AF>, V)> {
    let mut out = Vec::new();
    if let Some(node) = root {
        aggregate_rec(node, None, &mut out);
    }
    out
}

//------------ diff (§4.7) ------------------------------------------------------

pub enum DiffEvent<'a, AF: Address, V> {
    Removed(Prefix<AF>, &'a V),
    Added(Prefix<AF>, &'a V),
    Modified(Prefix<AF>, &'a V, &'a V),
}

#[derive(Default)]
pub struct DiffOptions {
    pub removed: bool,
    pub added: bool,
    pub modified: bool,
}

fn report_subtree<AF: Address, V, F>(
    root: &Link<AF, V>,
    make: &dyn Fn(Prefix<AF>, &V) -> DiffEvent<'_, AF, V>,
    cb: &mut F,
) -> bool
where
    F: FnMut(DiffEvent<AF, V>) -> bool,
{
    let mut cont = true;
    walk(root, &mut |p, v| {
        cont = cb(make(*p, v));
        cont
    });
    cont
}

pub(crate) fn diff<AF: Address, V: ValueEq, F>(
    left: &Link<AF, V>,
    right: &Link<AF, V>,
    opts: &DiffOptions,
    cb: &mut F,
) -> bool
where
    F: FnMut(DiffEvent<AF, V>) -> bool,
{
    match (left, right) {
        (None, None) => true,
        (Some(_), None) => {
            if opts.removed {
                report_subtree(left, &|p, v| DiffEvent::Removed(p, v), cb)
            } else {
                true
            }
        }
        (None, Some(_)) => {
            if opts.added {
                report_subtree(right, &|p, v| DiffEvent::Added(p, v), cb)
            } else {
                true
            }
        }
        (Some(l), Some(r)) => {
            if Arc::ptr_eq(l, r) {
                return true;
            }
            let cmp = compare(&l.prefix, &r.prefix);
            match cmp.relation {
                Relation::Same => {
                    if l.active && r.active {
                        if opts.modified
                            && !l
                                .value
                                .as_ref()
                                .unwrap()
                                .value_eq(r.value.as_ref().unwrap())
                            && !cb(DiffEvent::Modified(
                                l.prefix,
                                l.value.as_ref().unwrap(),
                                r.value.as_ref().unwrap(),
                            ))
                        {
                            return false;
                        }
                    } else if l.active && opts.removed {
                        if !cb(DiffEvent::Removed(
                            l.prefix,
                            l.value.as_ref().unwrap(),
                        )) {
                            return false;
                        }
                    } else if r.active && opts.added {
                        if !cb(DiffEvent::Added(
                            r.prefix,
                            r.value.as_ref().unwrap(),
                        )) {
                            return false;
                        }
                    }
                    diff(&l.children[0], &r.children[0], opts, cb)
                        && diff(&l.children[1], &r.children[1], opts, cb)
                }
                Relation::Contains => {
                    let c = cmp.child;
                    if l.active
                        && opts.removed
                        && !cb(DiffEvent::Removed(
                            l.prefix,
                            l.value.as_ref().unwrap(),
                        ))
                    {
                        return false;
                    }
                    // Visit children in address order (index 0 before 1),
                    // not on-path-before-off-path, to keep delivery
                    // lexicographic as §4.7 inherits from §4.5.
                    if c == 0 {
                        diff(&l.children[0], right, opts, cb)
                            && diff_against_none(&l.children[1], opts, cb, true)
                    } else {
                        diff_against_none(&l.children[0], opts, cb, true)
                            && diff(&l.children[1], right, opts, cb)
                    }
                }
                Relation::IsContained => {
                    let c = cmp.child;
                    if r.active
                        && opts.added
                        && !cb(DiffEvent::Added(
                            r.prefix,
                            r.value.as_ref().unwrap(),
                        ))
                    {
                        return false;
                    }
                    if c == 0 {
                        diff(left, &r.children[0], opts, cb)
                            && diff_against_none(&r.children[1], opts, cb, false)
                    } else {
                        diff_against_none(&r.children[0], opts, cb, false)
                            && diff(left, &r.children[1], opts, cb)
                    }
                }
                Relation::Disjoint => {
                    if opts.removed
                        && !report_subtree(
                            left,
                            &|p, v| DiffEvent::Removed(p, v),
                            cb,
                        )
                    {
                        return false;
                    }
                    if opts.added {
                        return report_subtree(
                            right,
                            &|p, v| DiffEvent::Added(p, v),
                            cb,
                        );
                    }
                    true
                }
            }
        }
    }
}

fn diff_against_none<AF: Address, V, F>(
    side: &Link<AF, V>,
    opts: &DiffOptions,
    cb: &mut F,
    side_is_left: bool,
) -> bool
where
    F: FnMut(DiffEvent<AF, V>) -> bool,
{
    if side_is_left {
        if opts.removed {
            report_subtree(side, &|p, v| DiffEvent::Removed(p, v), cb)
        } else {
            true
        }
    } else if opts.added {
        report_subtree(side, &|p, v| DiffEvent::Added(p, v), cb)
    } else {
        true
    }
}

//------------ structural equality ---------------------------------------------

pub(crate) fn structurally_equal<AF: Address, V: PartialEq>(
    a: &Link<AF, V>,
    b: &Link<AF, V>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            if Arc::ptr_eq(a, b) {
                return true;
            }
            a.prefix == b.prefix
                && a.active == b.active
                && a.value == b.value
                && structurally_equal(&a.children[0], &b.children[0])
                && structurally_equal(&a.children[1], &b.children[1])
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(addr: u32, len: u8) -> Prefix<u32> {
        Prefix::new(addr, len).unwrap()
    }

    fn ins(
        root: Link<u32, i32>,
        addr: u32,
        len: u8,
        v: i32,
    ) -> Link<u32, i32> {
        insert(
            root,
            p(addr, len),
            v,
            InsertOptions {
                allow_insert: true,
                allow_update: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn insert_then_match() {
        let root = ins(None, 0x0a000000, 8, 1);
        let root = ins(root, 0x0a224a00, 24, 2);
        let m = longest_match(&root, &p(0x0a224a01, 32)).unwrap();
        assert_eq!(m.prefix, p(0x0a224a00, 24));
        assert_eq!(*m.value.as_ref().unwrap(), 2);
    }

    #[test]
    fn insert_preserves_host_bits_for_display() {
        // 10.0.0.255/24: the trailing .255 is a host bit under a /24 and
        // must not be normalised away by insert.
        let root = ins(None, 0x0a0000ff, 24, 1);
        let stored = collect(&root);
        assert_eq!(stored, vec![(p(0x0a0000ff, 24), 1)]);
        // Trie semantics (longest-match, containment) still mask it.
        let m = longest_match(&root, &p(0x0a000005, 32)).unwrap();
        assert_eq!(m.prefix, p(0x0a0000ff, 24));
    }

    #[test]
    fn insert_disjoint_then_walk_order() {
        let root = ins(None, 0x0b000000, 8, 2);
        let root = ins(root, 0x0a000000, 8, 1);
        let items = collect(&root);
        assert_eq!(items, vec![(p(0x0a000000, 8), 1), (p(0x0b000000, 8), 2)]);
    }

    #[test]
    fn insert_contains_and_is_contained() {
        let root = ins(None, 0x0a000000, 8, 1);
        let root = ins(root, 0x0a224a00, 24, 2);
        let root = ins(root, 0x00000000, 0, 9); // is-contained case: new root
        let items = collect(&root);
        assert_eq!(
            items,
            vec![
                (p(0x00000000, 0), 9),
                (p(0x0a000000, 8), 1),
                (p(0x0a224a00, 24), 2),
            ]
        );
    }

    #[test]
    fn insert_disjoint_via_longer_existing_node() {
        // Parent /8 contains both; existing child is a /24 that is longer
        // than, and genuinely disjoint from, the new /16 -- exercises the
        // `reversed` branch of the disjoint split.
        let root = ins(None, 0x0a000000, 8, 1); // 10.0.0.0/8
        let root = ins(root, 0x0a050600, 24, 2); // 10.5.6.0/24
        let root = ins(root, 0x0a050000, 16, 3); // 10.5.0.0/16, disjoint from /24
        let items = collect(&root);
        assert_eq!(
            items,
            vec![
                (p(0x0a000000, 8), 1),
                (p(0x0a050000, 16), 3),
                (p(0x0a050600, 24), 2),
            ]
        );
    }

    #[test]
    fn delete_same_both_children() {
        let root = ins(None, 0x0a000000, 8, 1);
        let root = ins(root, 0x0a000000, 9, 2);
        let root = ins(root, 0x0a800000, 9, 3);
        let root = delete(root, p(0x0a000000, 8)).unwrap();
        let items = collect(&root);
        assert_eq!(items, vec![(p(0x0a000000, 9), 2), (p(0x0a800000, 9), 3)]);
    }

    #[test]
    fn insert_then_delete_roundtrip() {
        let before: Link<u32, i32> = ins(None, 0x0b000000, 8, 2);
        let root = ins(before.clone(), 0x0a000000, 8, 1);
        let root = delete(root, p(0x0a000000, 8)).unwrap();
        assert!(structurally_equal(&root, &before));
    }

    #[test]
    fn aggregate_drops_redundant_and_merges_peers() {
        let root = ins(None, 0x0a000000, 25, 9); // 10.0.0.0/25
        let root = ins(root, 0x0a000080, 25, 9); // 10.0.0.128/25, same value
        let agg = aggregate(&root);
        assert_eq!(agg, vec![(p(0x0a000000, 24), 9)]);
    }

    #[test]
    fn aggregate_keeps_differing_nested_value() {
        let root = ins(None, 0x0ae00000, 16, 100); // A
        let root = ins(root, 0x0ae01800, 24, 100); // A, redundant
        let root = ins(root, 0x0ae01800, 32, 200); // B
        let agg = aggregate(&root);
        assert_eq!(
            agg,
            vec![(p(0x0ae00000, 16), 100), (p(0x0ae01800, 32), 200)]
        );
    }

    #[test]
    fn aggregate_idempotent() {
        let root = ins(None, 0x0a000000, 25, 9);
        let root = ins(root, 0x0a000080, 25, 9);
        let once = aggregate(&root);
        let mut rebuilt = None;
        for (p, v) in &once {
            rebuilt = ins(rebuilt, p.address(), p.len(), *v);
        }
        let twice = aggregate(&rebuilt);
        assert_eq!(once, twice);
    }

    #[test]
    fn diff_modified_and_symmetry() {
        let left = ins(None, 0x0a000000, 25, 2);
        let left = ins(left, 0x0a000080, 25, 2);
        let right = ins(None, 0x0a000000, 25, 3);
        let right = ins(right, 0x0a000080, 25, 3);
        let opts = DiffOptions {
            removed: true,
            added: true,
            modified: true,
        };
        let mut mods = Vec::new();
        diff(&left, &right, &opts, &mut |e| {
            if let DiffEvent::Modified(p, a, b) = e {
                mods.push((p, *a, *b));
            }
            true
        });
        assert_eq!(
            mods,
            vec![(p(0x0a000000, 25), 2, 3), (p(0x0a000080, 25), 2, 3)]
        );
    }

    #[test]
    fn diff_delivers_in_lexicographic_order() {
        // Left: 10.0.0.0/8 = "P", with two /9 children. Right: only the
        // low-half /9 exists, under no /8 parent. The on-path (low) child
        // sits at index 0; the off-path (high, removed) sibling at index 1.
        // Events must come out low-address-first regardless of which side
        // is "on path".
        let left = ins(None, 0x0a000000, 8, 1);
        let left = ins(left, 0x0a000000, 9, 2);
        let left = ins(left, 0x0a800000, 9, 3);
        let right = ins(None, 0x0a000000, 9, 20);

        let opts = DiffOptions {
            removed: true,
            added: true,
            modified: true,
        };
        let mut order = Vec::new();
        diff(&left, &right, &opts, &mut |e| {
            match e {
                DiffEvent::Removed(p, _) => order.push(("removed", p)),
                DiffEvent::Added(p, _) => order.push(("added", p)),
                DiffEvent::Modified(p, _, _) => order.push(("modified", p)),
            }
            true
        });
        assert_eq!(
            order,
            vec![
                ("removed", p(0x0a000000, 8)),
                ("modified", p(0x0a000000, 9)),
                ("removed", p(0x0a800000, 9)),
            ]
        );
    }
}
