//! Mutable handle and atomic publication (§4.11).
//!
//! Grounded on the teacher's `OnceBox`/`OnceBoxSlice` (`src/cht/oncebox.rs`):
//! same `AtomicPtr` + `compare_exchange` idiom, generalized from "set once,
//! never again" to "compare-and-swap repeatedly", since a mutable handle
//! keeps publishing new roots for its whole lifetime rather than
//! initialising a single slot.

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use crate::af::Address;
use crate::node::{Link, Node};

fn link_into_raw<AF: Address, V>(link: Link<AF, V>) -> *mut Node<AF, V> {
    match link {
        Some(arc) => Arc::into_raw(arc) as *mut _,
        None => ptr::null_mut(),
    }
}

/// Reconstructs a [`Link`] from a raw pointer without consuming the strong
/// reference it represents (used to peek at what a cell currently holds).
///
/// # Safety
/// `raw` must either be null or have been produced by [`Arc::into_raw`] on
/// an `Arc<Node<AF, V>>` whose strong count is still held somewhere (the
/// cell itself, typically).
unsafe fn link_clone_from_raw<AF: Address, V>(
    raw: *mut Node<AF, V>,
) -> Link<AF, V> {
    if raw.is_null() {
        return None;
    }
    let borrowed = unsafe { Arc::from_raw(raw) };
    let cloned = borrowed.clone();
    std::mem::forget(borrowed);
    Some(cloned)
}

/// The unit of atomic publication: an `AtomicPtr` standing in for
/// `Option<Arc<Node<AF, V>>>`.
struct RootCell<AF: Address, V> {
    ptr: AtomicPtr<Node<AF, V>>,
}

impl<AF: Address, V> RootCell<AF, V> {
    fn new(root: Link<AF, V>) -> Self {
        RootCell {
            ptr: AtomicPtr::new(link_into_raw(root)),
        }
    }

    fn load(&self) -> Link<AF, V> {
        let raw = self.ptr.load(Ordering::Acquire);
        unsafe { link_clone_from_raw(raw) }
    }

    /// Replaces `old` with `new` iff the cell still holds `old`. Returns
    /// `false` (and leaves the cell untouched) if another writer published
    /// first.
    fn publish(&self, old: &Link<AF, V>, new: Link<AF, V>) -> bool {
        let old_raw = old
            .as_ref()
            .map_or(ptr::null_mut(), |a| Arc::as_ptr(a) as *mut _);
        let new_raw = link_into_raw(new);
        match self.ptr.compare_exchange(
            old_raw,
            new_raw,
            Ordering::Release,
            Ordering::Acquire,
        ) {
            Ok(prev) => {
                log::trace!("publish: root {:p} -> {:p}", old_raw, new_raw);
                // The cell no longer owns this reference; we do, only to
                // drop it immediately (the caller's `old` keeps its own).
                if !prev.is_null() {
                    drop(unsafe { Arc::from_raw(prev) });
                }
                true
            }
            Err(_) => {
                // Undo the strong reference `link_into_raw` created for
                // `new_raw`; the caller's `new` still owns its own.
                if !new_raw.is_null() {
                    drop(unsafe { Arc::from_raw(new_raw) });
                }
                false
            }
        }
    }
}

impl<AF: Address, V> Drop for RootCell<AF, V> {
    fn drop(&mut self) {
        let raw = self.ptr.swap(ptr::null_mut(), Ordering::Relaxed);
        if !raw.is_null() {
            drop(unsafe { Arc::from_raw(raw) });
        }
    }
}

struct Cell<AF: Address, V> {
    root: RootCell<AF, V>,
}

/// A shareable, mutable reference to a trie root. Several `Handle` values
/// may point at the same cell (they then observe each other's writes);
/// [`Handle::uninitialized`] produces the "null cell" state a
/// default-constructed mutable table/set starts in.
pub(crate) struct Handle<AF: Address, V> {
    cell: Option<Arc<Cell<AF, V>>>,
}

impl<AF: Address, V> Handle<AF, V> {
    pub(crate) fn new(root: Link<AF, V>) -> Self {
        Handle {
            cell: Some(Arc::new(Cell {
                root: RootCell::new(root),
            })),
        }
    }

    pub(crate) fn uninitialized() -> Self {
        Handle { cell: None }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.cell.is_some()
    }

    /// A new handle sharing this one's cell; writes through either are
    /// visible through both.
    pub(crate) fn share(&self) -> Self {
        Handle {
            cell: self.cell.clone(),
        }
    }

    /// Reads on an uninitialised handle behave like an empty trie rather
    /// than panicking (§4.11's "null-cell" reader contract).
    pub(crate) fn load(&self) -> Link<AF, V> {
        self.cell.as_ref().and_then(|c| c.root.load())
    }

    /// Applies `f` to the current root and publishes whatever it returns
    /// by compare-and-swap.
    ///
    /// # Panics
    /// Panics if the handle is uninitialised, or if another writer
    /// published to the same cell between the read and the swap
    /// ("concurrent modification detected" -- mutable handles are
    /// single-writer by design).
    pub(crate) fn mutate<T, E>(
        &self,
        f: impl FnOnce(Link<AF, V>) -> Result<(Link<AF, V>, T), E>,
    ) -> Result<T, E> {
        let cell = self
            .cell
            .as_ref()
            .expect("mutable handle is not initialised");
        let old = cell.root.load();
        let (new, out) = f(old.clone())?;
        if !cell.root.publish(&old, new) {
            log::warn!("concurrent write to the same mutable handle");
            panic!("concurrent modification detected");
        }
        Ok(out)
    }
}
