// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Host` trait: the seam between the core and its environment.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::attrs::{AttrName, ChangeRecord, WatchMask};

/// Handle to a watch registered with [`Host::watch`].
///
/// Generational: a slot index plus a generation counter, so a handle kept
/// past [`Host::unwatch`] goes stale instead of aliasing a new watch that
/// happens to reuse the slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WatchId(pub(crate) u32, pub(crate) u32);

impl WatchId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// An observable attribute source.
///
/// Implementations own the elements; the synchronization core only holds
/// copyable handles of type [`Elem`](Self::Elem) and goes through this trait
/// for every read, write, and observation.
///
/// ## Contract
///
/// - `write` applies synchronously: a `read` issued right after sees the new
///   value.
/// - A `write` that does not change the stored value is a no-op and records
///   nothing. This is load-bearing: re-derived attributes (hidden, aria)
///   would otherwise echo forever.
/// - A changing `write` enqueues one [`ChangeRecord`] on every live watch
///   whose element matches and whose mask covers the attribute. Records stay
///   queued until drained with `take_batch`; they are never dropped.
/// - Per watch, records are delivered in write order. No ordering is
///   guaranteed across watches.
/// - Operations addressed at dead elements or stale watch handles are
///   no-ops (`read` returns `None`, `take_batch` returns an empty batch).
pub trait Host {
    /// Element handle. Cheap to copy, ordered so it can key lookup tables.
    type Elem: Copy + Ord + Debug;

    /// Whether `elem` refers to a live element.
    fn is_alive(&self, elem: Self::Elem) -> bool;

    /// Read an attribute. `None` means absent. Presence attributes read as
    /// `Some("")` when set.
    fn read(&self, elem: Self::Elem, attr: AttrName) -> Option<String>;

    /// Write (`Some`) or remove (`None`) an attribute.
    fn write(&mut self, elem: Self::Elem, attr: AttrName, value: Option<&str>);

    /// Resolve a selector to the set of matching live elements.
    ///
    /// Selector syntax is host-defined; the core treats selectors as opaque
    /// strings handed through from configuration.
    fn select(&self, selector: &str) -> Vec<Self::Elem>;

    /// Start observing `elem` for attributes covered by `mask`.
    fn watch(&mut self, elem: Self::Elem, mask: WatchMask) -> WatchId;

    /// Stop a watch and discard anything still queued on it.
    fn unwatch(&mut self, watch: WatchId);

    /// Drain everything queued on `watch` since the last drain, in write
    /// order. Empty if nothing is pending or the handle is stale.
    fn take_batch(&mut self, watch: WatchId) -> Vec<ChangeRecord>;

    /// The current URL fragment, without the leading `#`. `None` when the
    /// URL carries no fragment.
    fn fragment(&self) -> Option<String>;

    /// Replace the fragment of the current history entry.
    ///
    /// `Some(slug)` sets `#slug`; `None` restores the bare path. This must
    /// never push a new history entry — drawer toggles are not navigation.
    fn replace_fragment(&mut self, fragment: Option<&str>);
}
