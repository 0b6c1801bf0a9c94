// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory reference host.
//!
//! [`MemHost`] implements [`Host`] over a generational element arena. It
//! exists so the synchronization core can be driven — and tested — without a
//! browser, and it spells out the queueing semantics a real host must match.
//!
//! Selectors are deliberately minimal: `"#name"` matches the element whose
//! `id` attribute equals `name`, anything else matches elements by tag. That
//! is enough to express the configuration the core hands through
//! (`data-knob="button"`, bulk activation by tag).

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::attrs::{AttrName, ChangeRecord, WatchMask};
use crate::host::{Host, WatchId};

/// Identifier for an element in a [`MemHost`].
///
/// A small, copyable handle consisting of a slot index and a generation
/// counter. Removing an element frees its slot; a handle kept past removal
/// goes stale and never aliases a later element reusing the slot, because
/// the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElemId(u32, u32);

impl ElemId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct ElemSlot {
    generation: u32,
    tag: String,
    attrs: BTreeMap<AttrName, String>,
}

#[derive(Clone, Debug)]
struct WatchSlot {
    generation: u32,
    elem: ElemId,
    mask: WatchMask,
    queue: Vec<ChangeRecord>,
}

/// An in-memory [`Host`]: elements, watches, and a URL-fragment slot.
pub struct MemHost {
    elems: Vec<Option<ElemSlot>>,
    elem_generations: Vec<u32>, // last generation per slot (persists across frees)
    elem_free: Vec<usize>,
    watches: Vec<Option<WatchSlot>>,
    watch_generations: Vec<u32>,
    watch_free: Vec<usize>,
    fragment: Option<String>,
    history_entries: u64,
}

impl core::fmt::Debug for MemHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let elems_alive = self.elems.iter().filter(|e| e.is_some()).count();
        let watches_alive = self.watches.iter().filter(|w| w.is_some()).count();
        f.debug_struct("MemHost")
            .field("elems_alive", &elems_alive)
            .field("watches_alive", &watches_alive)
            .field("fragment", &self.fragment)
            .field("history_entries", &self.history_entries)
            .finish_non_exhaustive()
    }
}

impl Default for MemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemHost {
    /// Create an empty host with a single (fragment-less) history entry.
    pub fn new() -> Self {
        Self {
            elems: Vec::new(),
            elem_generations: Vec::new(),
            elem_free: Vec::new(),
            watches: Vec::new(),
            watch_generations: Vec::new(),
            watch_free: Vec::new(),
            fragment: None,
            history_entries: 1,
        }
    }

    /// Create a new element with the given tag and no attributes.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    pub fn create_element(&mut self, tag: &str) -> ElemId {
        let slot = ElemSlot {
            generation: 0, // patched below
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
        };
        let (idx, generation) = if let Some(idx) = self.elem_free.pop() {
            let generation = self.elem_generations[idx].saturating_add(1);
            self.elem_generations[idx] = generation;
            self.elems[idx] = Some(ElemSlot { generation, ..slot });
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.elems.push(Some(ElemSlot { generation, ..slot }));
            self.elem_generations.push(generation);
            ((self.elems.len() - 1) as u32, generation)
        };
        ElemId::new(idx, generation)
    }

    /// Remove an element. Watches on it stop receiving records but stay
    /// drainable until their owner releases them.
    pub fn remove_element(&mut self, elem: ElemId) {
        if self.elem(elem).is_some() {
            self.elems[elem.idx()] = None;
            self.elem_free.push(elem.idx());
        }
    }

    /// Number of history entries. Starts at 1 and must not move on
    /// [`Host::replace_fragment`].
    pub fn history_entries(&self) -> u64 {
        self.history_entries
    }

    fn elem(&self, id: ElemId) -> Option<&ElemSlot> {
        let slot = self.elems.get(id.idx())?.as_ref()?;
        (slot.generation == id.1).then_some(slot)
    }

    fn elem_mut(&mut self, id: ElemId) -> Option<&mut ElemSlot> {
        let slot = self.elems.get_mut(id.idx())?.as_mut()?;
        (slot.generation == id.1).then_some(slot)
    }

    fn watch_mut(&mut self, id: WatchId) -> Option<&mut WatchSlot> {
        let slot = self.watches.get_mut(id.idx())?.as_mut()?;
        (slot.generation == id.1).then_some(slot)
    }
}

impl Host for MemHost {
    type Elem = ElemId;

    fn is_alive(&self, elem: ElemId) -> bool {
        self.elem(elem).is_some()
    }

    fn read(&self, elem: ElemId, attr: AttrName) -> Option<String> {
        self.elem(elem)?.attrs.get(&attr).cloned()
    }

    fn write(&mut self, elem: ElemId, attr: AttrName, value: Option<&str>) {
        let Some(slot) = self.elem_mut(elem) else {
            return;
        };
        let old = slot.attrs.get(&attr).cloned();
        if old.as_deref() == value {
            return; // unchanged writes record nothing
        }
        match value {
            Some(v) => {
                slot.attrs.insert(attr, v.to_string());
            }
            None => {
                slot.attrs.remove(&attr);
            }
        }
        for watch in self.watches.iter_mut().flatten() {
            if watch.elem == elem && watch.mask.covers(attr) {
                watch.queue.push(ChangeRecord {
                    attr,
                    old: old.clone(),
                });
            }
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    fn select(&self, selector: &str) -> Vec<ElemId> {
        let mut out = Vec::new();
        for (i, slot) in self.elems.iter().enumerate() {
            let Some(slot) = slot else {
                continue;
            };
            let matched = match selector.strip_prefix('#') {
                Some(id) => slot.attrs.get(&AttrName::Id).map(String::as_str) == Some(id),
                None => slot.tag == selector,
            };
            if matched {
                out.push(ElemId::new(i as u32, slot.generation));
            }
        }
        out
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    fn watch(&mut self, elem: ElemId, mask: WatchMask) -> WatchId {
        let slot = WatchSlot {
            generation: 0, // patched below
            elem,
            mask,
            queue: Vec::new(),
        };
        let (idx, generation) = if let Some(idx) = self.watch_free.pop() {
            let generation = self.watch_generations[idx].saturating_add(1);
            self.watch_generations[idx] = generation;
            self.watches[idx] = Some(WatchSlot { generation, ..slot });
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.watches.push(Some(WatchSlot { generation, ..slot }));
            self.watch_generations.push(generation);
            ((self.watches.len() - 1) as u32, generation)
        };
        WatchId::new(idx, generation)
    }

    fn unwatch(&mut self, watch: WatchId) {
        if self.watch_mut(watch).is_some() {
            self.watches[watch.idx()] = None;
            self.watch_free.push(watch.idx());
        }
    }

    fn take_batch(&mut self, watch: WatchId) -> Vec<ChangeRecord> {
        match self.watch_mut(watch) {
            Some(slot) => core::mem::take(&mut slot.queue),
            None => Vec::new(),
        }
    }

    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn replace_fragment(&mut self, fragment: Option<&str>) {
        // Replaces the current entry; history_entries must not move.
        self.fragment = fragment.map(ToString::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn write_then_read_is_synchronous() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        host.write(el, AttrName::State, Some("open"));
        assert_eq!(host.read(el, AttrName::State).as_deref(), Some("open"));
    }

    #[test]
    fn unchanged_write_records_nothing() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let w = host.watch(el, WatchMask::STATE);
        host.write(el, AttrName::State, Some("open"));
        host.write(el, AttrName::State, Some("open"));
        let batch = host.take_batch(w);
        assert_eq!(batch.len(), 1);
        // Removing an absent attribute is also a no-op.
        host.write(el, AttrName::Hidden, None);
        assert!(host.take_batch(w).is_empty());
    }

    #[test]
    fn batches_preserve_write_order_and_old_values() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let w = host.watch(el, WatchMask::STATE | WatchMask::HIDDEN);
        host.write(el, AttrName::State, Some("open"));
        host.write(el, AttrName::Hidden, Some(""));
        host.write(el, AttrName::State, Some("closed"));
        let batch = host.take_batch(w);
        assert_eq!(
            batch,
            vec![
                ChangeRecord {
                    attr: AttrName::State,
                    old: None,
                },
                ChangeRecord {
                    attr: AttrName::Hidden,
                    old: None,
                },
                ChangeRecord {
                    attr: AttrName::State,
                    old: Some("open".into()),
                },
            ]
        );
        assert!(host.take_batch(w).is_empty(), "drain must empty the queue");
    }

    #[test]
    fn mask_filters_unwatched_attributes() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let w = host.watch(el, WatchMask::HIDDEN);
        host.write(el, AttrName::State, Some("open"));
        host.write(el, AttrName::Id, Some("d1"));
        assert!(host.take_batch(w).is_empty());
        host.write(el, AttrName::Hidden, Some(""));
        assert_eq!(host.take_batch(w).len(), 1);
    }

    #[test]
    fn independent_watches_get_independent_queues() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let w1 = host.watch(el, WatchMask::STATE);
        let w2 = host.watch(el, WatchMask::STATE);
        host.write(el, AttrName::State, Some("open"));
        assert_eq!(host.take_batch(w1).len(), 1);
        assert_eq!(host.take_batch(w2).len(), 1);
    }

    #[test]
    fn unwatch_discards_queue_and_stales_handle() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let w = host.watch(el, WatchMask::STATE);
        host.write(el, AttrName::State, Some("open"));
        host.unwatch(w);
        assert!(host.take_batch(w).is_empty());
        // Slot reuse must not resurrect the old handle.
        let w2 = host.watch(el, WatchMask::STATE);
        host.write(el, AttrName::State, Some("closed"));
        assert!(host.take_batch(w).is_empty());
        assert_eq!(host.take_batch(w2).len(), 1);
    }

    #[test]
    fn select_by_tag_and_id() {
        let mut host = MemHost::new();
        let a = host.create_element("drawer");
        let b = host.create_element("drawer");
        let c = host.create_element("button");
        host.write(c, AttrName::Id, Some("toggle"));
        assert_eq!(host.select("drawer"), vec![a, b]);
        assert_eq!(host.select("button"), vec![c]);
        assert_eq!(host.select("#toggle"), vec![c]);
        assert!(host.select("#missing").is_empty());
    }

    #[test]
    fn removed_elements_go_stale_and_slots_recycle() {
        let mut host = MemHost::new();
        let a = host.create_element("drawer");
        host.remove_element(a);
        assert!(!host.is_alive(a));
        assert_eq!(host.read(a, AttrName::State), None);
        host.write(a, AttrName::State, Some("open")); // no-op
        let b = host.create_element("drawer");
        assert!(host.is_alive(b));
        assert!(!host.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn replace_fragment_never_pushes_history() {
        let mut host = MemHost::new();
        assert_eq!(host.fragment(), None);
        host.replace_fragment(Some("section-1"));
        assert_eq!(host.fragment().as_deref(), Some("section-1"));
        host.replace_fragment(Some("section-2"));
        host.replace_fragment(None);
        assert_eq!(host.fragment(), None);
        assert_eq!(host.history_entries(), 1);
    }
}
