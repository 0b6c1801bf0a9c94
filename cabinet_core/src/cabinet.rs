// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Cabinet`: drawer/knob arenas, the relationship registry, and the
//! batched action pipeline.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use cabinet_host::{AttrName, ChangeRecord, Host, WatchId, WatchMask};

use crate::hash;
use crate::machine;
use crate::settings::{self, DrawerConfig, DrawerSettings, KnobRef, KnobSettings};
use crate::types::{DrawerId, KnobId};

/// Selector used by [`Cabinet::init_all`] when none is given.
pub const DEFAULT_DRAWER_SELECTOR: &str = "drawer";

/// A caller-registered drawer action.
///
/// Invoked with every change batch drained from the drawer's watch, the
/// owning cabinet, and the drawer's id, strictly after the built-in
/// hidden-sync and hash-sync actions and in registration order.
pub type DrawerActionFn<H> = Box<dyn FnMut(&[ChangeRecord], &mut Cabinet<H>, DrawerId)>;

/// A caller-registered knob action.
///
/// Invoked with every change batch drained from one of the knob's edge
/// watches; the last parameter names the drawer whose edge produced the
/// batch. Runs after the built-in aria-sync action.
pub type KnobActionFn<H> = Box<dyn FnMut(&[ChangeRecord], &mut Cabinet<H>, KnobId, DrawerId)>;

enum DrawerAction<H: Host> {
    HiddenSync,
    HashSync,
    User(DrawerActionFn<H>),
}

enum KnobAction<H: Host> {
    AriaSync,
    User(KnobActionFn<H>),
}

struct DrawerRecord<H: Host> {
    generation: u32,
    elem: H::Elem,
    config: DrawerConfig,
    watch: WatchId,
    actions: Vec<DrawerAction<H>>,
    knobs: Vec<KnobId>,
}

struct KnobRecord<H: Host> {
    generation: u32,
    elem: H::Elem,
    settings: KnobSettings,
    actions: Vec<KnobAction<H>>,
    edges: Vec<(DrawerId, WatchId)>,
}

/// Owner of all drawers and knobs bound to one host.
///
/// Drawers and knobs live in generational arenas and are addressed by
/// [`DrawerId`]/[`KnobId`]; a side table maps element handles back to ids.
/// The committed state of a drawer is its `data-state` attribute on the
/// host — never an internal flag — so state changed by code outside this
/// API (a direct attribute edit) flows through exactly the same pipeline
/// as [`set_state`](Self::set_state).
///
/// Reactive side effects are batched: writes queue change records on the
/// host, and [`flush`](Self::flush) drains every watch and runs the
/// ordered action lists until quiescent. The one exception is activation:
/// [`create_drawer`](Self::create_drawer) reconciles the initial state
/// (hidden attribute, hash slot) synchronously so a freshly created drawer
/// is immediately coherent.
pub struct Cabinet<H: Host> {
    host: H,
    drawers: Vec<Option<DrawerRecord<H>>>,
    drawer_generations: Vec<u32>,
    drawer_free: Vec<usize>,
    knobs: Vec<Option<KnobRecord<H>>>,
    knob_generations: Vec<u32>,
    knob_free: Vec<usize>,
    drawer_lookup: BTreeMap<H::Elem, DrawerId>,
    knob_lookup: BTreeMap<H::Elem, KnobId>,
}

impl<H: Host> core::fmt::Debug for Cabinet<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let drawers_alive = self.drawers.iter().filter(|d| d.is_some()).count();
        let knobs_alive = self.knobs.iter().filter(|k| k.is_some()).count();
        f.debug_struct("Cabinet")
            .field("drawers_alive", &drawers_alive)
            .field("knobs_alive", &knobs_alive)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Cabinet<H> {
    /// Create an empty cabinet over `host`.
    pub fn new(host: H) -> Self {
        Self {
            host,
            drawers: Vec::new(),
            drawer_generations: Vec::new(),
            drawer_free: Vec::new(),
            knobs: Vec::new(),
            knob_generations: Vec::new(),
            knob_free: Vec::new(),
            drawer_lookup: BTreeMap::new(),
            knob_lookup: BTreeMap::new(),
        }
    }

    /// Shared access to the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. for direct attribute edits that
    /// the pipeline should pick up on the next [`flush`](Self::flush).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // --- activation ---

    /// Activate a drawer on `elem`, or return the one already there.
    ///
    /// Get-or-create: settings passed for an element that already has a
    /// drawer are discarded. A dead element yields [`DrawerId::INERT`].
    ///
    /// Activation ingests the element-declared attributes, resolves
    /// settings (explicit settings win), ensures the element has an `id`,
    /// applies the initial state — overridden to the hash state when the
    /// current fragment matches this drawer's hash — and attaches any
    /// configured knobs.
    pub fn create_drawer(
        &mut self,
        elem: H::Elem,
        settings: Option<DrawerSettings<H::Elem>>,
    ) -> DrawerId {
        if !self.host.is_alive(elem) {
            return DrawerId::INERT;
        }
        if let Some(id) = self.get_drawer(elem) {
            return id;
        }

        let declared = settings::Declared {
            state: self.host.read(elem, AttrName::State),
            knob: self.host.read(elem, AttrName::Knob),
            hash: self.host.read(elem, AttrName::Hash),
            hash_state: self.host.read(elem, AttrName::HashState),
        };
        let (mut config, knob_refs) = settings::resolve_drawer(settings, declared);

        if self
            .host
            .read(elem, AttrName::Id)
            .is_none_or(|v| v.is_empty())
        {
            let fresh = (config.uuid)();
            self.host.write(elem, AttrName::Id, Some(&fresh));
        }

        // A matching fragment overrides the configured initial state, once.
        if let Some(frag) = self.host.fragment()
            && hash::is_valid_hash(&frag)
            && frag == config.hash
            && let Some(hash_state) = config.effective_hash_state()
        {
            config.init_state = hash_state;
        }

        // The watch exists before the first state write so the initial
        // transition is observable like any other.
        let watch = self.host.watch(elem, WatchMask::STATE | WatchMask::HIDDEN);
        let init_state = config.init_state.clone();
        let knobs_cycle = config.knobs_cycle;
        let accessibility = config.accessibility;

        let id = self.alloc_drawer(DrawerRecord {
            generation: 0,
            elem,
            config,
            watch,
            actions: alloc::vec![DrawerAction::HiddenSync, DrawerAction::HashSync],
            knobs: Vec::new(),
        });
        self.drawer_lookup.insert(elem, id);

        // Kick things off by applying the initial state, and reconcile the
        // derived attributes synchronously so the drawer is coherent the
        // moment activation returns. Hosts elide unchanged writes, so a
        // pre-declared identical state would otherwise never reach the
        // pipeline.
        self.set_state(id, &init_state);
        let initial = [ChangeRecord {
            attr: AttrName::State,
            old: None,
        }];
        self.run_drawer_actions(id, &initial);
        // The synthetic batch above covered activation; drop the queued
        // records so the first flush only sees post-activation changes.
        let _ = self.host.take_batch(watch);

        for knob_ref in knob_refs {
            let elems = match knob_ref {
                KnobRef::Selector(sel) => self.host.select(&sel),
                KnobRef::Elem(e) => alloc::vec![e],
            };
            for knob_elem in elems {
                let knob = self.create_knob(
                    knob_elem,
                    Some(KnobSettings {
                        cycle: knobs_cycle,
                        accessibility,
                    }),
                );
                self.attach(id, knob);
            }
        }

        id
    }

    /// Activate a knob on `elem`, or return the one already there.
    ///
    /// Get-or-create with the same contract as
    /// [`create_drawer`](Self::create_drawer): settings are only applied
    /// when the knob is new; a dead element yields [`KnobId::INERT`].
    pub fn create_knob(&mut self, elem: H::Elem, settings: Option<KnobSettings>) -> KnobId {
        if !self.host.is_alive(elem) {
            return KnobId::INERT;
        }
        if let Some(id) = self.get_knob(elem) {
            return id;
        }
        let id = self.alloc_knob(KnobRecord {
            generation: 0,
            elem,
            settings: settings.unwrap_or_default(),
            actions: alloc::vec![KnobAction::AriaSync],
            edges: Vec::new(),
        });
        self.knob_lookup.insert(elem, id);
        id
    }

    /// Activate a drawer on every element matching `selector`
    /// ([`DEFAULT_DRAWER_SELECTOR`] when `None`).
    pub fn init_all(
        &mut self,
        selector: Option<&str>,
        settings: Option<DrawerSettings<H::Elem>>,
    ) -> Vec<DrawerId> {
        let elems = self.host.select(selector.unwrap_or(DEFAULT_DRAWER_SELECTOR));
        elems
            .into_iter()
            .map(|elem| self.create_drawer(elem, settings.clone()))
            .collect()
    }

    /// The drawer activated on `elem`, if any.
    pub fn get_drawer(&self, elem: H::Elem) -> Option<DrawerId> {
        let id = *self.drawer_lookup.get(&elem)?;
        self.drawer(id).map(|_| id)
    }

    /// The knob activated on `elem`, if any.
    pub fn get_knob(&self, elem: H::Elem) -> Option<KnobId> {
        let id = *self.knob_lookup.get(&elem)?;
        self.knob(id).map(|_| id)
    }

    /// Whether `id` refers to a live drawer.
    pub fn drawer_is_alive(&self, id: DrawerId) -> bool {
        self.drawer(id).is_some()
    }

    /// Whether `id` refers to a live knob.
    pub fn knob_is_alive(&self, id: KnobId) -> bool {
        self.knob(id).is_some()
    }

    // --- state machine ---

    /// Apply `state` to the drawer, if it is one of the drawer's states.
    ///
    /// The attribute is written synchronously; reactive side effects
    /// (hidden, hash, aria) run on the next [`flush`](Self::flush).
    /// Anything else — unknown state, stale or inert id — is a no-op.
    pub fn set_state(&mut self, id: DrawerId, state: &str) {
        let Some(rec) = self.drawer(id) else {
            return;
        };
        if !rec.config.states.iter().any(|s| s == state) {
            return;
        }
        let elem = rec.elem;
        self.host.write(elem, AttrName::State, Some(state));
    }

    /// The drawer's current state, read from the state attribute.
    pub fn state(&self, id: DrawerId) -> Option<String> {
        let rec = self.drawer(id)?;
        self.host.read(rec.elem, AttrName::State)
    }

    /// Whether the drawer currently carries the hidden attribute.
    pub fn is_hidden(&self, id: DrawerId) -> Option<bool> {
        let rec = self.drawer(id)?;
        Some(self.host.read(rec.elem, AttrName::Hidden).is_some())
    }

    /// Advance the drawer to its next state, wrapping at the end.
    ///
    /// With `limited`, cycle over that subset instead, falling back to the
    /// unrestricted next state whenever the subset candidate is not a
    /// legal state. See [`machine::cycle_target`].
    pub fn cycle(&mut self, id: DrawerId, limited: Option<&[&str]>) {
        let Some(rec) = self.drawer(id) else {
            return;
        };
        let current = self.host.read(rec.elem, AttrName::State).unwrap_or_default();
        let Some(target) = machine::cycle_target(&rec.config.states, &current, limited) else {
            return;
        };
        self.set_state(id, &target);
    }

    /// [`cycle`](Self::cycle) addressed by element handle.
    pub fn cycle_elem(&mut self, elem: H::Elem, limited: Option<&[&str]>) {
        if let Some(id) = self.get_drawer(elem) {
            self.cycle(id, limited);
        }
    }

    // --- actions ---

    /// Append a drawer action. Runs after the built-ins, in registration
    /// order, on every drained batch.
    pub fn add_action(
        &mut self,
        id: DrawerId,
        action: impl FnMut(&[ChangeRecord], &mut Self, DrawerId) + 'static,
    ) {
        if let Some(rec) = self.drawer_mut(id) {
            rec.actions.push(DrawerAction::User(Box::new(action)));
        }
    }

    /// Append a knob action. Runs after the built-in aria-sync, in
    /// registration order, on every batch drained from any edge.
    pub fn add_knob_action(
        &mut self,
        id: KnobId,
        action: impl FnMut(&[ChangeRecord], &mut Self, KnobId, DrawerId) + 'static,
    ) {
        if let Some(rec) = self.knob_mut(id) {
            rec.actions.push(KnobAction::User(Box::new(action)));
        }
    }

    // --- relationship registry ---

    /// Create the (drawer, knob) edge if absent. Idempotent.
    ///
    /// Starts an edge-scoped watch on the drawer's element and immediately
    /// mirrors the accessibility attributes onto the knob, so a knob
    /// attached to a hidden drawer reads `aria-expanded="false"` without
    /// waiting for a flush.
    pub fn attach(&mut self, drawer: DrawerId, knob: KnobId) {
        let Some(d_elem) = self.drawer(drawer).map(|r| r.elem) else {
            return;
        };
        if self.knob(knob).is_none() {
            return;
        }
        if self
            .drawer(drawer)
            .is_some_and(|r| r.knobs.contains(&knob))
        {
            return; // duplicate edge
        }
        let watch = self.host.watch(d_elem, WatchMask::STATE | WatchMask::HIDDEN);
        if let Some(rec) = self.drawer_mut(drawer) {
            rec.knobs.push(knob);
        }
        if let Some(rec) = self.knob_mut(knob) {
            rec.edges.push((drawer, watch));
        }
        self.mirror_aria_expanded(knob, drawer);
        self.mirror_aria_controls(knob, drawer);
    }

    /// Remove the (drawer, knob) edge, releasing its watch.
    ///
    /// Either side may initiate, including while the other is being torn
    /// down; both sides' bookkeeping is cleaned regardless. Detaching an
    /// edge that does not exist is a no-op, so calling twice is safe.
    pub fn detach(&mut self, drawer: DrawerId, knob: KnobId) {
        let mut edge_watch = None;
        if let Some(rec) = self.knob_mut(knob)
            && let Some(pos) = rec.edges.iter().position(|(d, _)| *d == drawer)
        {
            edge_watch = Some(rec.edges.remove(pos).1);
        }
        if let Some(watch) = edge_watch {
            self.host.unwatch(watch);
        }
        if let Some(rec) = self.drawer_mut(drawer) {
            rec.knobs.retain(|k| *k != knob);
        }
    }

    /// Knobs currently attached to the drawer.
    pub fn knobs_of(&self, id: DrawerId) -> Vec<KnobId> {
        self.drawer(id).map(|r| r.knobs.clone()).unwrap_or_default()
    }

    /// Drawers currently attached to the knob.
    pub fn drawers_of(&self, id: KnobId) -> Vec<DrawerId> {
        self.knob(id)
            .map(|r| r.edges.iter().map(|(d, _)| *d).collect())
            .unwrap_or_default()
    }

    /// Handle a click on the knob: full-state cycle of every attached
    /// drawer, if this knob cycles at all.
    pub fn handle_click(&mut self, id: KnobId) {
        let Some(rec) = self.knob(id) else {
            return;
        };
        if !rec.settings.cycle {
            return;
        }
        let targets: Vec<DrawerId> = rec.edges.iter().map(|(d, _)| *d).collect();
        for drawer in targets {
            self.cycle(drawer, None);
        }
    }

    /// [`handle_click`](Self::handle_click) addressed by element handle.
    pub fn click(&mut self, elem: H::Elem) {
        if let Some(id) = self.get_knob(elem) {
            self.handle_click(id);
        }
    }

    // --- lifecycle ---

    /// Destroy a drawer: detach every knob edge, release the drawer's own
    /// watch, and free the slot. The element itself is untouched.
    pub fn destroy_drawer(&mut self, id: DrawerId) {
        let Some(rec) = self.drawer(id) else {
            return;
        };
        let elem = rec.elem;
        let watch = rec.watch;
        let knobs = rec.knobs.clone();
        for knob in knobs {
            self.detach(id, knob);
        }
        self.host.unwatch(watch);
        self.drawer_lookup.remove(&elem);
        self.drawers[id.idx()] = None;
        self.drawer_free.push(id.idx());
    }

    /// Destroy a knob: detach it from every drawer and free the slot.
    pub fn destroy_knob(&mut self, id: KnobId) {
        let Some(rec) = self.knob(id) else {
            return;
        };
        let elem = rec.elem;
        let drawers: Vec<DrawerId> = rec.edges.iter().map(|(d, _)| *d).collect();
        for drawer in drawers {
            self.detach(drawer, id);
        }
        self.knob_lookup.remove(&elem);
        self.knobs[id.idx()] = None;
        self.knob_free.push(id.idx());
    }

    // --- hash binding ---

    /// Unconditionally remove any URL fragment. See [`hash::wipe_url`].
    pub fn wipe_url(&mut self) {
        hash::wipe_url(&mut self.host);
    }

    // --- delivery ---

    /// Drain every watch and run the action pipelines until quiescent.
    ///
    /// Per drawer, actions run in registration order against each drained
    /// batch; different edges are drained independently with no cross-edge
    /// ordering guarantee. Actions that write attributes (hidden-sync,
    /// aria-sync) queue further records, which are delivered within the
    /// same call; termination relies on hosts eliding unchanged writes.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    pub fn flush(&mut self) {
        loop {
            let mut progressed = false;
            for idx in 0..self.drawers.len() {
                let Some((id, watch)) = self.drawers[idx]
                    .as_ref()
                    .map(|r| (DrawerId::new(idx as u32, r.generation), r.watch))
                else {
                    continue;
                };
                let batch = self.host.take_batch(watch);
                if batch.is_empty() {
                    continue;
                }
                progressed = true;
                self.run_drawer_actions(id, &batch);
            }
            for idx in 0..self.knobs.len() {
                let Some((id, edges)) = self.knobs[idx]
                    .as_ref()
                    .map(|r| (KnobId::new(idx as u32, r.generation), r.edges.clone()))
                else {
                    continue;
                };
                for (drawer, watch) in edges {
                    let batch = self.host.take_batch(watch);
                    if batch.is_empty() {
                        continue;
                    }
                    progressed = true;
                    self.run_knob_actions(id, drawer, &batch);
                }
            }
            if !progressed {
                break;
            }
        }
    }

    // --- internals ---

    fn drawer(&self, id: DrawerId) -> Option<&DrawerRecord<H>> {
        let rec = self.drawers.get(id.idx())?.as_ref()?;
        (rec.generation == id.1).then_some(rec)
    }

    fn drawer_mut(&mut self, id: DrawerId) -> Option<&mut DrawerRecord<H>> {
        let rec = self.drawers.get_mut(id.idx())?.as_mut()?;
        (rec.generation == id.1).then_some(rec)
    }

    fn knob(&self, id: KnobId) -> Option<&KnobRecord<H>> {
        let rec = self.knobs.get(id.idx())?.as_ref()?;
        (rec.generation == id.1).then_some(rec)
    }

    fn knob_mut(&mut self, id: KnobId) -> Option<&mut KnobRecord<H>> {
        let rec = self.knobs.get_mut(id.idx())?.as_mut()?;
        (rec.generation == id.1).then_some(rec)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    fn alloc_drawer(&mut self, mut rec: DrawerRecord<H>) -> DrawerId {
        if let Some(idx) = self.drawer_free.pop() {
            let generation = self.drawer_generations[idx].saturating_add(1);
            self.drawer_generations[idx] = generation;
            rec.generation = generation;
            self.drawers[idx] = Some(rec);
            DrawerId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            rec.generation = generation;
            self.drawers.push(Some(rec));
            self.drawer_generations.push(generation);
            DrawerId::new((self.drawers.len() - 1) as u32, generation)
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Arena indices are 32-bit by construction."
    )]
    fn alloc_knob(&mut self, mut rec: KnobRecord<H>) -> KnobId {
        if let Some(idx) = self.knob_free.pop() {
            let generation = self.knob_generations[idx].saturating_add(1);
            self.knob_generations[idx] = generation;
            rec.generation = generation;
            self.knobs[idx] = Some(rec);
            KnobId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            rec.generation = generation;
            self.knobs.push(Some(rec));
            self.knob_generations.push(generation);
            KnobId::new((self.knobs.len() - 1) as u32, generation)
        }
    }

    fn run_drawer_actions(&mut self, id: DrawerId, batch: &[ChangeRecord]) {
        let Some(rec) = self.drawer_mut(id) else {
            return;
        };
        let mut actions = core::mem::take(&mut rec.actions);
        for action in actions.iter_mut() {
            match action {
                DrawerAction::HiddenSync => self.sync_hidden(id, batch),
                DrawerAction::HashSync => self.sync_hash(id, batch),
                DrawerAction::User(f) => f(batch, self, id),
            }
        }
        // Put the list back, keeping anything registered during dispatch.
        if let Some(rec) = self.drawer_mut(id) {
            let appended = core::mem::take(&mut rec.actions);
            actions.extend(appended);
            rec.actions = actions;
        }
    }

    fn run_knob_actions(&mut self, id: KnobId, drawer: DrawerId, batch: &[ChangeRecord]) {
        let Some(rec) = self.knob_mut(id) else {
            return;
        };
        let mut actions = core::mem::take(&mut rec.actions);
        for action in actions.iter_mut() {
            match action {
                KnobAction::AriaSync => {
                    if batch.iter().any(|r| r.attr == AttrName::Hidden) {
                        self.mirror_aria_expanded(id, drawer);
                    }
                }
                KnobAction::User(f) => f(batch, self, id, drawer),
            }
        }
        if let Some(rec) = self.knob_mut(id) {
            let appended = core::mem::take(&mut rec.actions);
            actions.extend(appended);
            rec.actions = actions;
        }
    }

    /// Built-in: couple the hidden attribute to the committed state.
    fn sync_hidden(&mut self, id: DrawerId, batch: &[ChangeRecord]) {
        if !batch.iter().any(|r| r.attr == AttrName::State) {
            return;
        }
        let Some(rec) = self.drawer(id) else {
            return;
        };
        let elem = rec.elem;
        let hidden = match self.host.read(elem, AttrName::State) {
            Some(state) => rec.config.is_hidden_state(&state),
            None => false,
        };
        self.host
            .write(elem, AttrName::Hidden, if hidden { Some("") } else { None });
    }

    /// Built-in: claim or release the hash slot on state transitions.
    fn sync_hash(&mut self, id: DrawerId, batch: &[ChangeRecord]) {
        if !batch.iter().any(|r| r.attr == AttrName::State) {
            return;
        }
        let Some(rec) = self.drawer(id) else {
            return;
        };
        let elem = rec.elem;
        let drawer_hash = rec.config.hash.clone();
        let hash_state = rec.config.effective_hash_state();
        let state = self.host.read(elem, AttrName::State);
        if state.is_some() && state == hash_state {
            hash::set_url(&mut self.host, &drawer_hash);
        } else {
            hash::clear_url(&mut self.host, &drawer_hash);
        }
    }

    fn mirror_aria_expanded(&mut self, knob: KnobId, drawer: DrawerId) {
        let Some(k) = self.knob(knob) else {
            return;
        };
        if !k.settings.accessibility {
            return;
        }
        let k_elem = k.elem;
        let Some(d) = self.drawer(drawer) else {
            return;
        };
        let hidden = self.host.read(d.elem, AttrName::Hidden).is_some();
        let expanded = if hidden { "false" } else { "true" };
        self.host.write(k_elem, AttrName::AriaExpanded, Some(expanded));
    }

    fn mirror_aria_controls(&mut self, knob: KnobId, drawer: DrawerId) {
        let Some(k) = self.knob(knob) else {
            return;
        };
        if !k.settings.accessibility {
            return;
        }
        let k_elem = k.elem;
        let Some(d) = self.drawer(drawer) else {
            return;
        };
        if let Some(drawer_id) = self.host.read(d.elem, AttrName::Id) {
            self.host
                .write(k_elem, AttrName::AriaControls, Some(&drawer_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use cabinet_host::{ElemId, MemHost};
    use core::cell::RefCell;

    fn two_state() -> DrawerSettings<ElemId> {
        DrawerSettings {
            states: vec!["closed".into(), "open".into()],
            ..Default::default()
        }
    }

    fn new_cabinet() -> (Cabinet<MemHost>, ElemId) {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        (Cabinet::new(host), el)
    }

    #[test]
    fn closed_open_scenario() {
        // states=["closed","open"], hiddenStates default, initState unset.
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(el, Some(two_state()));
        assert_eq!(cab.state(d).as_deref(), Some("closed"));
        assert_eq!(cab.is_hidden(d), Some(true), "activation reconciles hidden");

        cab.cycle(d, None);
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("open"));
        assert_eq!(cab.is_hidden(d), Some(false));
    }

    #[test]
    fn set_state_outside_states_is_a_no_op() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(el, Some(two_state()));
        cab.set_state(d, "ajar");
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("closed"));
        assert_eq!(cab.is_hidden(d), Some(true));
    }

    #[test]
    fn direct_attribute_edits_drive_the_pipeline() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(el, Some(two_state()));
        // Not through the API: someone else flips the attribute.
        cab.host_mut().write(el, AttrName::State, Some("open"));
        cab.flush();
        assert_eq!(cab.is_hidden(d), Some(false));
        assert_eq!(
            cab.host().read(el, AttrName::Hidden),
            None,
            "hidden attribute must track externally-written state"
        );
    }

    #[test]
    fn repeated_cycles_lap_the_state_list() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                states: vec!["a".into(), "b".into(), "c".into()],
                hidden_states: Some(vec![]),
                ..Default::default()
            }),
        );
        let mut seen = vec![cab.state(d).unwrap()];
        for _ in 0..3 {
            cab.cycle(d, None);
            cab.flush();
            seen.push(cab.state(d).unwrap());
        }
        assert_eq!(seen, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn limited_cycle_from_a_knob_free_call() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                states: vec!["closed".into(), "opening".into(), "open".into()],
                ..Default::default()
            }),
        );
        cab.cycle(d, Some(&["closed", "open"]));
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("open"));
        // Illegal candidate: falls back to the unrestricted next (wraps).
        cab.cycle(d, Some(&["open", "nonsense"]));
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("closed"));
    }

    #[test]
    fn get_or_create_discards_new_settings() {
        let (mut cab, el) = new_cabinet();
        let d1 = cab.create_drawer(el, Some(two_state()));
        let d2 = cab.create_drawer(
            el,
            Some(DrawerSettings {
                states: vec!["x".into(), "y".into()],
                ..Default::default()
            }),
        );
        assert_eq!(d1, d2);
        cab.set_state(d2, "x"); // from the discarded settings; must not apply
        cab.flush();
        assert_eq!(cab.state(d1).as_deref(), Some("closed"));
    }

    #[test]
    fn declared_initial_state_wins_over_default_but_not_explicit() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        host.write(el, AttrName::State, Some("open"));
        let mut cab = Cabinet::new(host);
        let d = cab.create_drawer(el, Some(two_state()));
        assert_eq!(cab.state(d).as_deref(), Some("open"));
        assert_eq!(cab.is_hidden(d), Some(false), "pre-declared state still reconciles");

        let el2 = cab.host_mut().create_element("drawer");
        cab.host_mut().write(el2, AttrName::State, Some("open"));
        let d2 = cab.create_drawer(
            el2,
            Some(DrawerSettings {
                init_state: Some("closed".into()),
                ..two_state()
            }),
        );
        assert_eq!(cab.state(d2).as_deref(), Some("closed"));
    }

    #[test]
    fn activation_assigns_an_element_id() {
        let (mut cab, el) = new_cabinet();
        cab.create_drawer(el, None);
        let id = cab.host().read(el, AttrName::Id);
        assert!(id.is_some_and(|v| !v.is_empty()));
    }

    #[test]
    fn inert_handles_no_op_everywhere() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        host.remove_element(el);
        let mut cab = Cabinet::new(host);
        let d = cab.create_drawer(el, None);
        assert!(d.is_inert());
        // Chained calls must degrade, never panic.
        cab.set_state(d, "open");
        cab.cycle(d, None);
        cab.flush();
        assert_eq!(cab.state(d), None);
        assert_eq!(cab.is_hidden(d), None);
        let k = cab.create_knob(el, None);
        assert!(k.is_inert());
        cab.attach(d, k);
        cab.detach(d, k);
        cab.handle_click(k);
        assert!(cab.knobs_of(d).is_empty());
        assert!(cab.drawers_of(k).is_empty());
    }

    #[test]
    fn attach_is_idempotent_and_detach_is_safe_twice() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(el, Some(two_state()));
        let k = cab.create_knob(btn, None);
        cab.attach(d, k);
        cab.attach(d, k);
        assert_eq!(cab.knobs_of(d), vec![k]);
        assert_eq!(cab.drawers_of(k), vec![d]);
        cab.detach(d, k);
        cab.detach(d, k);
        assert!(cab.knobs_of(d).is_empty());
        assert!(cab.drawers_of(k).is_empty());
    }

    #[test]
    fn aria_mirrors_on_attach_and_on_hidden_changes() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(el, Some(two_state())); // starts hidden
        let k = cab.create_knob(btn, None);
        cab.attach(d, k);
        assert_eq!(
            cab.host().read(btn, AttrName::AriaExpanded).as_deref(),
            Some("false"),
            "mirror must be immediate on attach"
        );
        let controls = cab.host().read(btn, AttrName::AriaControls);
        assert_eq!(controls, cab.host().read(el, AttrName::Id));

        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(
            cab.host().read(btn, AttrName::AriaExpanded).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn accessibility_off_leaves_aria_untouched() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(el, Some(two_state()));
        let k = cab.create_knob(
            btn,
            Some(KnobSettings {
                accessibility: false,
                ..Default::default()
            }),
        );
        cab.attach(d, k);
        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(cab.host().read(btn, AttrName::AriaExpanded), None);
        assert_eq!(cab.host().read(btn, AttrName::AriaControls), None);
    }

    #[test]
    fn declared_knob_selector_attaches_and_clicks_cycle() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        let btn = host.create_element("button");
        host.write(el, AttrName::Knob, Some("button"));
        let mut cab = Cabinet::new(host);
        let d = cab.create_drawer(el, Some(two_state()));

        let k = cab.get_knob(btn).expect("knob from data-knob selector");
        assert_eq!(cab.drawers_of(k), vec![d]);

        cab.click(btn);
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("open"));
        assert_eq!(
            cab.host().read(btn, AttrName::AriaExpanded).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn knob_fan_out_cycles_every_attached_drawer() {
        let mut host = MemHost::new();
        let el1 = host.create_element("drawer");
        let el2 = host.create_element("drawer");
        let btn = host.create_element("button");
        let mut cab = Cabinet::new(host);
        let d1 = cab.create_drawer(el1, Some(two_state()));
        let d2 = cab.create_drawer(el2, Some(two_state()));
        let k = cab.create_knob(btn, None);
        cab.attach(d1, k);
        cab.attach(d2, k);
        cab.handle_click(k);
        cab.flush();
        assert_eq!(cab.state(d1).as_deref(), Some("open"));
        assert_eq!(cab.state(d2).as_deref(), Some("open"));
    }

    #[test]
    fn non_cycling_knob_ignores_clicks() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                knobs_cycle: false,
                knobs: vec![KnobRef::Elem(btn)],
                ..two_state()
            }),
        );
        let k = cab.get_knob(btn).expect("knob from settings");
        cab.handle_click(k);
        cab.flush();
        assert_eq!(cab.state(d).as_deref(), Some("closed"));
    }

    #[test]
    fn hash_ownership_last_writer_wins() {
        let mut host = MemHost::new();
        let el_a = host.create_element("drawer");
        let el_b = host.create_element("drawer");
        let mut cab = Cabinet::new(host);
        let a = cab.create_drawer(
            el_a,
            Some(DrawerSettings {
                hash: Some("foo".into()),
                ..two_state()
            }),
        );
        let b = cab.create_drawer(
            el_b,
            Some(DrawerSettings {
                hash: Some("bar".into()),
                ..two_state()
            }),
        );

        cab.set_state(a, "open"); // "open" is A's effective hash state
        cab.flush();
        assert_eq!(cab.host().fragment().as_deref(), Some("foo"));

        cab.set_state(b, "open");
        cab.flush();
        assert_eq!(cab.host().fragment().as_deref(), Some("bar"));

        cab.set_state(a, "closed");
        cab.flush();
        assert_eq!(
            cab.host().fragment().as_deref(),
            Some("bar"),
            "A no longer owns the fragment and must not clear it"
        );

        cab.set_state(b, "closed");
        cab.flush();
        assert_eq!(cab.host().fragment(), None);
        assert_eq!(cab.host().history_entries(), 1);
    }

    #[test]
    fn empty_hash_disables_fragment_behavior() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(el, Some(two_state()));
        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(cab.host().fragment(), None);
    }

    #[test]
    fn matching_fragment_overrides_initial_state() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        host.replace_fragment(Some("details"));
        let mut cab = Cabinet::new(host);
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                hash: Some("details".into()),
                ..two_state() // init would otherwise resolve to "closed"
            }),
        );
        assert_eq!(cab.state(d).as_deref(), Some("open"));
        assert_eq!(cab.is_hidden(d), Some(false));
        assert_eq!(cab.host().fragment().as_deref(), Some("details"));
    }

    #[test]
    fn non_matching_fragment_leaves_initial_state_alone() {
        let mut host = MemHost::new();
        let el = host.create_element("drawer");
        host.replace_fragment(Some("elsewhere"));
        let mut cab = Cabinet::new(host);
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                hash: Some("details".into()),
                ..two_state()
            }),
        );
        assert_eq!(cab.state(d).as_deref(), Some("closed"));
        assert_eq!(cab.host().fragment().as_deref(), Some("elsewhere"));
    }

    #[test]
    fn user_actions_run_after_builtins_in_registration_order() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(el, Some(two_state()));
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        cab.add_action(d, move |batch, cab, id| {
            if batch.iter().any(|r| r.attr == AttrName::State) {
                // Hidden-sync already ran for this batch.
                let hidden = cab.is_hidden(id).unwrap();
                log_a.borrow_mut().push(alloc::format!("a:hidden={hidden}"));
            }
        });
        let log_b = Rc::clone(&log);
        cab.add_action(d, move |batch, _, _| {
            if batch.iter().any(|r| r.attr == AttrName::State) {
                log_b.borrow_mut().push("b".to_string());
            }
        });

        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(log.borrow().as_slice(), &["a:hidden=false", "b"]);
    }

    #[test]
    fn destroy_drawer_detaches_edges_and_stales_the_id() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(el, Some(two_state()));
        let k = cab.create_knob(btn, None);
        cab.attach(d, k);

        cab.destroy_drawer(d);
        assert!(!cab.drawer_is_alive(d));
        assert_eq!(cab.get_drawer(el), None);
        assert!(cab.drawers_of(k).is_empty(), "knob side must be cleaned");

        // The old watch is gone: further attribute churn reaches nobody.
        cab.host_mut().write(el, AttrName::State, Some("open"));
        cab.flush();
        assert_eq!(
            cab.host().read(btn, AttrName::AriaExpanded).as_deref(),
            Some("false"),
            "detached knob must stop mirroring"
        );

        // Slot reuse must not resurrect the stale id.
        let el2 = cab.host_mut().create_element("drawer");
        let d2 = cab.create_drawer(el2, Some(two_state()));
        assert!(cab.drawer_is_alive(d2));
        assert!(!cab.drawer_is_alive(d));
        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(cab.state(d2).as_deref(), Some("closed"));
    }

    #[test]
    fn destroy_knob_cleans_both_sides() {
        let (mut cab, el) = new_cabinet();
        let btn = cab.host_mut().create_element("button");
        let d = cab.create_drawer(el, Some(two_state()));
        let k = cab.create_knob(btn, None);
        cab.attach(d, k);
        cab.destroy_knob(k);
        assert!(!cab.knob_is_alive(k));
        assert!(cab.knobs_of(d).is_empty());
        assert_eq!(cab.get_knob(btn), None);
    }

    #[test]
    fn init_all_activates_matching_elements() {
        let mut host = MemHost::new();
        let e1 = host.create_element("drawer");
        let e2 = host.create_element("drawer");
        let _other = host.create_element("section");
        let mut cab = Cabinet::new(host);
        let ids = cab.init_all(None, Some(two_state()));
        assert_eq!(ids.len(), 2);
        assert_eq!(cab.get_drawer(e1), Some(ids[0]));
        assert_eq!(cab.get_drawer(e2), Some(ids[1]));
        // Idempotent: a second pass returns the same drawers.
        let again = cab.init_all(None, None);
        assert_eq!(again, ids);
    }

    #[test]
    fn wipe_url_is_unconditional() {
        let (mut cab, el) = new_cabinet();
        let d = cab.create_drawer(
            el,
            Some(DrawerSettings {
                hash: Some("slot".into()),
                ..two_state()
            }),
        );
        cab.set_state(d, "open");
        cab.flush();
        assert_eq!(cab.host().fragment().as_deref(), Some("slot"));
        cab.wipe_url();
        assert_eq!(cab.host().fragment(), None);
    }
}
