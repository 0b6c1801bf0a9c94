// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Settings resolution: defaults, element-declared attributes, and explicit
//! caller configuration merged into one validated config per entity.
//!
//! Resolution is deterministic: defaults first, then values declared on the
//! element, then values supplied explicitly at construction. Explicit
//! settings win on conflict.
//!
//! Every validating assignment fails open: a value that does not validate
//! (a state outside `states`, a hash that slugifies to nothing) is silently
//! dropped and the prior value retained. Call sites never check a result —
//! a misconfigured drawer must still be a working drawer.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::hash::slugify;

/// Identifier generator used when a drawer's element has no `id`.
pub type IdGen = fn() -> String;

/// A knob reference in drawer settings: a host selector or a direct handle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KnobRef<E> {
    /// Resolve via [`Host::select`](cabinet_host::Host::select) at activation.
    Selector(String),
    /// An element handle to use as-is.
    Elem(E),
}

/// Caller-facing drawer configuration.
///
/// All fields are optional in spirit: the `Default` value resolves to a
/// working two-state drawer. Unset options (`None`, or an empty `states`
/// list) fall back to defaults, so construction reads naturally with struct
/// update syntax:
///
/// ```rust
/// use cabinet_core::DrawerSettings;
/// use cabinet_host::ElemId;
///
/// let settings: DrawerSettings<ElemId> = DrawerSettings {
///     hash: Some("More Details!".into()), // slugified to "more-details"
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct DrawerSettings<E> {
    /// Ordered list of states the drawer can take. The names carry no
    /// internal meaning; order defines cycle order. Empty means "use the
    /// default" (`["open", "closed"]`).
    pub states: Vec<String>,
    /// Initial state. Must be a member of `states`; anything else is
    /// ignored and the first state is used.
    pub init_state: Option<String>,
    /// States in which the drawer is considered hidden. Filtered to members
    /// of `states`. `None` defaults to `["closed"]`; `Some(vec![])`
    /// disables hiding entirely.
    pub hidden_states: Option<Vec<String>>,
    /// Hash slug claimed by this drawer. Slugified on resolution; a value
    /// that slugifies to nothing disables hash behavior.
    pub hash: Option<String>,
    /// State that claims the URL fragment when entered. Must be a
    /// non-hidden member of `states`; otherwise the first non-hidden state
    /// is used lazily.
    pub hash_state: Option<String>,
    /// Knobs to attach at activation. Strictly opt-in: there is no default
    /// knob selector.
    pub knobs: Vec<KnobRef<E>>,
    /// Whether knobs created from this drawer cycle it on click.
    pub knobs_cycle: bool,
    /// Whether knobs created from this drawer maintain aria attributes.
    pub accessibility: bool,
    /// Identifier generator. Defaults to [`pretty_uid`].
    pub uuid: Option<IdGen>,
}

impl<E> Default for DrawerSettings<E> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            init_state: None,
            hidden_states: None,
            hash: None,
            hash_state: None,
            knobs: Vec::new(),
            knobs_cycle: true,
            accessibility: true,
            uuid: None,
        }
    }
}

/// Caller-facing knob configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KnobSettings {
    /// Whether a click on this knob cycles all attached drawers.
    pub cycle: bool,
    /// Whether `aria-expanded`/`aria-controls` mirroring is maintained.
    pub accessibility: bool,
}

impl Default for KnobSettings {
    fn default() -> Self {
        Self {
            cycle: true,
            accessibility: true,
        }
    }
}

/// Validated per-drawer configuration, produced by [`resolve_drawer`].
#[derive(Clone, Debug)]
pub(crate) struct DrawerConfig {
    pub(crate) states: Vec<String>,
    pub(crate) init_state: String,
    pub(crate) hidden_states: Vec<String>,
    pub(crate) hash: String,
    hash_state: String,
    pub(crate) knobs_cycle: bool,
    pub(crate) accessibility: bool,
    pub(crate) uuid: IdGen,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        let states = vec!["open".to_string(), "closed".to_string()];
        Self {
            init_state: states[0].clone(),
            hidden_states: vec!["closed".to_string()],
            states,
            hash: String::new(),
            hash_state: String::new(),
            knobs_cycle: true,
            accessibility: true,
            uuid: pretty_uid,
        }
    }
}

impl DrawerConfig {
    fn in_states(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Whether `state` counts as hidden.
    pub(crate) fn is_hidden_state(&self, state: &str) -> bool {
        self.hidden_states.iter().any(|s| s == state)
    }

    /// The state that claims the hash slot. Falls back to the first
    /// non-hidden state when none was configured; `None` if every state is
    /// hidden.
    pub(crate) fn effective_hash_state(&self) -> Option<String> {
        if !self.hash_state.is_empty() {
            return Some(self.hash_state.clone());
        }
        self.states
            .iter()
            .find(|s| !self.is_hidden_state(s))
            .cloned()
    }

    fn set_init_state(&mut self, state: &str) {
        if self.in_states(state) {
            self.init_state = state.to_string();
        }
    }

    fn set_hidden_states(&mut self, list: Vec<String>) {
        self.hidden_states = list
            .into_iter()
            .filter(|s| self.states.iter().any(|m| m == s))
            .collect();
    }

    fn set_hash(&mut self, raw: &str) {
        let slug = slugify(raw);
        if !slug.is_empty() {
            self.hash = slug;
        }
    }

    fn set_hash_state(&mut self, state: &str) {
        if self.in_states(state) && !self.is_hidden_state(state) {
            self.hash_state = state.to_string();
        }
    }
}

/// Attribute values declared on the element, ingested once at activation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Declared {
    pub(crate) state: Option<String>,
    pub(crate) knob: Option<String>,
    pub(crate) hash: Option<String>,
    pub(crate) hash_state: Option<String>,
}

/// Merge defaults, element-declared values, and explicit settings into a
/// validated config plus the list of knobs to attach.
///
/// Explicit settings win over element-declared attributes; that includes
/// the knob list, where a non-empty explicit list replaces the declared
/// selector entirely.
pub(crate) fn resolve_drawer<E>(
    user: Option<DrawerSettings<E>>,
    decl: Declared,
) -> (DrawerConfig, Vec<KnobRef<E>>) {
    let user = user.unwrap_or_default();
    let mut cfg = DrawerConfig::default();

    // States gate everything else, so they apply first.
    if !user.states.is_empty() {
        cfg.states = user.states;
        cfg.init_state = cfg.states[0].clone();
    }
    let states = cfg.states.clone();
    cfg.hidden_states.retain(|s| states.contains(s));
    if let Some(list) = user.hidden_states {
        cfg.set_hidden_states(list);
    }

    // Element-declared values, then explicit ones on top.
    if let Some(s) = &decl.state {
        cfg.set_init_state(s);
    }
    if let Some(h) = &decl.hash {
        cfg.set_hash(h);
    }
    if let Some(hs) = &decl.hash_state {
        cfg.set_hash_state(hs);
    }
    if let Some(s) = &user.init_state {
        cfg.set_init_state(s);
    }
    if let Some(h) = &user.hash {
        cfg.set_hash(h);
    }
    if let Some(hs) = &user.hash_state {
        cfg.set_hash_state(hs);
    }

    cfg.knobs_cycle = user.knobs_cycle;
    cfg.accessibility = user.accessibility;
    if let Some(uuid) = user.uuid {
        cfg.uuid = uuid;
    }

    let mut knob_refs: Vec<KnobRef<E>> = Vec::new();
    if let Some(sel) = decl.knob
        && !sel.is_empty()
    {
        knob_refs.push(KnobRef::Selector(sel));
    }
    if !user.knobs.is_empty() {
        knob_refs = user.knobs;
    }

    (cfg, knob_refs)
}

/// Generate a pretty-unique identifier in the familiar 8-4-4-4-12 shape.
///
/// Process-unique (atomic counter fed through a splitmix finalizer), not
/// cryptographic. Embedders needing real UUIDs can supply their own
/// generator via [`DrawerSettings::uuid`].
pub fn pretty_uid() -> String {
    use core::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0x9e37_79b9_7f4a_7c15);

    fn mix(mut z: u64) -> u64 {
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    let n = COUNTER.fetch_add(0x9e37_79b9_7f4a_7c15, Ordering::Relaxed);
    let a = mix(n);
    let b = mix(n ^ 0x2545_f491_4f6c_dd1d);

    alloc::format!(
        "{:08x}-{:04x}-4{:03x}-{:x}{:03x}-{:012x}",
        (a >> 32) & 0xffff_ffff,
        (a >> 16) & 0xffff,
        a & 0x0fff,
        8 + ((b >> 62) & 0x3),
        (b >> 48) & 0x0fff,
        b & 0xffff_ffff_ffff,
    )
}
