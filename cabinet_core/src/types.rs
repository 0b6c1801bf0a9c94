// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public identifier types for drawers and knobs.

/// Identifier for a drawer owned by a [`Cabinet`](crate::Cabinet).
///
/// A small, copyable handle consisting of a slot index and a generation
/// counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On destruction, the slot is freed; any existing `DrawerId` pointing at
///   it is now stale.
/// - On reuse of a freed slot, the generation is incremented, producing a
///   new, distinct `DrawerId`. Stale ids never alias a live drawer because
///   the generation must match.
///
/// ### Inert ids
///
/// [`DrawerId::INERT`] is a reserved handle returned by constructors given a
/// dead element. It is never live; every operation addressed at it is a
/// no-op and every accessor returns `None`. This lets call sites chain
/// operations without checking — disclosure widgets degrade, they do not
/// crash.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DrawerId(pub(crate) u32, pub(crate) u32);

impl DrawerId {
    /// The reserved non-functional handle. See the type docs.
    pub const INERT: Self = Self(u32::MAX, 0);

    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the reserved inert handle.
    pub const fn is_inert(self) -> bool {
        self.0 == u32::MAX && self.1 == 0
    }
}

/// Identifier for a knob owned by a [`Cabinet`](crate::Cabinet).
///
/// Same generational semantics as [`DrawerId`], including the reserved
/// [`KnobId::INERT`] handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct KnobId(pub(crate) u32, pub(crate) u32);

impl KnobId {
    /// The reserved non-functional handle. See [`DrawerId::INERT`].
    pub const INERT: Self = Self(u32::MAX, 0);

    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the reserved inert handle.
    pub const fn is_inert(self) -> bool {
        self.0 == u32::MAX && self.1 == 0
    }
}
