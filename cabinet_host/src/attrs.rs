// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The attribute vocabulary: names, watch masks, and change records.

use alloc::string::String;

/// The closed set of attributes the synchronization core reads and writes.
///
/// Values are stored as strings by the host. Presence attributes (currently
/// only [`Hidden`](Self::Hidden)) use `Some("")` for "present" and `None`
/// for "absent".
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AttrName {
    /// Current drawer state (`data-state`). Watched.
    State,
    /// Hidden presence attribute (`hidden`). Watched.
    Hidden,
    /// Stable element identifier (`id`).
    Id,
    /// Per-drawer hash slug, element-declared (`data-hash`).
    Hash,
    /// Hash-activating state, element-declared (`data-hash-state`).
    HashState,
    /// Knob selector, element-declared (`data-knob`).
    Knob,
    /// Accessibility mirror of the drawer's visibility (`aria-expanded`).
    AriaExpanded,
    /// Accessibility link from a knob to its drawer (`aria-controls`).
    AriaControls,
}

impl AttrName {
    /// The attribute's wire name, as a host targeting real markup would
    /// spell it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "data-state",
            Self::Hidden => "hidden",
            Self::Id => "id",
            Self::Hash => "data-hash",
            Self::HashState => "data-hash-state",
            Self::Knob => "data-knob",
            Self::AriaExpanded => "aria-expanded",
            Self::AriaControls => "aria-controls",
        }
    }

    /// The watch bit covering this attribute, if it is watchable at all.
    pub const fn watch_bit(self) -> Option<WatchMask> {
        match self {
            Self::State => Some(WatchMask::STATE),
            Self::Hidden => Some(WatchMask::HIDDEN),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Filter selecting which attribute changes a watch observes.
    ///
    /// Only the state and hidden attributes are observable; everything else
    /// in [`AttrName`] is either ingested once at activation or written
    /// without anything listening.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WatchMask: u8 {
        /// Observe [`AttrName::State`] changes.
        const STATE  = 0b0000_0001;
        /// Observe [`AttrName::Hidden`] changes.
        const HIDDEN = 0b0000_0010;
    }
}

impl WatchMask {
    /// Whether this mask observes changes to `attr`.
    pub fn covers(self, attr: AttrName) -> bool {
        match attr.watch_bit() {
            Some(bit) => self.contains(bit),
            None => false,
        }
    }
}

/// One observed attribute mutation.
///
/// Carries the attribute that changed and the value it had before the
/// write. The new value is deliberately absent: by the time a batch is
/// drained the attribute may have changed again, and the attribute itself
/// is the single source of truth — consumers re-read it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeRecord {
    /// Which attribute changed.
    pub attr: AttrName,
    /// The value before the change (`None` if the attribute was absent).
    pub old: Option<String>,
}
