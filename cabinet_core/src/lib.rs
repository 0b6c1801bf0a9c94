// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cabinet: state synchronization for disclosure widgets.
//!
//! ## Overview
//!
//! A *drawer* is a widget with a named state drawn from an ordered list
//! (`"open"`/`"closed"` by default, but any names in any number). A *knob*
//! is a control that operates drawers. This crate keeps the pieces in sync:
//! the committed state lives in an attribute on a [`Host`] element, and
//! everything derived from it — the hidden attribute, `aria-expanded` and
//! `aria-controls` on attached knobs, the single URL-fragment slot — is
//! reconciled by an action pipeline that runs off batched change records.
//!
//! Because the source of truth is the attribute itself, state changed
//! behind the API's back (a direct attribute write by other code) flows
//! through the exact same pipeline as [`Cabinet::set_state`]. Call
//! [`Cabinet::flush`] to drain pending batches and run actions to
//! quiescence.
//!
//! Drawers and knobs are many-to-many: one knob can fan out to several
//! drawers and one drawer can be driven by several knobs, with edges
//! managed by [`Cabinet::attach`] and [`Cabinet::detach`].
//!
//! The error contract is fail-open throughout. Constructors handed a dead
//! element return an inert id that no-ops everywhere; invalid settings fall
//! back to defaults; an unknown state passed to `set_state` is ignored.
//! A misconfigured drawer is still a working drawer.
//!
//! # Example
//!
//! ```rust
//! use cabinet_core::{Cabinet, DrawerSettings};
//! use cabinet_host::MemHost;
//!
//! let mut host = MemHost::new();
//! let panel = host.create_element("drawer");
//! let button = host.create_element("button");
//!
//! let mut cabinet = Cabinet::new(host);
//! let drawer = cabinet.create_drawer(
//!     panel,
//!     Some(DrawerSettings {
//!         states: vec!["closed".into(), "open".into()],
//!         ..Default::default()
//!     }),
//! );
//! let knob = cabinet.create_knob(button, None);
//! cabinet.attach(drawer, knob);
//!
//! assert_eq!(cabinet.state(drawer).as_deref(), Some("closed"));
//! assert_eq!(cabinet.is_hidden(drawer), Some(true));
//!
//! // A click cycles every attached drawer; flush runs the side effects.
//! cabinet.click(button);
//! cabinet.flush();
//! assert_eq!(cabinet.state(drawer).as_deref(), Some("open"));
//! assert_eq!(cabinet.is_hidden(drawer), Some(false));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod cabinet;
pub mod hash;
pub mod machine;
pub mod settings;
pub mod types;

pub use cabinet::{Cabinet, DrawerActionFn, KnobActionFn, DEFAULT_DRAWER_SELECTOR};
pub use cabinet_host::Host;
pub use hash::{is_valid_hash, slugify};
pub use settings::{pretty_uid, DrawerSettings, IdGen, KnobRef, KnobSettings};
pub use types::{DrawerId, KnobId};
