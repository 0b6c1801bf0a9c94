// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cabinet Host: an observable attribute source for disclosure widgets.
//!
//! ## Overview
//!
//! This crate defines the boundary between the Cabinet synchronization core
//! and whatever actually owns the widgets — a DOM, a retained-mode UI, or a
//! test harness. The core never touches elements directly; it reads and
//! writes a small, closed vocabulary of attributes ([`AttrName`]) through the
//! [`Host`] trait and observes changes through watches.
//!
//! A watch is a subscription to one element, filtered by a [`WatchMask`].
//! Writes that change a stored value enqueue a [`ChangeRecord`] on every
//! covering watch; the record carries the attribute and its previous value.
//! Delivery is pull-based: the owner drains a watch with
//! [`Host::take_batch`] whenever it is ready to run side effects. This keeps
//! the write itself synchronous (a read immediately after a write sees the
//! new value) while reactive work stays batched, mirroring how
//! mutation-observer callbacks are queued behind the mutation that caused
//! them.
//!
//! Writes that do not change the stored value record nothing. Hosts must
//! uphold this: pipelines that re-derive attributes on every batch rely on
//! it to reach quiescence.
//!
//! The crate also ships [`MemHost`], an in-memory reference host backed by a
//! generational element arena. It is the host used by the test suites and
//! the demos, and doubles as documentation of the exact semantics a real
//! host has to provide.
//!
//! # Example
//!
//! ```rust
//! use cabinet_host::{AttrName, Host, MemHost, WatchMask};
//!
//! let mut host = MemHost::new();
//! let el = host.create_element("drawer");
//! let watch = host.watch(el, WatchMask::STATE | WatchMask::HIDDEN);
//!
//! host.write(el, AttrName::State, Some("open"));
//! assert_eq!(host.read(el, AttrName::State).as_deref(), Some("open"));
//!
//! // The change is observable as a batch, after the fact.
//! let batch = host.take_batch(watch);
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch[0].attr, AttrName::State);
//! assert_eq!(batch[0].old, None);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod attrs;
pub mod host;
pub mod mem;

pub use attrs::{AttrName, ChangeRecord, WatchMask};
pub use host::{Host, WatchId};
pub use mem::{ElemId, MemHost};
