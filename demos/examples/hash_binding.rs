// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! URL-fragment binding.
//!
//! Two drawers share the single fragment slot: the last one to enter its
//! hash state owns it, clearing is ownership-checked, and a matching
//! fragment at activation deep-links the drawer open.
//!
//! Run:
//! - `cargo run -p cabinet_demos --example hash_binding`

use cabinet_core::{Cabinet, DrawerSettings};
use cabinet_host::{Host, MemHost};

fn settings(hash: &str) -> DrawerSettings<cabinet_host::ElemId> {
    DrawerSettings {
        states: vec!["closed".into(), "open".into()],
        hash: Some(hash.into()),
        ..Default::default()
    }
}

fn main() {
    let mut host = MemHost::new();
    let faq = host.create_element("drawer");
    let terms = host.create_element("drawer");
    // Simulate arriving at a deep link.
    host.replace_fragment(Some("faq"));

    let mut cabinet = Cabinet::new(host);
    let faq = cabinet.create_drawer(faq, Some(settings("faq")));
    let terms = cabinet.create_drawer(terms, Some(settings("terms")));

    println!("== After activation (fragment was #faq) ==");
    println!("  faq:      {}", cabinet.state(faq).unwrap());
    println!("  terms:    {}", cabinet.state(terms).unwrap());
    println!("  fragment: {:?}", cabinet.host().fragment());

    cabinet.set_state(terms, "open");
    cabinet.flush();
    println!("== terms opened (last writer wins) ==");
    println!("  fragment: {:?}", cabinet.host().fragment());

    cabinet.set_state(faq, "closed");
    cabinet.flush();
    println!("== faq closed (does not own the slot, no change) ==");
    println!("  fragment: {:?}", cabinet.host().fragment());

    cabinet.set_state(terms, "closed");
    cabinet.flush();
    println!("== terms closed (owner releases) ==");
    println!("  fragment: {:?}", cabinet.host().fragment());
    println!("  history entries: {}", cabinet.host().history_entries());
}
