// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawer basics.
//!
//! A single drawer with custom states, cycled through a full lap while the
//! hidden attribute tracks the state.
//!
//! Run:
//! - `cargo run -p cabinet_demos --example drawer_basics`

use cabinet_core::{Cabinet, DrawerSettings};
use cabinet_host::MemHost;

fn main() {
    let mut host = MemHost::new();
    let panel = host.create_element("drawer");

    let mut cabinet = Cabinet::new(host);
    let drawer = cabinet.create_drawer(
        panel,
        Some(DrawerSettings {
            states: vec![
                "closed".into(),
                "opening".into(),
                "open".into(),
                "closing".into(),
            ],
            hidden_states: Some(vec!["closed".into()]),
            ..Default::default()
        }),
    );

    println!("== Full lap (state / hidden) ==");
    for _ in 0..5 {
        println!(
            "  {:<8} hidden={}",
            cabinet.state(drawer).unwrap(),
            cabinet.is_hidden(drawer).unwrap(),
        );
        cabinet.cycle(drawer, None);
        cabinet.flush();
    }

    // A knob-free caller can also skip the transitional states.
    println!("== Limited cycle over closed/open ==");
    for _ in 0..2 {
        cabinet.cycle(drawer, Some(&["closed", "open"]));
        cabinet.flush();
        println!("  {}", cabinet.state(drawer).unwrap());
    }
}
