// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One knob, many drawers.
//!
//! Two drawers attached to the same knob: a click cycles both, and the
//! knob's aria attributes mirror the drawers it controls.
//!
//! Run:
//! - `cargo run -p cabinet_demos --example knob_fanout`

use cabinet_core::{Cabinet, DrawerSettings};
use cabinet_host::{AttrName, Host, MemHost};

fn main() {
    let mut host = MemHost::new();
    let sidebar = host.create_element("drawer");
    let detail = host.create_element("drawer");
    let button = host.create_element("button");

    let mut cabinet = Cabinet::new(host);
    let settings = DrawerSettings {
        states: vec!["closed".into(), "open".into()],
        ..Default::default()
    };
    let sidebar = cabinet.create_drawer(sidebar, Some(settings.clone()));
    let detail = cabinet.create_drawer(detail, Some(settings));
    let knob = cabinet.create_knob(button, None);
    cabinet.attach(sidebar, knob);
    cabinet.attach(detail, knob);

    for round in 1..=2 {
        cabinet.click(button);
        cabinet.flush();
        println!("== After click {round} ==");
        println!("  sidebar: {}", cabinet.state(sidebar).unwrap());
        println!("  detail:  {}", cabinet.state(detail).unwrap());
        println!(
            "  knob:    aria-expanded={}",
            cabinet
                .host()
                .read(button, AttrName::AriaExpanded)
                .unwrap(),
        );
    }
}
