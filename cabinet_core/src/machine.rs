// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycle math for the drawer state machine.
//!
//! A drawer's states form an ordered list; cycling advances to the next
//! entry and wraps from the last back to the first. A knob may restrict
//! cycling to a subset of the states: the candidate is computed with the
//! same wrap rule over the subset, but adopted only if it is itself a legal
//! state. The dual-list indirection lets a knob skip states without ever
//! landing on one the drawer does not have.
//!
//! These helpers are pure; the committed state lives in the host attribute
//! and is applied by [`Cabinet::set_state`](crate::Cabinet::set_state).

use alloc::string::{String, ToString};

/// Next entry after `current` in `list`, wrapping to the front.
///
/// When `current` is not a member (or the list would wrap past the end),
/// the first entry is returned. `None` only for an empty list.
pub fn wrap_next<'a, S: AsRef<str>>(list: &'a [S], current: &str) -> Option<&'a str> {
    if list.is_empty() {
        return None;
    }
    let next = match list.iter().position(|s| s.as_ref() == current) {
        Some(i) if i + 1 < list.len() => i + 1,
        _ => 0,
    };
    Some(list[next].as_ref())
}

/// Compute the state a cycle from `current` should land on.
///
/// With `limited`, the subset candidate is used only when it is a member of
/// `states`; an illegal candidate falls back to the unrestricted next
/// state. `None` only when `states` is empty (invalid construction input
/// that settings resolution never produces).
pub fn cycle_target(
    states: &[String],
    current: &str,
    limited: Option<&[&str]>,
) -> Option<String> {
    let next = wrap_next(states, current)?;
    if let Some(limited) = limited
        && let Some(candidate) = wrap_next(limited, current)
        && states.iter().any(|s| s == candidate)
    {
        return Some(candidate.to_string());
    }
    Some(next.to_string())
}
