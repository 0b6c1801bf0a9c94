// Copyright 2026 the Cabinet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! URL-fragment binding: slugification and the single-slot hash protocol.
//!
//! The fragment is process-global state with at most one owner at a time.
//! Setting is last-writer-wins; clearing is ownership-checked by value —
//! a drawer removes the fragment only when it currently equals that
//! drawer's own hash, so a drawer transitioning away never wipes a slot
//! another drawer has since claimed.
//!
//! All fragment writes replace the current history entry. Toggling a
//! drawer is not navigation and must not grow the back stack.

use alloc::string::String;

use cabinet_host::Host;

/// A hash is usable once it is a non-empty string.
pub fn is_valid_hash(hash: &str) -> bool {
    !hash.is_empty()
}

/// Reduce a string to a URL-safe slug.
///
/// Lowercases; turns whitespace and hyphen runs into single hyphens; drops
/// everything that is not ASCII alphanumeric, `_`, or `-`; strips leading
/// and trailing hyphens. May produce an empty string, which callers treat
/// as "no hash".
pub fn slugify(input: &str) -> String {
    let mut out = String::new();
    let mut dash_pending = false;
    for ch in input.chars() {
        for lc in ch.to_lowercase() {
            if lc.is_whitespace() || lc == '-' {
                dash_pending = true;
            } else if lc.is_ascii_alphanumeric() || lc == '_' {
                if dash_pending && !out.is_empty() {
                    out.push('-');
                }
                dash_pending = false;
                out.push(lc);
            }
            // Anything else is dropped without leaving a separator.
        }
    }
    out
}

/// Claim the fragment for `hash`, if it is valid. Last writer wins.
pub fn set_url<H: Host>(host: &mut H, hash: &str) {
    if is_valid_hash(hash) {
        host.replace_fragment(Some(hash));
    }
}

/// Release the fragment, but only if `hash` currently owns it.
pub fn clear_url<H: Host>(host: &mut H, hash: &str) {
    if is_valid_hash(hash) && host.fragment().as_deref() == Some(hash) {
        wipe_url(host);
    }
}

/// Remove any fragment unconditionally. For controlled teardown points
/// only; everyday clearing goes through [`clear_url`].
pub fn wipe_url<H: Host>(host: &mut H) {
    host.replace_fragment(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_host::MemHost;

    #[test]
    fn slugify_rules() {
        assert_eq!(slugify("More Details"), "more-details");
        assert_eq!(slugify("  padded  out  "), "padded-out");
        assert_eq!(slugify("mixed_CASE-07"), "mixed_case-07");
        assert_eq!(slugify("a !? b"), "a-b");
        assert_eq!(slugify("--lead--trail--"), "lead-trail");
        assert_eq!(slugify("déjà vu"), "dj-vu");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn set_requires_a_valid_hash() {
        let mut host = MemHost::new();
        set_url(&mut host, "");
        assert_eq!(host.fragment(), None);
        set_url(&mut host, "section");
        assert_eq!(host.fragment().as_deref(), Some("section"));
    }

    #[test]
    fn clear_is_ownership_checked() {
        let mut host = MemHost::new();
        set_url(&mut host, "mine");
        clear_url(&mut host, "theirs");
        assert_eq!(
            host.fragment().as_deref(),
            Some("mine"),
            "clearing must not touch another owner's fragment"
        );
        clear_url(&mut host, "mine");
        assert_eq!(host.fragment(), None);
        // Clearing twice is a no-op.
        clear_url(&mut host, "mine");
        assert_eq!(host.fragment(), None);
    }

    #[test]
    fn wipe_is_unconditional() {
        let mut host = MemHost::new();
        set_url(&mut host, "anything");
        wipe_url(&mut host);
        assert_eq!(host.fragment(), None);
    }

    #[test]
    fn fragment_writes_never_push_history() {
        let mut host = MemHost::new();
        set_url(&mut host, "a");
        set_url(&mut host, "b");
        clear_url(&mut host, "b");
        wipe_url(&mut host);
        assert_eq!(host.history_entries(), 1);
    }
}
