// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prim path identity.
//!
//! [`PrimPath`] is an absolute, slash-delimited identifier into the composed
//! stage (`/root/group/shape`). Paths are the join key between the stage and
//! the host graph: every table entry, context entry, and serialized record is
//! keyed by one.
//!
//! Paths are totally ordered by their string form. Because `/` sorts below
//! every identifier character, lexicographic order places each ancestor
//! before all of its descendants, which the engine relies on when processing
//! classification sets root-downward.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// An absolute, slash-delimited path to a prim in the composed stage.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimPath(String);

impl PrimPath {
    /// The pseudo-root path `/`, parent of every top-level prim.
    #[must_use]
    pub fn absolute_root() -> Self {
        Self("/".to_owned())
    }

    /// Creates a path from its string form.
    ///
    /// Trailing slashes are stripped, so `/a/b/` and `/a/b` are the same
    /// path.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not absolute or contains an empty component.
    #[must_use]
    pub fn new(path: &str) -> Self {
        assert!(path.starts_with('/'), "prim path must be absolute: {path:?}");
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        assert!(
            !trimmed[1..].split('/').any(str::is_empty) || trimmed == "/",
            "prim path has an empty component: {path:?}"
        );
        Self(trimmed.to_owned())
    }

    /// Returns the string form of the path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the pseudo-root `/`.
    #[must_use]
    pub fn is_absolute_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the final path component, or `""` for the pseudo-root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Returns the parent path, or `None` for the pseudo-root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_absolute_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::absolute_root()),
            Some(idx) => Some(Self(self.0[..idx].to_owned())),
            None => None,
        }
    }

    /// Appends a child component.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or contains `/`.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        assert!(
            !name.is_empty() && !name.contains('/'),
            "invalid path component: {name:?}"
        );
        if self.is_absolute_root() {
            Self(alloc::format!("/{name}"))
        } else {
            Self(alloc::format!("{}/{name}", self.0))
        }
    }

    /// Returns whether `self` equals `ancestor` or lies beneath it.
    ///
    /// The pseudo-root is a prefix of every path.
    #[must_use]
    pub fn has_prefix(&self, ancestor: &Self) -> bool {
        if ancestor.is_absolute_root() {
            return true;
        }
        self.0 == ancestor.0
            || (self.0.len() > ancestor.0.len()
                && self.0.starts_with(&ancestor.0)
                && self.0.as_bytes()[ancestor.0.len()] == b'/')
    }

    /// Returns every path from the first component down to `self`, in
    /// root-downward order. The pseudo-root is not included; the chain of
    /// the pseudo-root itself is empty.
    ///
    /// `/a/b/c` yields `/a`, `/a/b`, `/a/b/c`.
    #[must_use]
    pub fn chain_from_root(&self) -> Vec<Self> {
        let mut chain = Vec::new();
        if self.is_absolute_root() {
            return chain;
        }
        let bytes = self.0.as_bytes();
        for i in 1..bytes.len() {
            if bytes[i] == b'/' {
                chain.push(Self(self.0[..i].to_owned()));
            }
        }
        chain.push(self.clone());
        chain
    }
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimPath({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn parent_walks_to_root() {
        let p = PrimPath::new("/a/b/c");
        assert_eq!(p.parent(), Some(PrimPath::new("/a/b")));
        assert_eq!(
            p.parent().unwrap().parent().unwrap(),
            PrimPath::new("/a")
        );
        assert_eq!(
            PrimPath::new("/a").parent(),
            Some(PrimPath::absolute_root())
        );
        assert_eq!(PrimPath::absolute_root().parent(), None);
    }

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(PrimPath::new("/a/b/"), PrimPath::new("/a/b"));
    }

    #[test]
    #[should_panic(expected = "must be absolute")]
    fn relative_path_panics() {
        let _ = PrimPath::new("a/b");
    }

    #[test]
    fn name_is_final_component() {
        assert_eq!(PrimPath::new("/a/b/c").name(), "c");
        assert_eq!(PrimPath::new("/a").name(), "a");
    }

    #[test]
    fn child_appends_component() {
        assert_eq!(
            PrimPath::absolute_root().child("a").child("b"),
            PrimPath::new("/a/b")
        );
    }

    #[test]
    fn prefix_respects_component_boundaries() {
        let ab = PrimPath::new("/a/b");
        assert!(ab.has_prefix(&PrimPath::new("/a")));
        assert!(ab.has_prefix(&ab));
        assert!(ab.has_prefix(&PrimPath::absolute_root()));
        // `/ab` is not under `/a`.
        assert!(!PrimPath::new("/ab").has_prefix(&PrimPath::new("/a")));
        assert!(!PrimPath::new("/a").has_prefix(&ab));
    }

    #[test]
    fn chain_from_root_is_root_downward() {
        assert_eq!(
            PrimPath::new("/a/b/c").chain_from_root(),
            vec![
                PrimPath::new("/a"),
                PrimPath::new("/a/b"),
                PrimPath::new("/a/b/c")
            ]
        );
        assert!(PrimPath::absolute_root().chain_from_root().is_empty());
    }

    #[test]
    fn ancestors_sort_before_descendants() {
        let mut paths = vec![
            PrimPath::new("/a/b"),
            PrimPath::new("/a"),
            PrimPath::new("/ab"),
            PrimPath::new("/a/b/c"),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![
                PrimPath::new("/a"),
                PrimPath::new("/a/b"),
                PrimPath::new("/a/b/c"),
                PrimPath::new("/ab"),
            ]
        );
    }
}
