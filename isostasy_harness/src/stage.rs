// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory authoring stage.
//!
//! [`MemoryStage`] holds prims in a path-ordered map (path order is
//! pre-order, so subtree enumeration is a range scan) and accumulates a
//! [`StageNotice`] as edits are authored. Tests author a batch of edits,
//! call [`take_notice`](MemoryStage::take_notice), and hand the notice to
//! the engine — the same shape a composition library's change notification
//! would have.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use isostasy_core::path::PrimPath;
use isostasy_core::stage::{
    InfoChange, Prim, Stage, StageNotice, TRANSFORM_OP_ORDER_PROPERTY,
};
use isostasy_core::transform::TransformOp;

#[derive(Clone, Debug)]
struct PrimData {
    type_name: String,
    active: bool,
    merged: bool,
    transform_ops: Vec<TransformOp>,
}

/// Editable prim store implementing [`Stage`].
#[derive(Debug, Default)]
pub struct MemoryStage {
    prims: BTreeMap<PrimPath, PrimData>,
    pending: StageNotice,
}

impl MemoryStage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes and clears the accumulated change notice.
    pub fn take_notice(&mut self) -> StageNotice {
        core::mem::take(&mut self.pending)
    }

    fn note_resync(&mut self, path: &PrimPath) {
        self.pending.resynced.push(path.clone());
    }

    // -- Authoring edits --

    /// Defines (or redefines) a prim. A structural edit.
    pub fn define_prim(&mut self, path: &str, type_name: &str) -> PrimPath {
        let path = PrimPath::new(path);
        self.prims.insert(
            path.clone(),
            PrimData {
                type_name: type_name.to_string(),
                active: true,
                merged: false,
                transform_ops: Vec::new(),
            },
        );
        self.note_resync(&path);
        path
    }

    /// Changes a prim's declared type. A structural edit.
    pub fn set_type(&mut self, path: &PrimPath, type_name: &str) {
        if let Some(data) = self.prims.get_mut(path) {
            data.type_name = type_name.to_string();
            self.note_resync(path);
        }
    }

    /// Activates or deactivates a prim. A structural edit.
    pub fn set_active(&mut self, path: &PrimPath, active: bool) {
        if let Some(data) = self.prims.get_mut(path) {
            data.active = active;
            self.note_resync(path);
        }
    }

    /// Marks a prim as merged into its parent's host node. A structural
    /// edit.
    pub fn set_merged(&mut self, path: &PrimPath, merged: bool) {
        if let Some(data) = self.prims.get_mut(path) {
            data.merged = merged;
            self.note_resync(path);
        }
    }

    /// Removes a prim and its entire subtree. A structural edit.
    pub fn remove_prim(&mut self, path: &PrimPath) {
        let doomed: Vec<PrimPath> = self
            .prims
            .keys()
            .filter(|p| p.has_prefix(path))
            .cloned()
            .collect();
        if doomed.is_empty() {
            return;
        }
        for p in &doomed {
            self.prims.remove(p);
        }
        self.note_resync(path);
    }

    /// Replaces a prim's transform-op stack. An info-only edit against the
    /// transform-op-order property.
    pub fn set_transform_ops(&mut self, path: &PrimPath, ops: Vec<TransformOp>) {
        if let Some(data) = self.prims.get_mut(path) {
            data.transform_ops = ops;
            self.pending.changed_info_only.push(InfoChange {
                path: path.clone(),
                property: TRANSFORM_OP_ORDER_PROPERTY.to_string(),
            });
        }
    }

    /// Records an info-only change against an arbitrary property, without
    /// touching stored data (value edits the engine only relays).
    pub fn touch_property(&mut self, path: &PrimPath, property: &str) {
        self.pending.changed_info_only.push(InfoChange {
            path: path.clone(),
            property: property.to_string(),
        });
    }

    /// Returns the number of prims on the stage.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prims.len()
    }

    /// Returns whether the stage has no prims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    fn snapshot(&self, path: &PrimPath, data: &PrimData) -> Prim {
        Prim {
            path: path.clone(),
            type_name: data.type_name.clone(),
            active: data.active,
            merged: data.merged,
            transform_ops: data.transform_ops.clone(),
        }
    }
}

impl Stage for MemoryStage {
    fn prim_at_path(&self, path: &PrimPath) -> Option<Prim> {
        self.prims.get(path).map(|data| self.snapshot(path, data))
    }

    fn prims_under(&self, root: &PrimPath) -> Vec<Prim> {
        self.prims
            .iter()
            .filter(|(path, _)| path.has_prefix(root))
            .map(|(path, data)| self.snapshot(path, data))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn enumeration_is_preorder() {
        let mut stage = MemoryStage::new();
        stage.define_prim("/a/b/c", "Mesh");
        stage.define_prim("/a", "Xform");
        stage.define_prim("/a/b", "Xform");

        let prims = stage.prims_under(&PrimPath::absolute_root());
        let paths: Vec<&str> = prims.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/a", "/a/b", "/a/b/c"]);
    }

    #[test]
    fn subtree_enumeration_excludes_siblings() {
        let mut stage = MemoryStage::new();
        stage.define_prim("/a/x", "Mesh");
        stage.define_prim("/ab", "Mesh");

        let under_a = stage.prims_under(&PrimPath::new("/a"));
        assert_eq!(under_a.len(), 1, "sibling /ab must not match prefix /a");
        assert_eq!(under_a[0].path.as_str(), "/a/x");
    }

    #[test]
    fn edits_accumulate_one_notice() {
        let mut stage = MemoryStage::new();
        let a = stage.define_prim("/a", "Mesh");
        stage.set_type(&a, "Camera");
        stage.set_transform_ops(&a, vec![TransformOp::Translate([1.0, 0.0, 0.0])]);

        let notice = stage.take_notice();
        assert_eq!(notice.resynced.len(), 2, "define + retype are structural");
        assert_eq!(notice.changed_info_only.len(), 1);
        assert_eq!(
            notice.changed_info_only[0].property,
            TRANSFORM_OP_ORDER_PROPERTY
        );
        assert!(stage.take_notice().is_empty(), "notice is consumed");
    }

    #[test]
    fn remove_prim_takes_the_subtree() {
        let mut stage = MemoryStage::new();
        stage.define_prim("/grp", "Xform");
        stage.define_prim("/grp/inner", "Mesh");
        stage.define_prim("/other", "Mesh");

        stage.remove_prim(&PrimPath::new("/grp"));
        assert_eq!(stage.len(), 1);
        assert!(stage.prim_at_path(&PrimPath::new("/grp/inner")).is_none());
    }

    #[test]
    fn edits_to_missing_prims_are_noops() {
        let mut stage = MemoryStage::new();
        stage.set_active(&PrimPath::new("/ghost"), false);
        stage.remove_prim(&PrimPath::new("/ghost"));
        assert!(stage.take_notice().is_empty());
    }
}
