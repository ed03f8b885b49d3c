// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composed-stage collaborator interface.
//!
//! The engine never owns the stage's composition machinery; it consumes a
//! narrow read surface specified here as the [`Stage`] trait, plus the
//! [`StageNotice`] values the stage emits after every edit. Both real
//! stage bindings and in-memory test doubles implement the same trait,
//! enabling generic engine code and harness-driven scenario tests.
//!
//! [`Prim`] is a *snapshot* of one prim's externally visible state at the
//! moment of query. Snapshots are cheap value types; the engine re-queries
//! rather than retaining them across notice boundaries.

use alloc::string::String;
use alloc::vec::Vec;

use crate::path::PrimPath;
use crate::transform::TransformOp;

/// Snapshot of a prim's externally visible state.
#[derive(Clone, Debug, PartialEq)]
pub struct Prim {
    /// Absolute stage path of the prim.
    pub path: PrimPath,
    /// Declared (possibly namespaced) type string, e.g. `Mesh` or
    /// `render:Camera`. Empty for plain hierarchy prims.
    pub type_name: String,
    /// Whether the prim is active in the composition.
    pub active: bool,
    /// Whether this prim's transform folds into its parent's host node
    /// (merged, the common case) instead of getting its own.
    pub merged: bool,
    /// Ordered static transform ops, outermost-first.
    pub transform_ops: Vec<TransformOp>,
}

impl Prim {
    /// Returns a hash of the prim's externally visible content.
    ///
    /// The engine stores this key in the translator context after each
    /// import/update and compares it on the next resync to skip prims whose
    /// content did not actually change. Translator identity is *not* part of
    /// the key; the context checks it separately so that a schema-type edit
    /// reads as removed-then-new rather than a silent key mismatch.
    #[must_use]
    pub fn unique_key(&self) -> u64 {
        // FNV-1a over the snapshot fields.
        let mut h = 0xcbf2_9ce4_8422_2325_u64;
        let mut eat = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x100_0000_01b3);
            }
        };
        eat(self.type_name.as_bytes());
        eat(&[u8::from(self.active), u8::from(self.merged)]);
        for op in &self.transform_ops {
            match op {
                TransformOp::Translate(v) => {
                    eat(&[0]);
                    for c in v {
                        eat(&c.to_bits().to_le_bytes());
                    }
                }
                TransformOp::RotateX(r) => {
                    eat(&[1]);
                    eat(&r.to_bits().to_le_bytes());
                }
                TransformOp::RotateY(r) => {
                    eat(&[2]);
                    eat(&r.to_bits().to_le_bytes());
                }
                TransformOp::RotateZ(r) => {
                    eat(&[3]);
                    eat(&r.to_bits().to_le_bytes());
                }
                TransformOp::Scale(v) => {
                    eat(&[4]);
                    for c in v {
                        eat(&c.to_bits().to_le_bytes());
                    }
                }
                TransformOp::Matrix(m) => {
                    eat(&[5]);
                    for c in m.cols.iter().flatten() {
                        eat(&c.to_bits().to_le_bytes());
                    }
                }
            }
        }
        h
    }
}

/// Read surface of the composed stage.
pub trait Stage {
    /// Returns the prim at `path`, or `None` if the path does not resolve.
    fn prim_at_path(&self, path: &PrimPath) -> Option<Prim>;

    /// Returns all active prims at or beneath `root`, in depth-first
    /// pre-order (every ancestor before its descendants).
    fn prims_under(&self, root: &PrimPath) -> Vec<Prim>;
}

/// One info-only (non-structural) property change.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoChange {
    /// Path of the prim whose property changed.
    pub path: PrimPath,
    /// Name of the changed property.
    pub property: String,
}

/// The property name the stage uses for a prim's ordered transform-op list.
///
/// An info-only change to this property invalidates the engine's cached
/// bounding box even though no resync runs.
pub const TRANSFORM_OP_ORDER_PROPERTY: &str = "xformOpOrder";

/// One objects-changed notice from the composed stage.
///
/// `resynced` paths carry structural implications (variant switch, prim
/// add/remove, activation change) and drive the resync state machine.
/// `changed_info_only` entries are plain value edits and bypass it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageNotice {
    /// Subtree roots whose composition changed.
    pub resynced: Vec<PrimPath>,
    /// Value-only property changes.
    pub changed_info_only: Vec<InfoChange>,
}

impl StageNotice {
    /// Returns whether the notice carries nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resynced.is_empty() && self.changed_info_only.is_empty()
    }
}
