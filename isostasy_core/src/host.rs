// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-graph collaborator interface.
//!
//! The host application owns its own retained scene hierarchy; the engine
//! only ever holds [`HostNodeId`] handles into it. A handle pairs a slot
//! index with a generation counter so that a node deleted out-of-band (by
//! the user, by undo) makes every retained handle *stale* rather than
//! dangling: [`HostGraph::is_alive`] is the liveness check the table and
//! chain builder run before dereferencing anything.
//!
//! [`HostGraph`] is the narrow mutation surface the engine consumes: node
//! create/delete/reparent, string attributes, local matrices, and
//! lookup-by-path for rehydration. Implementations wrap the host's native
//! node and modifier APIs; [`begin_undo_batch`](HostGraph::begin_undo_batch)
//! and [`end_undo_batch`](HostGraph::end_undo_batch) bracket engine edits so
//! hosts with batched undo can commit them atomically.

use alloc::string::String;
use core::fmt;

use crate::transform::Matrix4;

/// Name of the string attribute stamped on every engine-created transform
/// node, holding the source prim path for round-trip identification.
pub const SOURCE_PATH_ATTR: &str = "isostasyPrimPath";

/// A generational handle to a node in the host graph.
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostNodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl HostNodeId {
    /// Creates a handle from raw parts. Host-graph implementations assign
    /// these; the engine treats them as opaque.
    #[inline]
    #[must_use]
    pub const fn from_raw(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for HostNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostNodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Mutation and lookup surface of the host application's scene graph.
pub trait HostGraph {
    /// Creates a transform node named `name` under `parent` (or at the host
    /// root when `None`) and returns its handle.
    fn create_transform(&mut self, name: &str, parent: Option<HostNodeId>) -> HostNodeId;

    /// Deletes a node and its subtree.
    ///
    /// Deleting through a stale handle is a no-op, never an error: cleanup
    /// passes routinely race with out-of-band deletion.
    fn delete_node(&mut self, id: HostNodeId);

    /// Moves `node` under `new_parent` (or to the host root when `None`).
    ///
    /// No-op if either handle is stale.
    fn reparent(&mut self, node: HostNodeId, new_parent: Option<HostNodeId>);

    /// Returns whether the handle refers to a live node.
    fn is_alive(&self, id: HostNodeId) -> bool;

    /// Returns the host-side path string of a live node (the form accepted
    /// by [`find_node`](Self::find_node)), or `None` if the handle is stale.
    fn node_path(&self, id: HostNodeId) -> Option<String>;

    /// Resolves a host-side path string back to a live handle.
    ///
    /// This is the host's lookup-by-name facility; rehydration uses it to
    /// re-resolve serialized records and silently drops the ones that fail.
    fn find_node(&self, host_path: &str) -> Option<HostNodeId>;

    /// Sets a string attribute on a node. No-op on a stale handle.
    fn set_string_attr(&mut self, id: HostNodeId, name: &str, value: &str);

    /// Reads a string attribute, or `None` if absent or the handle is stale.
    fn string_attr(&self, id: HostNodeId, name: &str) -> Option<String>;

    /// Sets a node's local transform matrix. No-op on a stale handle.
    fn set_local_matrix(&mut self, id: HostNodeId, matrix: Matrix4);

    /// Reads a node's local transform matrix, or `None` on a stale handle.
    fn local_matrix(&self, id: HostNodeId) -> Option<Matrix4>;

    /// Opens an atomic, undoable edit batch. Hosts without batched undo can
    /// leave the default no-op.
    fn begin_undo_batch(&mut self) {}

    /// Commits the current edit batch.
    fn end_undo_batch(&mut self) {}
}

/// Host-emitted session events, modeled as explicit values so the engine's
/// reaction to them is testable without a real host event loop.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// The host is about to save the scene; persisted state must be written
    /// now.
    PreSave,
    /// The host finished opening a scene; persisted state may be restored.
    PostOpen,
    /// The host selection changed to exactly these prim paths.
    SelectionChanged(alloc::vec::Vec<crate::path::PrimPath>),
}
