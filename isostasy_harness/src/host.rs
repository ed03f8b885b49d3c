// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host graph.
//!
//! Nodes occupy slots in parallel arrays, addressed by [`HostNodeId`]
//! handles. Destroyed nodes are recycled via a free list, and generation
//! counters make stale handles fail [`is_alive`](HostGraph::is_alive)
//! immediately, which is exactly the behavior the engine's stale-tolerance
//! paths exercise. Node paths are pipe-delimited from the root, matching the
//! convention of DCC node graphs (`|world|group|shape`).

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use isostasy_core::host::{HostGraph, HostNodeId};
use isostasy_core::transform::Matrix4;

const INVALID: u32 = u32::MAX;

/// Struct-of-arrays storage for a fake host node graph.
///
/// Implements [`HostGraph`] for engine tests and demos; also records
/// create/delete/undo-batch activity so tests can assert on how the engine
/// edited the graph, not just on the end state.
#[derive(Debug, Default)]
pub struct MemoryHost {
    parent: Vec<u32>,
    name: Vec<String>,
    string_attrs: Vec<BTreeMap<String, String>>,
    local_matrix: Vec<Matrix4>,
    generation: Vec<u32>,
    free_list: Vec<u32>,

    // -- Activity log --
    created: Vec<String>,
    deleted: Vec<String>,
    open_batches: u32,
    batches_completed: u32,
}

impl MemoryHost {
    /// Creates an empty host graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self, id: HostNodeId) -> bool {
        let idx = id.index() as usize;
        idx < self.generation.len()
            && self.generation[idx] == id.generation()
            && !self.free_list.contains(&id.index())
    }

    fn path_of(&self, idx: u32) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut cur = idx;
        while cur != INVALID {
            parts.push(&self.name[cur as usize]);
            cur = self.parent[cur as usize];
        }
        parts.reverse();
        let mut out = String::new();
        for part in parts {
            out.push('|');
            out.push_str(part);
        }
        out
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.generation.len() - self.free_list.len()
    }

    /// Pipe-delimited paths of every node created so far, in creation order.
    #[must_use]
    pub fn created_log(&self) -> &[String] {
        &self.created
    }

    /// Pipe-delimited paths of every node deleted so far, in deletion order.
    #[must_use]
    pub fn deleted_log(&self) -> &[String] {
        &self.deleted
    }

    /// Number of completed undo batches.
    #[must_use]
    pub fn batches_completed(&self) -> u32 {
        self.batches_completed
    }

    /// Clears the create/delete activity log.
    pub fn clear_log(&mut self) {
        self.created.clear();
        self.deleted.clear();
    }

    fn delete_subtree(&mut self, idx: u32) {
        // Children first so the deletion log reads bottom-up.
        let children: Vec<u32> = (0..self.parent.len() as u32)
            .filter(|&c| !self.free_list.contains(&c) && self.parent[c as usize] == idx)
            .collect();
        for child in children {
            self.delete_subtree(child);
        }
        self.deleted.push(self.path_of(idx));
        self.generation[idx as usize] += 1;
        self.parent[idx as usize] = INVALID;
        self.string_attrs[idx as usize].clear();
        self.free_list.push(idx);
    }
}

impl HostGraph for MemoryHost {
    fn create_transform(&mut self, name: &str, parent: Option<HostNodeId>) -> HostNodeId {
        let parent_idx = match parent {
            Some(p) if self.live(p) => p.index(),
            _ => INVALID,
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = parent_idx;
            self.name[idx as usize] = name.to_string();
            self.string_attrs[idx as usize] = BTreeMap::new();
            self.local_matrix[idx as usize] = Matrix4::IDENTITY;
            idx
        } else {
            let idx = self.parent.len() as u32;
            self.parent.push(parent_idx);
            self.name.push(name.to_string());
            self.string_attrs.push(BTreeMap::new());
            self.local_matrix.push(Matrix4::IDENTITY);
            self.generation.push(0);
            idx
        };
        self.created.push(self.path_of(idx));
        HostNodeId::from_raw(idx, self.generation[idx as usize])
    }

    fn delete_node(&mut self, id: HostNodeId) {
        // Stale handles delete nothing.
        if self.live(id) {
            self.delete_subtree(id.index());
        }
    }

    fn reparent(&mut self, node: HostNodeId, new_parent: Option<HostNodeId>) {
        if !self.live(node) {
            return;
        }
        self.parent[node.index() as usize] = match new_parent {
            Some(p) if self.live(p) => p.index(),
            _ => INVALID,
        };
    }

    fn is_alive(&self, id: HostNodeId) -> bool {
        self.live(id)
    }

    fn node_path(&self, id: HostNodeId) -> Option<String> {
        self.live(id).then(|| self.path_of(id.index()))
    }

    fn find_node(&self, host_path: &str) -> Option<HostNodeId> {
        (0..self.generation.len() as u32)
            .filter(|idx| !self.free_list.contains(idx))
            .find(|&idx| self.path_of(idx) == host_path)
            .map(|idx| HostNodeId::from_raw(idx, self.generation[idx as usize]))
    }

    fn set_string_attr(&mut self, id: HostNodeId, name: &str, value: &str) {
        if self.live(id) {
            self.string_attrs[id.index() as usize].insert(name.to_string(), value.to_string());
        }
    }

    fn string_attr(&self, id: HostNodeId, name: &str) -> Option<String> {
        if !self.live(id) {
            return None;
        }
        self.string_attrs[id.index() as usize].get(name).cloned()
    }

    fn set_local_matrix(&mut self, id: HostNodeId, matrix: Matrix4) {
        if self.live(id) {
            self.local_matrix[id.index() as usize] = matrix;
        }
    }

    fn local_matrix(&self, id: HostNodeId) -> Option<Matrix4> {
        self.live(id)
            .then(|| self.local_matrix[id.index() as usize])
    }

    fn begin_undo_batch(&mut self) {
        self.open_batches += 1;
    }

    fn end_undo_batch(&mut self) {
        assert!(self.open_batches > 0, "unbalanced end_undo_batch");
        self.open_batches -= 1;
        if self.open_batches == 0 {
            self.batches_completed += 1;
        }
    }
}

impl MemoryHost {
    /// Debug helper: all live node paths, sorted.
    #[must_use]
    pub fn live_paths(&self) -> Vec<String> {
        let mut out: Vec<String> = (0..self.generation.len() as u32)
            .filter(|idx| !self.free_list.contains(idx))
            .map(|idx| self.path_of(idx))
            .collect();
        out.sort();
        out
    }

    /// Debug helper: one-line summary for assertion messages.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} live, {} created, {} deleted",
            self.live_count(),
            self.created.len(),
            self.deleted.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_recycled_with_new_generations() {
        let mut host = MemoryHost::new();
        let a = host.create_transform("a", None);
        host.delete_node(a);
        let b = host.create_transform("b", None);

        assert_eq!(a.index(), b.index(), "slot is reused");
        assert_ne!(a.generation(), b.generation(), "generation bumped");
        assert!(!host.is_alive(a), "old handle is stale");
        assert!(host.is_alive(b));
    }

    #[test]
    fn delete_removes_the_subtree() {
        let mut host = MemoryHost::new();
        let root = host.create_transform("root", None);
        let mid = host.create_transform("mid", Some(root));
        let leaf = host.create_transform("leaf", Some(mid));

        host.delete_node(mid);
        assert!(host.is_alive(root));
        assert!(!host.is_alive(mid));
        assert!(!host.is_alive(leaf), "descendants die with their parent");
        assert_eq!(
            host.deleted_log(),
            ["|root|mid|leaf", "|root|mid"],
            "children logged before parents"
        );
    }

    #[test]
    fn node_paths_are_pipe_delimited() {
        let mut host = MemoryHost::new();
        let root = host.create_transform("world", None);
        let child = host.create_transform("group", Some(root));

        assert_eq!(host.node_path(child).as_deref(), Some("|world|group"));
        assert_eq!(host.find_node("|world|group"), Some(child));
        assert_eq!(host.find_node("|missing"), None);
    }

    #[test]
    fn stale_handle_operations_are_noops() {
        let mut host = MemoryHost::new();
        let a = host.create_transform("a", None);
        host.delete_node(a);

        host.delete_node(a);
        host.set_string_attr(a, "k", "v");
        assert_eq!(host.string_attr(a, "k"), None);
        assert_eq!(host.node_path(a), None);
        assert_eq!(host.local_matrix(a), None);
    }

    #[test]
    fn string_attrs_round_trip() {
        let mut host = MemoryHost::new();
        let a = host.create_transform("a", None);
        host.set_string_attr(a, "sourcePath", "/root/a");
        assert_eq!(host.string_attr(a, "sourcePath").as_deref(), Some("/root/a"));
        assert_eq!(host.string_attr(a, "other"), None);
    }

    #[test]
    fn nested_undo_batches_complete_once() {
        let mut host = MemoryHost::new();
        host.begin_undo_batch();
        host.begin_undo_batch();
        host.end_undo_batch();
        assert_eq!(host.batches_completed(), 0);
        host.end_undo_batch();
        assert_eq!(host.batches_completed(), 1);
    }
}
